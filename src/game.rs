use crate::{
    dice::{
        self,
        DiceSet,
        DiceSource,
        Die,
        DieId,
    },
    score::{
        BestRecord,
        ScoreTracker,
        ScoreUpdate,
    },
    storage::KeyValueStore,
    timer::{
        Clock,
        ElapsedTime,
        Stopwatch,
    },
    win::check_win,
};
use tracing::{
    debug,
    info,
};

pub const ROLL_LABEL: &str = "Roll";
pub const NEW_GAME_LABEL: &str = "New Game";
pub const MISSING_RECORD: &str = "-";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    #[default]
    Rolling,
    Won,
}

/// Inbound player actions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GameEvent {
    /// The roll button; starts a new game once won.
    RollOrNewGame,
    ToggleHold(DieId),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Rolled,
    HoldToggled,
    Won(ScoreUpdate),
    NewGame,
    Ignored,
}

/// Read-only view handed to the renderer every frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameSnapshot {
    pub dice: Vec<Die>,
    pub roll_count: u32,
    pub has_won: bool,
    pub elapsed: ElapsedTime,
    pub elapsed_display: String,
    pub best: BestRecord,
    pub best_roll_display: String,
    pub best_time_display: String,
    pub button_label: &'static str,
    pub celebrate: bool,
}

pub struct GameController<S, D, C> {
    dice: DiceSet,
    roll_count: u32,
    phase: Phase,
    source: D,
    scores: ScoreTracker<S>,
    stopwatch: Stopwatch<C>,
}

impl<S, D, C> GameController<S, D, C>
where
    S: KeyValueStore,
    D: DiceSource,
    C: Clock,
{
    /// Deals the first ten dice, loads best records and starts the clock.
    pub fn new(store: S, mut source: D, clock: C) -> Self {
        let dice = dice::new_dice_set(&mut source);
        let scores = ScoreTracker::load(store);
        let stopwatch = Stopwatch::start_new(clock);
        info!("game started");
        Self {
            dice,
            roll_count: 0,
            phase: Phase::Rolling,
            source,
            scores,
            stopwatch,
        }
    }

    pub fn dice(&self) -> &DiceSet {
        &self.dice
    }

    pub fn roll_count(&self) -> u32 {
        self.roll_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_won(&self) -> bool {
        self.phase == Phase::Won
    }

    pub fn best(&self) -> BestRecord {
        self.scores.best()
    }

    pub fn elapsed(&self) -> ElapsedTime {
        self.stopwatch.elapsed()
    }

    pub fn stopwatch(&self) -> &Stopwatch<C> {
        &self.stopwatch
    }

    pub fn handle(&mut self, event: GameEvent) -> Outcome {
        match event {
            GameEvent::RollOrNewGame => self.roll_or_new_game(),
            GameEvent::ToggleHold(id) => self.toggle_hold(&id),
        }
    }

    pub fn roll_or_new_game(&mut self) -> Outcome {
        match self.phase {
            Phase::Rolling => self.roll(),
            Phase::Won => self.new_game(),
        }
    }

    /// Re-rolls unheld dice. Does nothing once won.
    pub fn roll(&mut self) -> Outcome {
        if self.phase == Phase::Won {
            return Outcome::Ignored;
        }
        self.dice = dice::roll(&self.dice, &mut self.source);
        self.roll_count += 1;
        debug!(roll_count = self.roll_count, "rolled");
        self.after_dice_change(Outcome::Rolled)
    }

    /// Flips the hold flag of die `id`. Holds are frozen once won.
    pub fn toggle_hold(&mut self, id: &DieId) -> Outcome {
        if self.phase == Phase::Won {
            debug!(%id, "hold ignored after win");
            return Outcome::Ignored;
        }
        let next = dice::toggle_hold(&self.dice, id);
        if next == self.dice {
            debug!(%id, "hold toggle for unknown die");
            return Outcome::Ignored;
        }
        self.dice = next;
        self.after_dice_change(Outcome::HoldToggled)
    }

    /// Toggles the die at display position `index`.
    pub fn toggle_hold_at(&mut self, index: usize) -> Outcome {
        match self.dice.get(index) {
            Some(die) => {
                let id = die.id.clone();
                self.toggle_hold(&id)
            }
            None => Outcome::Ignored,
        }
    }

    pub fn new_game(&mut self) -> Outcome {
        self.dice = dice::new_dice_set(&mut self.source);
        self.roll_count = 0;
        self.phase = Phase::Rolling;
        self.stopwatch.reset();
        info!("new game");
        Outcome::NewGame
    }

    fn after_dice_change(&mut self, outcome: Outcome) -> Outcome {
        if self.phase == Phase::Rolling && check_win(self.dice.dice()) {
            self.enter_won()
        } else {
            outcome
        }
    }

    fn enter_won(&mut self) -> Outcome {
        self.phase = Phase::Won;
        self.stopwatch.pause();
        let elapsed = self.stopwatch.elapsed();
        info!(rolls = self.roll_count, %elapsed, "tenzies");
        let update = self.scores.on_win(self.roll_count, elapsed);
        Outcome::Won(update)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let elapsed = self.stopwatch.elapsed();
        let best = self.scores.best();
        let has_won = self.has_won();
        GameSnapshot {
            dice: self.dice.dice().to_vec(),
            roll_count: self.roll_count,
            has_won,
            elapsed,
            elapsed_display: elapsed.to_string(),
            best,
            best_roll_display: best
                .best_roll_count
                .map(|r| r.to_string())
                .unwrap_or_else(|| MISSING_RECORD.to_string()),
            best_time_display: best
                .best_time
                .map(|t| t.to_string())
                .unwrap_or_else(|| MISSING_RECORD.to_string()),
            button_label: if has_won { NEW_GAME_LABEL } else { ROLL_LABEL },
            celebrate: has_won,
        }
    }
}
