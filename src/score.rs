use crate::{
    storage::KeyValueStore,
    timer::ElapsedTime,
};
use tracing::{
    info,
    warn,
};

pub const BEST_ROLL_KEY: &str = "bestRoll";
pub const BEST_TIME_KEY: &str = "bestTime";

/// Lowest roll count and earliest finishing time seen so far.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BestRecord {
    pub best_roll_count: Option<u32>,
    pub best_time: Option<ElapsedTime>,
}

/// Which fields a win improved.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScoreUpdate {
    pub new_best_roll: Option<u32>,
    pub new_best_time: Option<ElapsedTime>,
}

impl ScoreUpdate {
    pub fn is_improvement(&self) -> bool {
        self.new_best_roll.is_some() || self.new_best_time.is_some()
    }
}

impl BestRecord {
    /// Record after a win with `roll_count` rolls in `elapsed`. Never regresses.
    pub fn improved_by(&self, roll_count: u32, elapsed: ElapsedTime) -> (Self, ScoreUpdate) {
        let new_best_roll = match self.best_roll_count {
            Some(best) if roll_count >= best => None,
            _ => Some(roll_count),
        };
        let new_best_time = match self.best_time {
            Some(best) if elapsed >= best => None,
            _ => Some(elapsed),
        };
        let record = Self {
            best_roll_count: new_best_roll.or(self.best_roll_count),
            best_time: new_best_time.or(self.best_time),
        };
        (
            record,
            ScoreUpdate {
                new_best_roll,
                new_best_time,
            },
        )
    }
}

pub struct ScoreTracker<S> {
    store: S,
    best: BestRecord,
}

impl<S: KeyValueStore> ScoreTracker<S> {
    /// Reads both records. Anything missing or unreadable counts as absent.
    pub fn load(store: S) -> Self {
        let best = BestRecord {
            best_roll_count: read_record(&store, BEST_ROLL_KEY),
            best_time: read_record(&store, BEST_TIME_KEY),
        };
        info!(?best, "loaded best records");
        Self { store, best }
    }

    pub fn best(&self) -> BestRecord {
        self.best
    }

    pub fn on_win(&mut self, roll_count: u32, elapsed: ElapsedTime) -> ScoreUpdate {
        let (best, update) = self.best.improved_by(roll_count, elapsed);
        self.best = best;
        if let Some(rolls) = update.new_best_roll {
            info!(rolls, "new best roll count");
            write_record(&mut self.store, BEST_ROLL_KEY, &rolls);
        }
        if let Some(time) = update.new_best_time {
            info!(%time, "new best time");
            write_record(&mut self.store, BEST_TIME_KEY, &time);
        }
        update
    }
}

fn read_record<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore,
    T: serde::de::DeserializeOwned,
{
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read best record");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, %text, error = %e, "ignoring unparseable best record");
            None
        }
    }
}

fn write_record<S, T>(store: &mut S, key: &str, value: &T)
where
    S: KeyValueStore,
    T: serde::Serialize,
{
    let text = match serde_json::to_string(value) {
        Ok(text) => text,
        Err(e) => {
            warn!(key, error = %e, "failed to serialize best record");
            return;
        }
    };
    if let Err(e) = store.set(key, &text) {
        warn!(key, error = %e, "failed to persist best record");
    }
}
