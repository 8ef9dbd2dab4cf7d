use crate::{
    dice::{
        DiceSet,
        DiceSource,
        Die,
        DieId,
    },
    game::GameController,
    storage::{
        InMemoryStore,
        KeyValueStore,
    },
    timer::{
        Clock,
        ManualClock,
    },
};
use color_eyre::eyre::{
    Result,
    eyre,
};

/// Hands out faces from a fixed script, cycling when it runs out, and ids
/// `scripted-0`, `scripted-1`, ...
#[derive(Clone, Debug)]
pub struct ScriptedDiceSource {
    values: Vec<u8>,
    cursor: usize,
    next_id: u64,
}

impl ScriptedDiceSource {
    pub fn new(values: Vec<u8>) -> Self {
        assert!(!values.is_empty(), "script needs at least one face");
        Self {
            values,
            cursor: 0,
            next_id: 0,
        }
    }
}

impl DiceSource for ScriptedDiceSource {
    fn roll_value(&mut self) -> u8 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }

    fn next_id(&mut self) -> DieId {
        let id = DieId::new(format!("scripted-{}", self.next_id));
        self.next_id += 1;
        id
    }
}

/// Builds a set from `(value, is_held)` pairs with ids `die-0`, `die-1`, ...
/// Panics unless exactly ten pairs are given.
pub fn dice_set_of(faces: &[(u8, bool)]) -> DiceSet {
    let dice = faces
        .iter()
        .enumerate()
        .map(|(i, (value, is_held))| Die {
            id: DieId::new(format!("die-{i}")),
            value: *value,
            is_held: *is_held,
        })
        .collect();
    DiceSet::from_dice(dice).expect("dice_set_of needs exactly ten faces")
}

/// Holds every die that is not held yet.
pub fn hold_all<S, D, C>(game: &mut GameController<S, D, C>)
where
    S: KeyValueStore,
    D: DiceSource,
    C: Clock,
{
    for index in 0..game.dice().len() {
        let held = game.dice().get(index).is_some_and(|d| d.is_held);
        if !held {
            game.toggle_hold_at(index);
        }
    }
}

/// Store whose every operation fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Err(eyre!("store unavailable while reading {key}"))
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<()> {
        Err(eyre!("store unavailable while writing {key}"))
    }
}

pub struct TestContext {
    store: InMemoryStore,
    clock: ManualClock,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new(),
            clock: ManualClock::new(),
        }
    }

    pub fn with_store(store: InMemoryStore) -> Self {
        Self {
            store,
            clock: ManualClock::new(),
        }
    }

    pub fn store(&self) -> InMemoryStore {
        self.store.clone()
    }

    pub fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    pub fn game(
        &self,
        values: Vec<u8>,
    ) -> GameController<InMemoryStore, ScriptedDiceSource, ManualClock> {
        GameController::new(
            self.store.clone(),
            ScriptedDiceSource::new(values),
            self.clock.clone(),
        )
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
