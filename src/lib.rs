pub mod config;
pub mod dice;
pub mod game;
pub mod logging;
pub mod score;
pub mod storage;
pub mod timer;
pub mod win;

pub mod test_helpers;

pub use dice::{
    DICE_COUNT,
    DiceSet,
    DiceSource,
    Die,
    DieId,
    RandomDiceSource,
};
pub use game::{
    GameController,
    GameEvent,
    GameSnapshot,
    Outcome,
    Phase,
};
pub use score::{
    BestRecord,
    ScoreTracker,
    ScoreUpdate,
};
pub use storage::{
    InMemoryStore,
    JsonFileStore,
    KeyValueStore,
};
pub use timer::{
    Clock,
    ElapsedTime,
    Stopwatch,
    SystemClock,
};
