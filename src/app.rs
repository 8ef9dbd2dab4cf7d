use crate::ui;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use std::time::Duration;
use tenzies::{
    GameController,
    GameEvent,
    InMemoryStore,
    JsonFileStore,
    KeyValueStore,
    Outcome,
    RandomDiceSource,
    ScoreUpdate,
    SystemClock,
    config::{
        AppConfig,
        StoreConfig,
    },
};
use tokio::time;

const FRAME_INTERVAL: Duration = Duration::from_millis(250);

pub type AppController = GameController<Box<dyn KeyValueStore>, RandomDiceSource, SystemClock>;

fn open_store(config: &StoreConfig) -> Result<Box<dyn KeyValueStore>> {
    match config {
        StoreConfig::File(path) => {
            let store = JsonFileStore::open(path)
                .wrap_err_with(|| format!("opening score file {}", path.display()))?;
            tracing::info!(path = %store.path().display(), "using score file");
            Ok(Box::new(store))
        }
        StoreConfig::Memory => {
            tracing::info!("keeping best records in memory");
            Ok(Box::new(InMemoryStore::new()))
        }
    }
}

pub fn build_controller(config: &AppConfig) -> Result<AppController> {
    let store = open_store(&config.store)?;
    let source = match config.seed {
        Some(seed) => RandomDiceSource::seeded(seed),
        None => RandomDiceSource::new(),
    };
    Ok(GameController::new(store, source, SystemClock))
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let controller = build_controller(&config)?;
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    tracing::info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(controller, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop(
    mut controller: AppController,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    let mut ticker = time::interval(FRAME_INTERVAL);
    ui::draw(ui_state, &controller.snapshot())?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            _ = ticker.tick() => {
                ui_state.advance_frame();
                ui::draw(ui_state, &controller.snapshot())
                    .wrap_err("draw on tick failed")?;
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let Some(ev) = ui::interpret_event(ui_state, raw_ev?) else {
                    continue;
                };
                let outcome = match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Redraw => None,
                    ui::UserEvent::Roll => Some(controller.handle(GameEvent::RollOrNewGame)),
                    ui::UserEvent::ToggleDie(index) => Some(controller.toggle_hold_at(index)),
                };
                if let Some(status) = outcome.and_then(status_for) {
                    ui_state.set_status(status);
                }
                ui::draw(ui_state, &controller.snapshot())
                    .wrap_err("draw after input failed")?;
            }
        }
    }
    tracing::info!("Leaving UI");
    Ok(())
}

/// New status line text, or `None` to keep the current one.
fn status_for(outcome: Outcome) -> Option<String> {
    match outcome {
        Outcome::Rolled => Some(String::from("Rolled")),
        Outcome::HoldToggled => Some(String::new()),
        Outcome::NewGame => Some(String::from("New game. Good luck!")),
        Outcome::Ignored => None,
        Outcome::Won(update) => Some(won_status(update)),
    }
}

fn won_status(update: ScoreUpdate) -> String {
    match (update.new_best_roll, update.new_best_time) {
        (Some(rolls), Some(time)) => {
            format!("Tenzies! New best roll count {rolls} and best time {time}")
        }
        (Some(rolls), None) => format!("Tenzies! New best roll count {rolls}"),
        (None, Some(time)) => format!("Tenzies! New best time {time}"),
        (None, None) => String::from("Tenzies!"),
    }
}
