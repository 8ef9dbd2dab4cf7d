use color_eyre::eyre::Result;
use tenzies::{
    config::{
        self,
        Command,
    },
    logging,
};

mod app;
mod ui;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let app_config = match config::parse_args(std::env::args().skip(1))? {
        Command::Run(app_config) => app_config,
        Command::Help => {
            println!("{}", config::USAGE);
            return Ok(());
        }
    };
    let _log_guard = logging::init_tracing(&app_config.log_dir)?;
    tracing::info!(?app_config, "starting tenzies");
    app::run_app(app_config).await
}
