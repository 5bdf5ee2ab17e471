mod app;
mod workflows;

use app::App as CLI;
use clap::Parser;
use starbase::{tracing::TracingOptions, App, MainResult};
use starbase_utils::string_vec;
use std::env;
use tracing::{debug, metadata::LevelFilter};

#[tokio::main]
async fn main() -> MainResult {
    App::setup_diagnostics();

    let cli = CLI::parse();

    if let Some(level) = &cli.log {
        env::set_var("STARBASE_LOG", level.to_string());
    }

    let _guard = App::setup_tracing_with_options(TracingOptions {
        default_level: LevelFilter::INFO,
        filter_modules: string_vec!["pyenv_setup", "starbase"],
        log_env: "STARBASE_LOG".into(),
        test_env: "PYENV_SETUP_TEST".into(),
        ..TracingOptions::default()
    });

    debug!(
        args = ?env::args().collect::<Vec<_>>(),
        "Running pyenv-setup v{}",
        env!("CARGO_PKG_VERSION")
    );

    workflows::setup(cli).await?;

    Ok(())
}
