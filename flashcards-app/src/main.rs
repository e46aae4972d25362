mod cli;

use anyhow::Result;
use clap::Parser;
use tokio::runtime::Runtime;

use cli::commands::run_cli;
use cli::opts::Cli;
use flashcards_app::config::AppConfig;
use flashcards_app::logging::init_tracing;

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    init_tracing(&config.logging.level)?;

    let rt = Runtime::new()?;
    rt.block_on(run_cli(args, config))
}
