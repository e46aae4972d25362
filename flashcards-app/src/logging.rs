use tracing_subscriber::EnvFilter;

/// Overrides the configured filter when set, e.g. `FLASHCARDS_LOG=flashcards_core=debug`.
pub const LOG_ENV: &str = "FLASHCARDS_LOG";

/// Installs the global `tracing` subscriber. Fails if one is already set.
pub fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
