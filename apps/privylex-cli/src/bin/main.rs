use std::env;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use privylex_cli::OutputPaths;
use privylex_core::config::{Config, IoConfig};
use privylex_rag::provider;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();
    let settings = match config.settings() {
        Ok(s) => s,
        Err(e) => {
            // still owe the caller a completion marker if we know where to put it
            let io: IoConfig = config.get("io").unwrap_or_default();
            let dir = io.output_path().context("invalid configuration")?;
            OutputPaths::new(&dir, &io).write_failure(&format!("Error in legal document analysis: {e}"))?;
            tracing::error!(error = %e, "invalid configuration");
            return Ok(());
        }
    };
    let query = privylex_cli::query_from_args(env::args().skip(1), &settings.answer.default_query);
    tracing::info!(%query, "processing legal document analysis request");

    let generator = match provider::from_config(&settings.generation) {
        Ok(g) => g,
        Err(e) => {
            tracing::warn!(error = %e, "generation provider unavailable, using mock analysis");
            None
        }
    };
    let paths = privylex_cli::run(&settings, &query, generator)?;
    println!("Results written to {}", paths.computed.display());
    Ok(())
}
