//! Generation providers behind the core `Generator` trait.
//!
//! Only an OpenAI-compatible chat-completions client exists today. Without a
//! credential there is no provider and callers fall back to the mock analysis.

use anyhow::Result;
use tracing::info;

use privylex_core::config::GenerationConfig;
use privylex_core::Generator;

pub mod openai;

pub use openai::OpenAiProvider;

/// Build the configured provider, or `None` when no API key is set.
pub fn from_config(config: &GenerationConfig) -> Result<Option<Box<dyn Generator>>> {
    let Some(key) = config.credential() else {
        info!("no generation credential configured, using mock analysis");
        return Ok(None);
    };
    let provider = OpenAiProvider::new(key.to_string(), config.model.clone(), config.base_url.clone(), config.timeout_secs)?;
    info!(model = %config.model, "using OpenAI-compatible provider");
    Ok(Some(Box::new(provider)))
}
