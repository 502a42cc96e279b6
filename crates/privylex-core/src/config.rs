use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::chunker::ChunkingConfig;
use crate::error::ConfigurationError;

pub const DEFAULT_QUERY: &str = "Please provide a summary of this legal document.";

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Layer sources for `RUST_ENV` (default `dev`). Nothing is read until
    /// [`Config::settings`] or [`Config::get`], which is where errors surface.
    pub fn load() -> Self {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self { figment: Self::figment_for_env(&env_name) }
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn figment_for_env(env_name: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::raw().only(&["IEXEC_IN"]).map(|_| "io.input_dir".into()))
            .merge(Env::raw().only(&["IEXEC_OUT"]).map(|_| "io.output_dir".into()))
            .merge(Env::raw().only(&["OPENAI_API_KEY"]).map(|_| "generation.api_key".into()))
    }

    pub fn get<T>(&self, key: &str) -> Result<T, ConfigurationError>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| ConfigurationError::Load(format!("Failed to get '{}': {}", key, e)))
    }

    /// Extract and validate the full settings tree.
    pub fn settings(&self) -> Result<Settings, ConfigurationError> {
        let settings: Settings = self.figment.extract().map_err(|e| ConfigurationError::Load(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub io: IoConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub answer: AnswerConfig,
    pub generation: GenerationConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.chunking.validate()?;
        self.retrieval.validate()?;
        self.answer.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub input_dir: String,
    pub output_dir: Option<String>,
    pub result_file: String,
    pub analysis_file: String,
    pub computed_file: String,
    pub show_progress: bool,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_dir: "/iexec_in".to_string(),
            output_dir: None,
            result_file: "result.txt".to_string(),
            analysis_file: "analysis.json".to_string(),
            computed_file: "computed.json".to_string(),
            show_progress: true,
        }
    }
}

impl IoConfig {
    pub fn input_path(&self) -> PathBuf {
        expand_path(&self.input_dir)
    }

    pub fn output_path(&self) -> Result<PathBuf, ConfigurationError> {
        self.output_dir
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(expand_path)
            .ok_or(ConfigurationError::Missing("io.output_dir"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub enabled: bool,
    pub top_n: usize,
    pub relevance_floor: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { enabled: true, top_n: 3, relevance_floor: 0.05 }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.top_n == 0 {
            return Err(ConfigurationError::InvalidRetrieval("top_n must be greater than 0".into()));
        }
        if !(0.0..=1.0).contains(&self.relevance_floor) {
            return Err(ConfigurationError::InvalidRetrieval(format!(
                "relevance_floor must be within [0, 1], got {}",
                self.relevance_floor
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub context_budget_chars: usize,
    pub max_tokens: usize,
    pub temperature: f32,
    pub default_query: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self { context_budget_chars: 9000, max_tokens: 350, temperature: 0.1, default_query: DEFAULT_QUERY.to_string() }
    }
}

impl AnswerConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.context_budget_chars == 0 {
            return Err(ConfigurationError::InvalidAnswer("context_budget_chars must be greater than 0".into()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigurationError::InvalidAnswer("max_tokens must be greater than 0".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigurationError::InvalidAnswer(format!("temperature must be within [0, 2], got {}", self.temperature)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 60,
        }
    }
}

impl GenerationConfig {
    /// The configured key, if it is non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
