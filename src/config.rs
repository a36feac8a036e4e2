use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "o1-preview";
pub const DEFAULT_MAX_TOKENS: u32 = 10000;
/// Used when `OPENAI_MAX_TOKENS` is set but not a valid number.
pub const FALLBACK_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const MAX_TOKENS_VAR: &str = "OPENAI_MAX_TOKENS";
pub const API_URL_VAR: &str = "OPENAI_API_URL";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub ai: AIConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AIConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            api_url: OPENAI_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AIConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    /// Changed file paths and import targets are resolved against this.
    pub root: PathBuf,
    /// Generated tests land in `<output_dir>/<language>/`, relative to `root`.
    pub output_dir: PathBuf,
    /// Where existing tests are searched for; defaults to `root`.
    pub search_root: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from("generated_tests"),
            search_root: None,
        }
    }
}

impl PathsConfig {
    pub fn output_root(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    pub fn search_root(&self) -> PathBuf {
        self.search_root.clone().unwrap_or_else(|| self.root.clone())
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Builds the run configuration: defaults, then the optional TOML file,
    /// then the process environment. Fails when no API key is available.
    pub fn resolve(file: Option<&Path>) -> Result<Self> {
        Self::resolve_with(file, |key| env::var(key).ok())
    }

    pub fn resolve_with<F>(file: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = var(API_KEY_VAR) {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = var(MODEL_VAR) {
            self.ai.model = model;
        }
        if let Some(raw) = var(MAX_TOKENS_VAR) {
            self.ai.max_tokens = raw.trim().parse().unwrap_or_else(|_| {
                warn!(
                    "Invalid value for {}: {:?}. Using default value: {}",
                    MAX_TOKENS_VAR, raw, FALLBACK_MAX_TOKENS
                );
                FALLBACK_MAX_TOKENS
            });
        }
        if let Some(url) = var(API_URL_VAR) {
            self.ai.api_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.ai.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => bail!("{} environment variable is not set", API_KEY_VAR),
        }
    }

    pub fn api_key(&self) -> &str {
        self.ai.api_key.as_deref().unwrap_or_default()
    }
}
