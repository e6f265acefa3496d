use crate::adapters::llm::{
    ModelConfig, DEFAULT_API_VERSION, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};
use crate::core::gate::AbsentVerdictPolicy;
use crate::core::git::DiffBackend;
use crate::core::project::GatePaths;
use crate::core::prompt::DEFAULT_MARKER;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    pub base_url: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub max_retries: usize,

    #[serde(default = "default_marker")]
    pub marker: String,

    #[serde(default)]
    pub absent_verdict: AbsentVerdictPolicy,

    #[serde(default)]
    pub diff_backend: DiffBackend,

    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            api_version: default_api_version(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            marker: default_marker(),
            absent_verdict: AbsentVerdictPolicy::default(),
            diff_backend: DiffBackend::default(),
            api_key: None,
        }
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub absent_verdict: Option<AbsentVerdictPolicy>,
    pub diff_backend: Option<DiffBackend>,
}

impl Config {
    /// Loads the first configuration file found, checking the project
    /// checklist directory, then the working directory, then the home
    /// directory.
    pub fn load(paths: &GatePaths) -> Result<Self> {
        let mut candidates = vec![
            paths.config_file(),
            PathBuf::from(".checkcommit.yml"),
            PathBuf::from(".checkcommit.yaml"),
        ];
        if let Some(home_dir) = dirs::home_dir() {
            candidates.push(home_dir.join(".checkcommit.yml"));
        }

        for path in candidates {
            if path.is_file() {
                return Self::from_file(&path);
            }
        }

        Ok(Config::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// An empty marker would let every verdict pass and a zero timeout would
    /// fail every request.
    pub fn validate(&self) -> Result<()> {
        if self.marker.trim().is_empty() {
            anyhow::bail!("marker must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn merge_with_cli(&mut self, overrides: CliOverrides) {
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(temperature) = overrides.temperature {
            self.temperature = temperature;
        }
        if let Some(policy) = overrides.absent_verdict {
            self.absent_verdict = policy;
        }
        if let Some(backend) = overrides.diff_backend {
            self.diff_backend = backend;
        }
    }

    /// `GEMINI_API_KEY` wins over the file; blank values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        Self::pick_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.clone())
    }

    fn pick_api_key(env: Option<String>, file: Option<String>) -> Option<String> {
        env.into_iter()
            .chain(file)
            .find(|key| !key.trim().is_empty())
    }

    pub fn model_config(&self, api_key: Option<String>) -> ModelConfig {
        ModelConfig {
            model_name: self.model.clone(),
            api_key,
            base_url: self.base_url.clone(),
            api_version: self.api_version.clone(),
            temperature: self.temperature,
            timeout_secs: self.timeout_secs,
            max_retries: self.max_retries,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}
