//! TOML-based configuration for prism
//!
//! Search, perspective and LLM settings are read from `prism.toml`. Every
//! field has a default, so an empty file (or no file at all) is a valid
//! configuration as long as the providers it selects need no secrets.
//!
//! Secrets are never stored in the file. The config names the environment
//! variable holding each key and validation checks that it is set.
//!
//! Use [`ConfigManager`] to share one loaded configuration across a run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "prism.toml";

/// Root configuration structure loaded from prism.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrismConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub perspectives: PerspectivesConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    DuckDuckGo,
    Tavily,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_provider")]
    pub provider: SearchProviderKind,

    /// Maximum searches per run
    #[serde(default = "default_ceiling")]
    pub ceiling: usize,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Jaccard similarity above which two results are duplicates
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Environment variable containing the Tavily API key
    #[serde(default = "default_tavily_api_key_env")]
    pub tavily_api_key_env: String,

    #[serde(default = "default_tavily_base_url")]
    pub tavily_base_url: String,
}

fn default_search_provider() -> SearchProviderKind {
    SearchProviderKind::DuckDuckGo
}

fn default_ceiling() -> usize {
    crate::search::budget::DEFAULT_CEILING
}

fn default_ttl_secs() -> u64 {
    crate::search::cache::DEFAULT_TTL.as_secs()
}

fn default_duplicate_threshold() -> f64 {
    crate::search::dedup::DEFAULT_DUPLICATE_THRESHOLD
}

fn default_max_results() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_tavily_api_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

fn default_tavily_base_url() -> String {
    crate::search::provider::TAVILY_DEFAULT_BASE_URL.to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            ceiling: default_ceiling(),
            ttl_secs: default_ttl_secs(),
            duplicate_threshold: default_duplicate_threshold(),
            max_results: default_max_results(),
            request_timeout_secs: default_request_timeout_secs(),
            tavily_api_key_env: default_tavily_api_key_env(),
            tavily_base_url: default_tavily_base_url(),
        }
    }
}

impl SearchConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============= Perspective Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectivesConfig {
    /// Per-role time limit
    #[serde(default = "default_perspective_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_perspective_timeout_secs() -> u64 {
    crate::perspectives::runner::DEFAULT_TIMEOUT.as_secs()
}

impl Default for PerspectivesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_perspective_timeout_secs(),
        }
    }
}

impl PerspectivesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    Ollama,
    OpenAI,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: LlmProviderKind,

    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Environment variable containing the API key (OpenAI only)
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
}

fn default_llm_provider() -> LlmProviderKind {
    LlmProviderKind::Ollama
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_llm_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_llm_api_key_env(),
        }
    }
}

// ============= Errors =============

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

// ============= Loading and Validation =============

impl PrismConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PrismConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `prism.toml` in the working directory if it
    /// exists, else the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Validate value ranges and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        let search = &self.search;

        if !(search.duplicate_threshold > 0.0 && search.duplicate_threshold <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "search.duplicate_threshold must be in (0, 1], got {}",
                search.duplicate_threshold
            )));
        }
        if search.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "search.ttl_secs must be greater than 0".to_string(),
            ));
        }
        if search.max_results == 0 {
            return Err(ConfigError::ValidationError(
                "search.max_results must be greater than 0".to_string(),
            ));
        }
        if search.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "search.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.perspectives.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "perspectives.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }

        if search.provider == SearchProviderKind::Tavily {
            self.validate_env_var(&search.tavily_api_key_env)?;
        }
        if self.llm.provider == LlmProviderKind::OpenAI {
            self.validate_env_var(&self.llm.api_key_env)?;
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    pub fn tavily_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.search.tavily_api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.search.tavily_api_key_env.clone()))
    }

    pub fn llm_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.llm.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.llm.api_key_env.clone()))
    }
}

/// Commented template written by `prism init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# prism configuration

[logging]
# Used when RUST_LOG is not set
level = "info"

[search]
# "duckduckgo" (no key) or "tavily"
provider = "duckduckgo"
# Maximum searches per run
ceiling = 4
# Seconds a cached search result stays valid
ttl_secs = 3600
# Results more similar than this (Jaccard, 0-1] are dropped as duplicates
duplicate_threshold = 0.8
max_results = 5
request_timeout_secs = 20
tavily_api_key_env = "TAVILY_API_KEY"
tavily_base_url = "https://api.tavily.com"

[perspectives]
# Per-role time limit in seconds
timeout_secs = 60

[llm]
# "ollama" or "openai"
provider = "ollama"
base_url = "http://localhost:11434"
model = "llama3.2"
# Only read when provider = "openai"
api_key_env = "OPENAI_API_KEY"
"#;

// ============= Configuration Manager =============

/// Loaded configuration shared by reference, with the file it came from.
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<PrismConfig>,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a manager and load the config from `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = PrismConfig::load(&path)?;
        debug!("Loaded configuration from {:?}", path);

        Ok(Self {
            config: Arc::new(config),
            config_path: Some(path),
        })
    }

    /// Create a manager directly from a config, without a backing file
    pub fn from_config(config: PrismConfig) -> Self {
        Self {
            config: Arc::new(config),
            config_path: None,
        }
    }

    pub fn config(&self) -> Arc<PrismConfig> {
        Arc::clone(&self.config)
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
