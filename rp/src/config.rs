//! RoutePick configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main RoutePick configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language-model provider configuration
    pub llm: LlmConfig,

    /// Candidate search configuration
    pub search: SearchConfig,

    /// Directions and weather configuration
    pub maps: MapsConfig,

    /// Course planning configuration
    pub planner: PlannerConfig,

    /// Task registry configuration
    pub registry: RegistryConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the registry TTL is representable and that every API key
    /// environment variable is set.
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        self.registry.ttl()?;
        for (what, var) in [
            ("LLM", &self.llm.api_key_env),
            ("Search", &self.search.api_key_env),
            ("Maps", &self.maps.api_key_env),
        ] {
            if std::env::var(var).is_err() {
                return Err(eyre::eyre!("{} API key not found. Set the {} environment variable.", what, var));
            }
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .routepick.yml
        let local_config = PathBuf::from(".routepick.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/routepick/routepick.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("routepick").join("routepick.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialised
    ///
    /// Errors are swallowed: a broken file is reported later by `load`.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".routepick.yml")];
                if let Some(dir) = dirs::config_dir() {
                    paths.push(dir.join("routepick").join("routepick.yml"));
                }
                paths
            }
        };
        candidates
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Resolve an API key from the named environment variable
fn api_key_from_env(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| eyre::eyre!("API key not found. Set the {} environment variable.", var))
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Retries for transient HTTP failures (0 disables retrying)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        api_key_from_env(&self.api_key_env)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 2000,
            timeout_ms: 120_000,
            temperature: 0.0,
            max_retries: 0,
        }
    }
}

/// Candidate search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Environment variable containing the web search API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Web search API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum candidates kept after ranking
    #[serde(rename = "max-results")]
    pub max_results: usize,

    /// Minimum rating a candidate must have
    #[serde(rename = "min-rating")]
    pub min_rating: f64,

    /// Cross-check candidates against web search results
    #[serde(rename = "web-mentions")]
    pub web_mentions: bool,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl SearchConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        api_key_from_env(&self.api_key_env)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: "TAVILY_API_KEY".to_string(),
            base_url: "https://api.tavily.com".to_string(),
            max_results: 20,
            min_rating: 4.0,
            web_mentions: true,
            timeout_ms: 30_000,
        }
    }
}

/// Directions and weather configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    /// Environment variable containing the maps API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Maps API base URL (places, directions)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Weather API base URL
    #[serde(rename = "weather-base-url")]
    pub weather_base_url: String,

    /// Travel mode used when the preferences name none
    #[serde(rename = "default-mode")]
    pub default_mode: String,

    /// Verify the planned course against the directions provider
    #[serde(rename = "verify-route")]
    pub verify_route: bool,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl MapsConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        api_key_from_env(&self.api_key_env)
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GOOGLE_MAPS_API_KEY".to_string(),
            base_url: "https://maps.googleapis.com".to_string(),
            weather_base_url: "https://weather.googleapis.com".to_string(),
            default_mode: "transit".to_string(),
            verify_route: true,
            timeout_ms: 30_000,
        }
    }
}

/// Course planning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum candidates shown to the planner
    #[serde(rename = "max-places")]
    pub max_places: usize,

    /// Places auto-selected when the planner picks nothing usable
    #[serde(rename = "fallback-count")]
    pub fallback_count: usize,

    /// Directory checked for prompt overrides before the embedded templates
    #[serde(rename = "prompt-dir")]
    pub prompt_dir: PathBuf,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_places: 30,
            fallback_count: 5,
            prompt_dir: PathBuf::from(".routepick/prompts"),
        }
    }
}

/// Task registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Entries untouched for this long are evicted
    #[serde(rename = "ttl-secs")]
    pub ttl_secs: u64,

    /// Interval between eviction sweeps
    #[serde(rename = "sweep-interval-secs")]
    pub sweep_interval_secs: u64,
}

impl RegistryConfig {
    /// Eviction TTL; `None` when `ttl-secs` is 0
    pub fn ttl(&self) -> Result<Option<chrono::Duration>> {
        if self.ttl_secs == 0 {
            return Ok(None);
        }
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .map(Some)
            .ok_or_else(|| eyre::eyre!("registry.ttl-secs {} is out of range", self.ttl_secs))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            sweep_interval_secs: 300,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}
