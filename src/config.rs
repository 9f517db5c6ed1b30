//! Configuration management for sitefinder
//!
//! Defaults ship as an embedded TOML template; a user config file only needs
//! the keys it overrides. Search credentials left empty put the tool in
//! guess-only mode.

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::liveness::DEFAULT_USER_AGENT;
use crate::resolver::ResolverSettings;
use crate::search::SearchCredentials;

/// Configuration file path relative to the working directory
pub const CONFIG_PATH: &str = "./config/sitefinder.toml";

/// Default configuration file content, also used when no file exists
pub const DEFAULT_CONFIG: &str = include_str!("../config/sitefinder.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Configuration field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: u64,
        max: u64,
        actual: u64,
    },
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Search API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// API key; empty disables the search path
    #[serde(default)]
    pub api_key: String,
    /// Programmable engine id; empty disables the search path
    #[serde(default)]
    pub cx: String,
    /// Results requested per query (the API accepts 1 to 10)
    #[serde(default = "default_max_results")]
    pub max_results: u8,
    /// Pause ahead of every API request (milliseconds)
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    /// Per-request API timeout (seconds)
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,
}

fn default_max_results() -> u8 {
    5
}

fn default_pause_ms() -> u64 {
    200
}

fn default_api_timeout_secs() -> u64 {
    15
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            cx: String::new(),
            max_results: default_max_results(),
            pause_ms: default_pause_ms(),
            api_timeout_secs: default_api_timeout_secs(),
        }
    }
}

/// Liveness probe configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-probe timeout (seconds)
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_probe_timeout_secs() -> u64 {
    8
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Candidate generation and batch pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// TLDs tried, in order, when guessing domains from the entity name
    #[serde(default = "default_candidate_tlds")]
    pub candidate_tlds: Vec<String>,
    /// Pause between entities (milliseconds), applied only when search
    /// credentials are configured
    #[serde(default = "default_entity_sleep_ms")]
    pub entity_sleep_ms: u64,
}

fn default_candidate_tlds() -> Vec<String> {
    vec!["com".to_string(), "org".to_string(), "net".to_string()]
}

fn default_entity_sleep_ms() -> u64 {
    200
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            candidate_tlds: default_candidate_tlds(),
            entity_sleep_ms: default_entity_sleep_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, the default path, or fall back to the
    /// embedded defaults.
    ///
    /// An explicit path must exist; the default path is optional because a
    /// config file is not required to run.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => {
                let path = Path::new(CONFIG_PATH);
                if path.exists() {
                    Self::load_from_path(path)
                } else {
                    debug!("No config file at {CONFIG_PATH}, using built-in defaults");
                    Self::built_in()
                }
            }
        }
    }

    /// Parse the embedded default template
    pub fn built_in() -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.timeout_secs".to_string(),
            });
        }

        if self.search.api_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "search.api_timeout_secs".to_string(),
            });
        }
        if !(1..=10).contains(&self.search.max_results) {
            return Err(ConfigError::OutOfRange {
                field: "search.max_results".to_string(),
                min: 1,
                max: 10,
                actual: u64::from(self.search.max_results),
            });
        }

        if self.resolver.candidate_tlds.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "resolver.candidate_tlds".to_string(),
            });
        }
        for (i, tld) in self.resolver.candidate_tlds.iter().enumerate() {
            if tld.trim().is_empty() {
                return Err(ConfigError::EmptyRequired {
                    field: format!("resolver.candidate_tlds[{}]", i),
                });
            }
        }

        Ok(())
    }

    /// Search credentials, present only when both halves are set
    pub fn search_credentials(&self) -> Option<SearchCredentials> {
        let api_key = self.search.api_key.trim();
        let cx = self.search.cx.trim();
        if api_key.is_empty() || cx.is_empty() {
            return None;
        }
        Some(SearchCredentials::new(api_key, cx))
    }

    /// Resolver tunables derived from this configuration
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            user_agent: self.http.user_agent.clone(),
            search_pause: Duration::from_millis(self.search.pause_ms),
            search_timeout: Duration::from_secs(self.search.api_timeout_secs),
            search_max_results: self.search.max_results,
            ..ResolverSettings::default()
        }
    }

    /// Per-probe liveness timeout
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Pause between entities in the batch loop
    pub fn entity_sleep(&self) -> Duration {
        Duration::from_millis(self.resolver.entity_sleep_ms)
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: Result<AppConfig, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(
            config.is_ok(),
            "Default config should parse: {:?}",
            config.err()
        );
    }

    #[test]
    fn test_default_config_validates() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.validate().is_ok(), "Default config should validate");
    }

    #[test]
    fn test_template_matches_built_in_defaults() {
        let from_template: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        let built_in = AppConfig::default();

        assert_eq!(from_template.search.max_results, built_in.search.max_results);
        assert_eq!(from_template.search.pause_ms, built_in.search.pause_ms);
        assert_eq!(
            from_template.search.api_timeout_secs,
            built_in.search.api_timeout_secs
        );
        assert_eq!(from_template.http.timeout_secs, built_in.http.timeout_secs);
        assert_eq!(from_template.http.user_agent, built_in.http.user_agent);
        assert_eq!(
            from_template.resolver.candidate_tlds,
            built_in.resolver.candidate_tlds
        );
        assert_eq!(
            from_template.resolver.entity_sleep_ms,
            built_in.resolver.entity_sleep_ms
        );
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config_str = r#"
[search]
api_key = "key-123"
cx = "cx-456"
"#;

        let config: AppConfig = toml::from_str(config_str).expect("Config should parse");

        assert_eq!(config.search.api_key, "key-123");
        assert_eq!(config.search.cx, "cx-456");
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.http.timeout_secs, 8);
        assert_eq!(
            config.resolver.candidate_tlds,
            vec!["com".to_string(), "org".to_string(), "net".to_string()]
        );
    }

    #[test]
    fn test_overrides_parse() {
        let config_str = r#"
[search]
max_results = 8
pause_ms = 50
api_timeout_secs = 30

[http]
timeout_secs = 4
user_agent = "test/1.0"

[resolver]
candidate_tlds = ["com", "io"]
entity_sleep_ms = 0
"#;

        let config: AppConfig = toml::from_str(config_str).expect("Config should parse");
        config.validate().expect("Config should validate");

        assert_eq!(config.search.max_results, 8);
        assert_eq!(config.search.pause_ms, 50);
        assert_eq!(config.http.timeout_secs, 4);
        assert_eq!(config.http.user_agent, "test/1.0");
        assert_eq!(config.resolver.candidate_tlds, vec!["com", "io"]);
        assert_eq!(config.resolver.entity_sleep_ms, 0);
    }

    #[test]
    fn test_empty_credentials_mean_guess_only() {
        let config = AppConfig::default();
        assert!(config.search_credentials().is_none());
    }

    #[test]
    fn test_blank_credentials_mean_guess_only() {
        let mut config = AppConfig::default();
        config.search.api_key = "  ".to_string();
        config.search.cx = "cx-456".to_string();
        assert!(config.search_credentials().is_none());
    }

    #[test]
    fn test_full_credentials_trimmed() {
        let mut config = AppConfig::default();
        config.search.api_key = " key-123 ".to_string();
        config.search.cx = "cx-456".to_string();

        let creds = config.search_credentials().expect("both halves set");
        assert_eq!(creds.api_key, "key-123");
        assert_eq!(creds.cx, "cx-456");
    }

    #[test]
    fn test_zero_probe_timeout_rejected() {
        let mut config = AppConfig::default();
        config.http.timeout_secs = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http.timeout_secs"));
    }

    #[test]
    fn test_max_results_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.search.max_results = 0;
        assert!(config.validate().is_err());

        config.search.max_results = 11;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search.max_results"));
        assert!(err.to_string().contains("got 11"));
    }

    #[test]
    fn test_empty_tld_list_rejected() {
        let mut config = AppConfig::default();
        config.resolver.candidate_tlds.clear();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("resolver.candidate_tlds"));
    }

    #[test]
    fn test_blank_tld_rejected() {
        let mut config = AppConfig::default();
        config.resolver.candidate_tlds = vec!["com".to_string(), " ".to_string()];

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("candidate_tlds[1]"));
    }

    #[test]
    fn test_resolver_settings_carry_search_tunables() {
        let mut config = AppConfig::default();
        config.search.max_results = 7;
        config.search.pause_ms = 50;
        config.search.api_timeout_secs = 20;
        config.http.user_agent = "test/1.0".to_string();

        let settings = config.resolver_settings();
        assert_eq!(settings.search_max_results, 7);
        assert_eq!(settings.search_pause, Duration::from_millis(50));
        assert_eq!(settings.search_timeout, Duration::from_secs(20));
        assert_eq!(settings.user_agent, "test/1.0");
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let err = AppConfig::load_from_path(Path::new("/nonexistent/sitefinder.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
