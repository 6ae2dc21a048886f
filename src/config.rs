//! Configuration management for companyscout
//!
//! All configuration is loaded from `./config/companyscout.toml`.
//! No hardcoded defaults exist in source code - all defaults are in the config template.
//! Site credentials are the one exception: they come from the environment,
//! never from the config file.

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/companyscout.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/companyscout.toml");

/// Environment variable holding the account email for the site login.
pub const EMAIL_ENV_VAR: &str = "COMPANYSCOUT_EMAIL";

/// Environment variable holding the account password for the site login.
pub const PASSWORD_ENV_VAR: &str = "COMPANYSCOUT_PASSWORD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("'{field}' must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Missing exchange rate for '{0}' in [currency.usd_rates]")]
    MissingRate(String),

    #[error("Missing credential: set the {0} environment variable")]
    MissingCredential(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub browser: BrowserConfig,
    pub matcher: MatcherConfig,
    pub currency: CurrencyConfig,
    pub output: OutputConfig,
}

/// Target site layout: where to search and how company URLs compose
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub base_url: String,
    pub search_path: String,
    pub financials_segment: String,
}

/// Browser navigation timing
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    pub page_load_timeout_secs: u64,
    pub render_wait_ms: u64,
}

impl BrowserConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn render_wait(&self) -> Duration {
        Duration::from_millis(self.render_wait_ms)
    }
}

/// Search result matching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    pub similarity_threshold: f64,
    pub max_candidates: usize,
}

/// Currency conversion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    /// Units of each currency per 1 USD, keyed by lowercase ISO code.
    pub usd_rates: HashMap<String, f64>,
}

/// Output file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub csv_path: String,
    pub progress_csv_path: String,
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

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.site.base_url.starts_with("http://") && !self.site.base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidUrl {
                field: "site.base_url".to_string(),
                url: self.site.base_url.clone(),
            });
        }
        if !self.site.search_path.starts_with('/') {
            return Err(ConfigError::EmptyRequired {
                field: "site.search_path (must start with '/')".to_string(),
            });
        }
        if !self.site.financials_segment.starts_with('/') {
            return Err(ConfigError::EmptyRequired {
                field: "site.financials_segment (must start with '/')".to_string(),
            });
        }

        if self.browser.page_load_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "browser.page_load_timeout_secs".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.matcher.similarity_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "matcher.similarity_threshold".to_string(),
                min: 0.0,
                max: 1.0,
                value: self.matcher.similarity_threshold,
            });
        }
        if self.matcher.max_candidates == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "matcher.max_candidates".to_string(),
            });
        }

        // Both CSV funding columns need a rate; everything else is optional.
        for code in ["usd", "cny"] {
            if !self.currency.usd_rates.contains_key(code) {
                return Err(ConfigError::MissingRate(code.to_string()));
            }
        }
        for (code, rate) in &self.currency.usd_rates {
            if *rate <= 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: format!("currency.usd_rates.{}", code),
                    min: 0.0,
                    max: f64::INFINITY,
                    value: *rate,
                });
            }
        }

        if self.output.csv_path.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "output.csv_path".to_string(),
            });
        }
        if self.output.progress_csv_path.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "output.progress_csv_path".to_string(),
            });
        }

        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write default config
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        atty::is(atty::Stream::Stdin)
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config() -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("Configuration file not found. Create default config? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config()?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}

/// Site login credentials, sourced from the environment only.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Read credentials from the environment. Missing or empty variables
    /// are a startup failure; there is no anonymous mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        let email = env::var(EMAIL_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential(EMAIL_ENV_VAR.to_string()))?;
        let password = env::var(PASSWORD_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential(PASSWORD_ENV_VAR.to_string()))?;

        Ok(Self { email, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: Result<AppConfig, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok(), "Default config should parse: {:?}", config.err());
    }

    #[test]
    fn test_default_config_validates() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.validate().is_ok(), "Default config should validate");
    }

    #[test]
    fn test_default_config_required_rates_present() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.currency.usd_rates.contains_key("usd"));
        assert!(config.currency.usd_rates.contains_key("cny"));
    }

    #[test]
    fn test_missing_cny_rate_rejected() {
        let mut config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        config.currency.usd_rates.remove("cny");
        match config.validate() {
            Err(ConfigError::MissingRate(code)) => assert_eq!(code, "cny"),
            other => panic!("expected MissingRate, got {:?}", other),
        }
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let mut config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        config.matcher.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        let mut config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        config.currency.usd_rates.insert("eur".to_string(), 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        config.site.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_browser_durations() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(
            config.browser.page_load_timeout(),
            Duration::from_secs(config.browser.page_load_timeout_secs)
        );
        assert_eq!(
            config.browser.render_wait(),
            Duration::from_millis(config.browser.render_wait_ms)
        );
    }
}
