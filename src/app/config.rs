use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://e-slip-backend.vercel.app/api";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base of `/generate-code` and `/payments`.
    pub api_base_url: String,
    /// Base of `/payments/{id}` for the receipt page.
    pub receipt_base_url: String,
    /// 0 leaves the transport default in place.
    pub request_timeout_ms: u64,
    pub redirect_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            receipt_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: 0,
            redirect_delay_ms: 1200,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| defaults.api_base_url.clone());

        Self {
            receipt_base_url: env::var("RECEIPT_BASE_URL")
                .unwrap_or_else(|_| api_base_url.clone()),
            api_base_url,
            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(defaults.request_timeout_ms),
            redirect_delay_ms: env::var("REDIRECT_DELAY_MS")
                .unwrap_or_else(|_| "1200".to_string())
                .parse()
                .unwrap_or(defaults.redirect_delay_ms),
        }
    }

    /// Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("api_base_url", &self.api_base_url),
            ("receipt_base_url", &self.receipt_base_url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidValue { key, value: value.clone() });
            }
        }
        Ok(())
    }
}
