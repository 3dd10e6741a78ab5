use thiserror::Error;

/// Failures talking to the payment backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer. `message` carries whatever the server explained, if anything.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    /// 2xx answer with `success: false` or an unusable body.
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    #[error("payment {0} not found")]
    NotFound(String),

    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
