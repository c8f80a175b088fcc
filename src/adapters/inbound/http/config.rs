use std::{path::PathBuf, time::Duration};

/// Deployment mode; development exposes internal error details to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        *self == Environment::Development
    }
}

/// Request ceiling per client within a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
        }
    }
}

/// Settings for the HTTP shell
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub environment: Environment,
    /// `*` allows any origin
    pub cors_origin: String,
    /// `None` disables rate limiting
    pub rate_limit: Option<RateLimitConfig>,
    /// Directory for multipart uploads awaiting transfer to the media store
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub max_json_bytes: usize,
    pub max_images: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            cors_origin: "*".to_string(),
            rate_limit: Some(RateLimitConfig::default()),
            upload_dir: std::env::temp_dir(),
            max_upload_bytes: 50 * 1024 * 1024,
            max_json_bytes: 10 * 1024 * 1024,
            max_images: 10,
        }
    }
}
