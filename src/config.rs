use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // env-server API
    pub api_base_url: String,
    pub api_timeout_seconds: Option<u64>,

    // Catalog caching
    pub catalog_cache_ttl_seconds: u64,

    // Output
    pub chart_output_path: PathBuf,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_timeout_seconds: None,
            catalog_cache_ttl_seconds: 300,
            chart_output_path: PathBuf::from("chart.json"),
            log_format: LogFormat::Text,
        }
    }
}

/// moka refuses a time-to-live longer than 1000 years.
const MAX_CACHE_TTL_SECONDS: u64 = 1000 * 365 * 24 * 60 * 60;

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key/value source, with defaults for
    /// unset keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a key is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let catalog_cache_ttl_seconds = match lookup("CATALOG_CACHE_TTL_SECONDS") {
            Some(raw) => {
                let parsed = raw.trim().parse::<u64>();
                match parsed {
                    Ok(secs) if secs <= MAX_CACHE_TTL_SECONDS => secs,
                    _ => return Err(ConfigError::Invalid("CATALOG_CACHE_TTL_SECONDS", raw)),
                }
            }
            None => defaults.catalog_cache_ttl_seconds,
        };

        Ok(Self {
            // env-server API
            api_base_url: lookup("ENV_API_BASE_URL")
                .map(|url| normalize_base_url(&url))
                .unwrap_or(defaults.api_base_url),
            api_timeout_seconds: match lookup("ENV_API_TIMEOUT_SECONDS") {
                Some(raw) => {
                    let parsed = raw.trim().parse::<u64>();
                    Some(parsed.map_err(|_| ConfigError::Invalid("ENV_API_TIMEOUT_SECONDS", raw))?)
                }
                None => None,
            },

            // Catalog caching
            catalog_cache_ttl_seconds,

            // Output
            chart_output_path: lookup("CHART_OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.chart_output_path),
            log_format: LogFormat::from_str(
                &lookup("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
            ),
        })
    }

    /// Replace the API origin, e.g. from a command-line flag.
    #[must_use]
    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = normalize_base_url(url);
        self
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.api_timeout_seconds.map(Duration::from_secs)
    }

    #[must_use]
    pub fn catalog_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_cache_ttl_seconds.min(MAX_CACHE_TTL_SECONDS))
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
