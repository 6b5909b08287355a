//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// CoinGecko public markets listing endpoint.
pub const DEFAULT_MARKETS_API_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";

/// Total item count reported by the pagination control.
///
/// The markets endpoint does not report how many records exist, so this is a
/// fixed upper bound rather than a real count.
pub const DEFAULT_PAGINATION_TOTAL: u32 = 10_000;

/// Log filter used when verbose logging is on.
pub const VERBOSE_LOG_FILTER: &str = "coin_markets=debug,info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Upstream ===
    /// Markets listing endpoint.
    #[serde(default = "default_markets_api_url")]
    pub markets_api_url: String,

    /// Optional request timeout. Unset means the transport's own behavior.
    #[serde(default)]
    pub http_timeout_ms: Option<u64>,

    // === Table ===
    /// Placeholder total item count for the pagination control.
    #[serde(default = "default_pagination_total")]
    pub pagination_total: u32,

    // === Server Configuration ===
    /// HTTP server port for the dashboard.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_markets_api_url() -> String {
    DEFAULT_MARKETS_API_URL.to_string()
}

fn default_pagination_total() -> u32 {
    DEFAULT_PAGINATION_TOTAL
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markets_api_url: default_markets_api_url(),
            http_timeout_ms: None,
            pagination_total: default_pagination_total(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.markets_api_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.markets_api_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.markets_api_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::OutOfRange {
                name: "PORT",
                reason: "must be non-zero".to_string(),
            });
        }

        if self.pagination_total == 0 {
            return Err(ConfigError::OutOfRange {
                name: "PAGINATION_TOTAL",
                reason: "must be positive".to_string(),
            });
        }

        if self.http_timeout_ms == Some(0) {
            return Err(ConfigError::OutOfRange {
                name: "HTTP_TIMEOUT_MS",
                reason: "must be positive when set".to_string(),
            });
        }

        Ok(())
    }

    /// Directives for the log filter: `RUST_LOG`, or crate debug logging
    /// when verbose.
    pub fn log_filter(&self) -> &str {
        if self.verbose {
            VERBOSE_LOG_FILTER
        } else {
            &self.rust_log
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_sensible() {
        let config = Config::default();
        assert_eq!(config.markets_api_url, DEFAULT_MARKETS_API_URL);
        assert_eq!(config.pagination_total, 10_000);
        assert_eq!(config.port, 8080);
        assert!(config.http_timeout_ms.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let config = Config {
            markets_api_url: "ftp://example.com/markets".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn validate_rejects_garbage_url() {
        let config = Config {
            markets_api_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_total() {
        let config = Config {
            pagination_total: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { name: "PAGINATION_TOTAL", .. })
        ));
    }

    #[test]
    fn log_filter_follows_rust_log_and_verbose() {
        let vars = vec![("RUST_LOG".to_string(), "coin_markets=trace,warn".to_string())];
        let mut config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.log_filter(), "coin_markets=trace,warn");

        config.verbose = true;
        assert_eq!(config.log_filter(), VERBOSE_LOG_FILTER);

        assert_eq!(Config::default().log_filter(), "info");
    }

    #[test]
    fn deserializes_from_key_value_pairs() {
        let vars = vec![
            ("MARKETS_API_URL".to_string(), "http://127.0.0.1:9000/markets".to_string()),
            ("HTTP_TIMEOUT_MS".to_string(), "1500".to_string()),
            ("PORT".to_string(), "3000".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.markets_api_url, "http://127.0.0.1:9000/markets");
        assert_eq!(config.http_timeout_ms, Some(1500));
        assert_eq!(config.port, 3000);
        assert_eq!(config.pagination_total, DEFAULT_PAGINATION_TOTAL);
    }
}
