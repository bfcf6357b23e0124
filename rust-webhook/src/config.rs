//! Configuration module for environment variable parsing.
//!
//! All configuration is read once at startup and shared read-only afterwards.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::dispatch::{MAX_CONCURRENCY, MAX_QUEUE_CAPACITY};
use crate::error::ConfigError;

/// Default Readability parser endpoint.
pub const DEFAULT_READABILITY_API_URL: &str = "https://www.readability.com/api/content/v1/parser";

/// Default Mailgun API base URL.
pub const DEFAULT_MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// API token for the content-extraction service
    pub readability_key: String,

    /// Parser endpoint of the content-extraction service
    pub readability_api_url: String,

    /// Shared mailbox that processed messages are forwarded to
    pub group_address: String,

    /// Mailgun sending domain
    pub mailgun_domain: String,

    /// Mailgun private API key
    pub mailgun_api_key: String,

    /// Mailgun API base URL (without the domain segment)
    pub mailgun_api_base: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// Deadline for each outbound HTTP call in milliseconds
    pub request_timeout_ms: u64,

    /// Number of messages the intake queue buffers before rejecting
    pub intake_queue_capacity: usize,

    /// Maximum number of messages processed concurrently
    pub worker_concurrency: usize,

    /// Mailgun signing key for HMAC signature verification
    pub mailgun_signing_key: Option<String>,

    /// Maximum age in seconds for Mailgun webhook timestamps
    pub mailgun_signature_max_age: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnvVar(name))
        };

        let config = Config {
            readability_key: required("READABILITY_KEY")?,

            readability_api_url: lookup("READABILITY_API_URL")
                .unwrap_or_else(|| DEFAULT_READABILITY_API_URL.to_string()),

            group_address: required("GROUP_EMAIL_ADDRESS")?,

            mailgun_domain: required("RWNEWS_MAILGUN_DOMAIN")
                .or_else(|_| required("MAILGUN_DOMAIN"))?,

            mailgun_api_key: required("MAILGUN_API_KEY")?,

            mailgun_api_base: lookup("MAILGUN_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_MAILGUN_API_BASE.to_string()),

            port: parse_or("PORT", lookup("PORT"), 5000),

            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", lookup("REQUEST_TIMEOUT_MS"), 8000),

            intake_queue_capacity: parse_or(
                "INTAKE_QUEUE_CAPACITY",
                lookup("INTAKE_QUEUE_CAPACITY"),
                64,
            ),

            worker_concurrency: parse_or("WORKER_CONCURRENCY", lookup("WORKER_CONCURRENCY"), 100),

            mailgun_signing_key: lookup("MAILGUN_SIGNING_KEY"),

            mailgun_signature_max_age: parse_or(
                "MAILGUN_SIGNATURE_MAX_AGE",
                lookup("MAILGUN_SIGNATURE_MAX_AGE"),
                300, // 5 minutes default
            ),
        };

        if !(1..=MAX_QUEUE_CAPACITY).contains(&config.intake_queue_capacity) {
            return Err(ConfigError::InvalidValue {
                key: "INTAKE_QUEUE_CAPACITY",
                message: format!("must be between 1 and {}", MAX_QUEUE_CAPACITY),
            });
        }

        if !(1..=MAX_CONCURRENCY as usize).contains(&config.worker_concurrency) {
            return Err(ConfigError::InvalidValue {
                key: "WORKER_CONCURRENCY",
                message: format!("must be between 1 and {}", MAX_CONCURRENCY),
            });
        }

        Ok(config)
    }

    /// Deadline applied to every outbound HTTP call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Parse an optional raw value, falling back to the default when absent or invalid.
fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr,
{
    let raw = match raw {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("READABILITY_KEY", "read-key"),
            ("GROUP_EMAIL_ADDRESS", "group@example.com"),
            ("MAILGUN_DOMAIN", "mg.example.com"),
            ("MAILGUN_API_KEY", "key-123"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_vars()).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.readability_api_url, DEFAULT_READABILITY_API_URL);
        assert_eq!(config.mailgun_api_base, DEFAULT_MAILGUN_API_BASE);
        assert_eq!(config.request_timeout(), Duration::from_millis(8000));
        assert_eq!(config.intake_queue_capacity, 64);
        assert_eq!(config.worker_concurrency, 100);
        assert!(config.mailgun_signing_key.is_none());
        assert_eq!(config.mailgun_signature_max_age, 300);
    }

    #[test]
    fn test_missing_required_var() {
        let mut vars = base_vars();
        vars.remove("GROUP_EMAIL_ADDRESS");

        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("GROUP_EMAIL_ADDRESS")));
    }

    #[test]
    fn test_blank_required_var_is_missing() {
        let mut vars = base_vars();
        vars.insert("READABILITY_KEY", "   ");

        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("READABILITY_KEY")));
    }

    #[test]
    fn test_rwnews_domain_takes_precedence() {
        let mut vars = base_vars();
        vars.insert("RWNEWS_MAILGUN_DOMAIN", "news.example.com");

        let config = load(&vars).unwrap();
        assert_eq!(config.mailgun_domain, "news.example.com");
    }

    #[test]
    fn test_invalid_number_falls_back() {
        let mut vars = base_vars();
        vars.insert("PORT", "not-a-port");
        vars.insert("WORKER_CONCURRENCY", "8");

        let config = load(&vars).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.worker_concurrency, 8);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut vars = base_vars();
        vars.insert("INTAKE_QUEUE_CAPACITY", "0");

        let err = load(&vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "INTAKE_QUEUE_CAPACITY",
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_limits_rejected() {
        let mut vars = base_vars();
        vars.insert("WORKER_CONCURRENCY", "4294967297");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidValue {
                key: "WORKER_CONCURRENCY",
                ..
            }
        ));

        let mut vars = base_vars();
        vars.insert("INTAKE_QUEUE_CAPACITY", "100001");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidValue {
                key: "INTAKE_QUEUE_CAPACITY",
                ..
            }
        ));
    }

    #[test]
    fn test_limits_at_upper_bound_accepted() {
        let mut vars = base_vars();
        vars.insert("WORKER_CONCURRENCY", "10000");
        vars.insert("INTAKE_QUEUE_CAPACITY", "100000");

        let config = load(&vars).unwrap();
        assert_eq!(config.worker_concurrency, 10_000);
        assert_eq!(config.intake_queue_capacity, 100_000);
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let mut vars = base_vars();
        vars.insert("MAILGUN_API_BASE", "http://localhost:9000/v3/");

        let config = load(&vars).unwrap();
        assert_eq!(config.mailgun_api_base, "http://localhost:9000/v3");
    }
}
