//! Configuration module
//!
//! Environment-driven configuration for the HTTP server, the automation
//! bridge connection and the check pacing. Loaded once at startup with
//! `Config::from_env` and checked with `Config::validate`.

use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 5;
const DEFAULT_MAX_BULK_NUMBERS: usize = 1000;
const DEFAULT_BRIDGE_URL: &str = "http://localhost:21465";
const DEFAULT_BRIDGE_SESSION: &str = "whatsapp-filter";
const DEFAULT_BRIDGE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CHECK_DELAY_MS: u64 = 2000;
const DEFAULT_CONFIRMATION_DELAY_MS: u64 = 1000;
const DEFAULT_RESTART_DELAY_MS: u64 = 2000;
const DEFAULT_INIT_RETRY_SECS: u64 = 30;
const DEFAULT_STATUS_POLL_SECS: u64 = 3;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub debug: bool,
    pub log_format: String,
    pub static_dir: String,
    pub http_concurrency_limit: Option<usize>,
    pub max_upload_size_bytes: usize,
    pub max_bulk_numbers: usize,
}

/// Connection to the automation bridge that owns the headless browser
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    pub url: String,
    pub session: String,
    pub token: Option<String>,
    pub secret_key: Option<String>,
    pub timeout_secs: u64,
    pub chrome_executable_path: Option<String>,
}

/// Pacing of checks and session lifecycle timers
#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub check_delay_ms: u64,
    pub confirmation_delay_ms: u64,
    pub restart_delay_ms: u64,
    pub init_retry_secs: u64,
    pub status_poll_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            check_delay_ms: DEFAULT_CHECK_DELAY_MS,
            confirmation_delay_ms: DEFAULT_CONFIRMATION_DELAY_MS,
            restart_delay_ms: DEFAULT_RESTART_DELAY_MS,
            init_retry_secs: DEFAULT_INIT_RETRY_SECS,
            status_poll_secs: DEFAULT_STATUS_POLL_SECS,
        }
    }
}

impl TimingConfig {
    /// All delays set to zero, for tests
    pub fn immediate() -> Self {
        Self {
            check_delay_ms: 0,
            confirmation_delay_ms: 0,
            restart_delay_ms: 0,
            init_retry_secs: 0,
            status_poll_secs: 0,
        }
    }

    pub fn check_delay(&self) -> Duration {
        Duration::from_millis(self.check_delay_ms)
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn init_retry(&self) -> Duration {
        Duration::from_secs(self.init_retry_secs)
    }

    pub fn status_poll(&self) -> Duration {
        Duration::from_secs(self.status_poll_secs)
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub bridge: BridgeConfig,
    pub timing: TimingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_MB);

        let server = ServerConfig {
            port: lookup("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            debug: lookup("DEBUG")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            log_format: lookup("LOG_FORMAT")
                .map(|v| v.to_lowercase())
                .unwrap_or_else(|| "compact".to_string()),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
            http_concurrency_limit: lookup("HTTP_CONCURRENCY_LIMIT")
                .and_then(|v| v.parse::<usize>().ok()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            max_bulk_numbers: lookup("MAX_BULK_NUMBERS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BULK_NUMBERS),
        };

        let bridge = BridgeConfig {
            url: lookup("BRIDGE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string()),
            session: lookup("BRIDGE_SESSION").unwrap_or_else(|| DEFAULT_BRIDGE_SESSION.to_string()),
            token: lookup("BRIDGE_TOKEN").filter(|v| !v.trim().is_empty()),
            secret_key: lookup("BRIDGE_SECRET_KEY").filter(|v| !v.trim().is_empty()),
            timeout_secs: lookup("BRIDGE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BRIDGE_TIMEOUT_SECS),
            chrome_executable_path: lookup("CHROME_EXECUTABLE_PATH")
                .filter(|v| !v.trim().is_empty()),
        };

        let timing = TimingConfig {
            check_delay_ms: lookup("CHECK_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CHECK_DELAY_MS),
            confirmation_delay_ms: lookup("CONFIRMATION_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CONFIRMATION_DELAY_MS),
            restart_delay_ms: lookup("RESTART_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RESTART_DELAY_MS),
            init_retry_secs: lookup("INIT_RETRY_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INIT_RETRY_SECS),
            status_poll_secs: lookup("STATUS_POLL_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_STATUS_POLL_SECS),
        };

        Ok(Config {
            server,
            bridge,
            timing,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.bridge.url.starts_with("http://") && !self.bridge.url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "BRIDGE_URL must be an http:// or https:// URL"
            ));
        }

        if self.bridge.session.trim().is_empty() {
            return Err(anyhow::anyhow!("BRIDGE_SESSION must not be empty"));
        }

        if self.bridge.token.is_none() && self.bridge.secret_key.is_none() {
            return Err(anyhow::anyhow!(
                "Either BRIDGE_TOKEN or BRIDGE_SECRET_KEY must be set to authenticate with the bridge"
            ));
        }

        if self.server.max_bulk_numbers == 0 {
            return Err(anyhow::anyhow!("MAX_BULK_NUMBERS must be greater than 0"));
        }

        if self.timing.status_poll_secs == 0 {
            return Err(anyhow::anyhow!("STATUS_POLL_SECS must be greater than 0"));
        }

        if self.server.log_format != "compact" && self.server.log_format != "json" {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'compact' or 'json'"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.server.environment)
    }

    /// Debug mode raises per-number diagnostic logging in the check service
    pub fn debug_enabled(&self) -> bool {
        self.server.debug || self.server.environment.eq_ignore_ascii_case("development")
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.server.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.server.environment
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("BRIDGE_SECRET_KEY", "s3cret")])).unwrap();
        assert_eq!(config.server_port(), 3000);
        assert_eq!(config.environment(), "development");
        assert_eq!(config.cors_origins(), &["*".to_string()]);
        assert_eq!(config.server.static_dir, "static");
        assert_eq!(config.server.max_upload_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.server.max_bulk_numbers, 1000);
        assert_eq!(config.bridge.url, "http://localhost:21465");
        assert_eq!(config.bridge.session, "whatsapp-filter");
        assert_eq!(config.timing.check_delay(), Duration::from_millis(2000));
        assert_eq!(config.timing.confirmation_delay(), Duration::from_millis(1000));
        assert_eq!(config.timing.init_retry(), Duration::from_secs(30));
        assert!(config.debug_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let result = Config::from_lookup(lookup_from(&[("ENVIRONMENT", "production")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_production_with_explicit_origins() {
        let config = Config::from_lookup(lookup_from(&[
            ("APP_ENV", "prod"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("BRIDGE_TOKEN", "abc"),
        ]))
        .unwrap();
        assert!(config.is_production());
        assert!(!config.debug_enabled());
        assert_eq!(config.cors_origins().len(), 2);
        assert_eq!(config.cors_origins()[1], "https://b.example");
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_requires_bridge_credentials() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("BRIDGE_TOKEN"));
    }

    #[test]
    fn test_bridge_url_trailing_slash_trimmed() {
        let config = Config::from_lookup(lookup_from(&[
            ("BRIDGE_URL", "http://bridge:21465/"),
            ("BRIDGE_TOKEN", "abc"),
        ]))
        .unwrap();
        assert_eq!(config.bridge.url, "http://bridge:21465");
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let config = Config::from_lookup(lookup_from(&[
            ("LOG_FORMAT", "pretty"),
            ("BRIDGE_TOKEN", "abc"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }
}
