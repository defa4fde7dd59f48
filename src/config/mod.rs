use crate::workflows::presale::error::AnalysisError;
use crate::workflows::presale::lead::{
    PriceRange, ScoringConfig, DEFAULT_PRICE_HIGH, DEFAULT_PRICE_LOW,
};
use crate::workflows::presale::narrative::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub narrative: NarrativeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let low = price_var("APP_PRICE_RANGE_LOW", DEFAULT_PRICE_LOW)?;
        let high = price_var("APP_PRICE_RANGE_HIGH", DEFAULT_PRICE_HIGH)?;
        let price_range = PriceRange::new(low, high).map_err(ConfigError::InvalidPriceRange)?;

        let api_key = env::var("APP_NARRATIVE_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let model = env::var("APP_NARRATIVE_MODEL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let base_url = env::var("APP_NARRATIVE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig { price_range },
            narrative: NarrativeConfig {
                api_key,
                model,
                base_url,
            },
        })
    }
}

fn price_var(variable: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(variable) {
        Ok(value) => value
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidPrice { variable }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Text-generation backend. Narratives stay disabled without an API key.
#[derive(Clone)]
pub struct NarrativeConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl NarrativeConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for NarrativeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrativeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPrice { variable: &'static str },
    InvalidPriceRange(AnalysisError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPrice { variable } => {
                write!(f, "{variable} must be a number in 억 units")
            }
            ConfigError::InvalidPriceRange(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPrice { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPriceRange(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_PRICE_RANGE_LOW");
        env::remove_var("APP_PRICE_RANGE_HIGH");
        env::remove_var("APP_NARRATIVE_API_KEY");
        env::remove_var("APP_NARRATIVE_MODEL");
        env::remove_var("APP_NARRATIVE_BASE_URL");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.scoring.price_range, PriceRange::default());
        assert!(!config.narrative.is_enabled());
        assert_eq!(config.narrative.model, "gemini-2.5-flash");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn price_range_comes_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PRICE_RANGE_LOW", "12.5");
        env::set_var("APP_PRICE_RANGE_HIGH", "15");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.price_range.low, 12.5);
        assert_eq!(config.scoring.price_range.high, 15.0);
        reset_env();
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PRICE_RANGE_LOW", "17");
        let error = AppConfig::load().expect_err("low above default high");
        assert!(matches!(error, ConfigError::InvalidPriceRange(_)));

        env::set_var("APP_PRICE_RANGE_LOW", "thirteen");
        let error = AppConfig::load().expect_err("non-numeric low");
        assert!(matches!(
            error,
            ConfigError::InvalidPrice {
                variable: "APP_PRICE_RANGE_LOW"
            }
        ));
        reset_env();
    }

    #[test]
    fn narrative_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_NARRATIVE_API_KEY", "  test-key ");
        env::set_var("APP_NARRATIVE_MODEL", "gemini-2.5-pro");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.narrative.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.narrative.model, "gemini-2.5-pro");
        assert_eq!(
            config.narrative.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert!(!format!("{:?}", config.narrative).contains("test-key"));

        env::set_var("APP_NARRATIVE_API_KEY", " ");
        let config = AppConfig::load().expect("config loads");
        assert!(!config.narrative.is_enabled());
        reset_env();
    }
}
