use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::workflows::matching::config::{MatchingConfig, MatchingConfigError};

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
    pub matching: MatchingConfig,
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
        let ansi = env_or("APP_LOG_ANSI", environment == AppEnvironment::Development)?;

        let matching = load_matching()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_targets: false,
                ansi,
            },
            matching,
        })
    }
}

/// Matching weights and limits with `MATCH_*` overrides on top of the defaults.
fn load_matching() -> Result<MatchingConfig, ConfigError> {
    let defaults = MatchingConfig::default();
    let config = MatchingConfig {
        practical_weight: env_or("MATCH_PRACTICAL_WEIGHT", defaults.practical_weight)?,
        compatibility_weight: env_or("MATCH_COMPATIBILITY_WEIGHT", defaults.compatibility_weight)?,
        trust_weight: env_or("MATCH_TRUST_WEIGHT", defaults.trust_weight)?,
        min_budget_overlap_percent: env_or(
            "MATCH_MIN_BUDGET_OVERLAP_PERCENT",
            defaults.min_budget_overlap_percent,
        )?,
        max_date_difference_days: env_or(
            "MATCH_MAX_DATE_DIFFERENCE_DAYS",
            defaults.max_date_difference_days,
        )?,
        verified_boost: env_or("MATCH_VERIFIED_BOOST", defaults.verified_boost)?,
        trusted_boost: env_or("MATCH_TRUSTED_BOOST", defaults.trusted_boost)?,
        max_candidates: env_or("MATCH_MAX_CANDIDATES", defaults.max_candidates)?,
        max_combinations_evaluated: env_or(
            "MATCH_MAX_COMBINATIONS",
            defaults.max_combinations_evaluated,
        )?,
        default_max_suggestions: defaults.default_max_suggestions,
        active_suggestion_limit: defaults.active_suggestion_limit,
    };

    config.validate()?;
    Ok(config)
}

fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
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
    pub include_targets: bool,
    pub ansi: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str, value: String },
    Matching(MatchingConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} has an unparsable value '{value}'")
            }
            ConfigError::Matching(err) => write!(f, "invalid matching configuration: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Matching(err) => Some(err),
        }
    }
}

impl From<MatchingConfigError> for ConfigError {
    fn from(value: MatchingConfigError) -> Self {
        Self::Matching(value)
    }
}
