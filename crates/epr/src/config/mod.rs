use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::evaluation::{PeriodUniqueness, ReviewConfig};
use crate::scoring::{InputRangePolicy, ProficiencyLevel, ScoringPolicy};

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
    pub review: ReviewConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            review: load_review_config()?,
        })
    }
}

fn load_review_config() -> Result<ReviewConfig, ConfigError> {
    let default_competency_level = match env::var("EPR_DEFAULT_COMPETENCY_LEVEL") {
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|value| ProficiencyLevel::new(value).ok())
            .ok_or(ConfigError::InvalidCompetencyLevel { value: raw })?,
        Err(_) => ProficiencyLevel::MIDPOINT,
    };

    let input_range = match env::var("EPR_INPUT_RANGE_POLICY") {
        Ok(raw) => {
            InputRangePolicy::parse(&raw).ok_or(ConfigError::InvalidRangePolicy { value: raw })?
        }
        Err(_) => InputRangePolicy::default(),
    };

    let period_uniqueness = match env::var("EPR_ENFORCE_UNIQUE_PERIOD") {
        Ok(raw) => {
            if parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "EPR_ENFORCE_UNIQUE_PERIOD",
                value: raw,
            })? {
                PeriodUniqueness::Enforce
            } else {
                PeriodUniqueness::AllowDuplicates
            }
        }
        Err(_) => PeriodUniqueness::default(),
    };

    Ok(ReviewConfig {
        scoring: ScoringPolicy {
            default_competency_level,
            input_range,
        },
        period_uniqueness,
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
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
    /// Colored output; only enabled for local development.
    pub ansi: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCompetencyLevel { value: String },
    InvalidRangePolicy { value: String },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCompetencyLevel { value } => write!(
                f,
                "EPR_DEFAULT_COMPETENCY_LEVEL must be an integer between 1 and 5, got '{value}'"
            ),
            ConfigError::InvalidRangePolicy { value } => write!(
                f,
                "EPR_INPUT_RANGE_POLICY must be pass-through, clamp or reject, got '{value}'"
            ),
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean flag, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCompetencyLevel { .. }
            | ConfigError::InvalidRangePolicy { .. }
            | ConfigError::InvalidFlag { .. } => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "EPR_DEFAULT_COMPETENCY_LEVEL",
            "EPR_INPUT_RANGE_POLICY",
            "EPR_ENFORCE_UNIQUE_PERIOD",
        ] {
            env::remove_var(key);
        }
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
        assert!(config.telemetry.ansi);
        assert_eq!(config.review, ReviewConfig::default());
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
    fn reads_review_policy_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        env::set_var("EPR_DEFAULT_COMPETENCY_LEVEL", "2");
        env::set_var("EPR_INPUT_RANGE_POLICY", "clamp");
        env::set_var("EPR_ENFORCE_UNIQUE_PERIOD", "true");

        let config = AppConfig::load().expect("config loads");

        assert!(!config.telemetry.ansi);
        assert_eq!(config.review.scoring.default_competency_level.get(), 2);
        assert_eq!(config.review.scoring.input_range, InputRangePolicy::Clamp);
        assert_eq!(config.review.period_uniqueness, PeriodUniqueness::Enforce);
        reset_env();
    }

    #[test]
    fn rejects_out_of_scale_default_level() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EPR_DEFAULT_COMPETENCY_LEVEL", "6");

        match AppConfig::load() {
            Err(ConfigError::InvalidCompetencyLevel { value }) => assert_eq!(value, "6"),
            other => panic!("expected invalid competency level, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_unknown_range_policy_and_flag() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EPR_INPUT_RANGE_POLICY", "ignore");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidRangePolicy { .. })
        ));

        reset_env();
        env::set_var("EPR_ENFORCE_UNIQUE_PERIOD", "maybe");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFlag {
                name: "EPR_ENFORCE_UNIQUE_PERIOD",
                ..
            })
        ));
        reset_env();
    }
}
