use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::recommendation::encoding::MissingValuePolicy;
use crate::recommendation::scenario::{EnumerationPolicy, FallbackStrategy};
use crate::recommendation::{InterventionDimension, DEFAULT_TOP_K};

const DEFAULT_SAMPLE_COUNT: usize = 32;
const DEFAULT_SAMPLE_SEED: u64 = 42;

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
    pub recommender: RecommenderConfig,
    pub models: ModelConfig,
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
            telemetry: TelemetryConfig { log_level },
            recommender: RecommenderConfig::from_env()?,
            models: ModelConfig::from_env(),
        })
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

/// Knobs for scenario enumeration, ranking and missing-value handling.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    pub top_k: usize,
    pub interventions: Vec<InterventionDimension>,
    pub enumeration: EnumerationPolicy,
    pub missing_values: MissingValuePolicy,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            interventions: InterventionDimension::ALL.to_vec(),
            enumeration: EnumerationPolicy::default(),
            missing_values: MissingValuePolicy::default(),
        }
    }
}

impl RecommenderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let top_k = parse_var("ASSESSMENT_TOP_K", defaults.top_k)?;
        let exhaustive_limit = parse_var(
            "ASSESSMENT_EXHAUSTIVE_LIMIT",
            defaults.enumeration.exhaustive_limit,
        )?;

        let fallback = match env::var("ASSESSMENT_FALLBACK_STRATEGY") {
            Err(_) => FallbackStrategy::SingleFlag,
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "single_flag" => FallbackStrategy::SingleFlag,
                "sampled" => FallbackStrategy::Sampled {
                    samples: parse_var("ASSESSMENT_SAMPLE_COUNT", DEFAULT_SAMPLE_COUNT)?,
                    seed: parse_var("ASSESSMENT_SAMPLE_SEED", DEFAULT_SAMPLE_SEED)?,
                },
                _ => return Err(ConfigError::InvalidStrategy(value)),
            },
        };

        let interventions = match env::var("ASSESSMENT_INTERVENTIONS") {
            Err(_) => defaults.interventions,
            Ok(value) => parse_interventions(&value)?,
        };

        let missing_values = match env::var("ASSESSMENT_MISSING_VALUES") {
            Err(_) => defaults.missing_values,
            Ok(value) => value
                .parse::<MissingValuePolicy>()
                .map_err(|_| ConfigError::InvalidMissingValues(value))?,
        };

        Ok(Self {
            top_k,
            interventions,
            enumeration: EnumerationPolicy {
                exhaustive_limit,
                fallback,
            },
            missing_values,
        })
    }
}

/// Where model artifacts live and which one to serve first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub dir: PathBuf,
    pub active: Option<String>,
}

impl ModelConfig {
    fn from_env() -> Self {
        let dir = env::var("ASSESSMENT_MODEL_DIR").unwrap_or_else(|_| "models".to_string());
        let active = env::var("ASSESSMENT_ACTIVE_MODEL")
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Self {
            dir: PathBuf::from(dir),
            active,
        }
    }
}

fn parse_var<T>(variable: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(variable) {
        Err(_) => Ok(default),
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable, value }),
    }
}

fn parse_interventions(value: &str) -> Result<Vec<InterventionDimension>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.parse::<InterventionDimension>()
                .map_err(|_| ConfigError::UnknownIntervention(name.to_string()))
        })
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str, value: String },
    InvalidStrategy(String),
    UnknownIntervention(String),
    InvalidMissingValues(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be a non-negative integer, found {value:?}")
            }
            ConfigError::InvalidStrategy(value) => write!(
                f,
                "ASSESSMENT_FALLBACK_STRATEGY must be `single_flag` or `sampled`, found {value:?}"
            ),
            ConfigError::UnknownIntervention(name) => {
                write!(f, "ASSESSMENT_INTERVENTIONS names unknown intervention {name:?}")
            }
            ConfigError::InvalidMissingValues(value) => write!(
                f,
                "ASSESSMENT_MISSING_VALUES must be `reject` or a number, found {value:?}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
