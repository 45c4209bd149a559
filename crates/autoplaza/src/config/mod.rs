use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;

use crate::marketplace::financing::MatchingWeights;
use crate::marketplace::listings::HeatPolicy;
use crate::marketplace::prospects::ProspectWindows;

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

/// Top-level configuration for the marketplace service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
    pub catalog: CatalogConfig,
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
        let format = match env::var("APP_LOG_FORMAT") {
            Ok(value) if value.trim().eq_ignore_ascii_case("full") => LogFormat::Full,
            _ => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            engine: EngineConfig::from_env()?,
            catalog: CatalogConfig {
                listings_csv: env::var_os("CATALOG_LISTINGS_CSV").map(PathBuf::from),
                partners_csv: env::var_os("CATALOG_PARTNERS_CSV").map(PathBuf::from),
                incidents_csv: env::var_os("CATALOG_INCIDENTS_CSV").map(PathBuf::from),
            },
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Tunable constants of the scoring, matching and prospect rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub heat: HeatPolicy,
    pub matching: MatchingWeights,
    pub prospects: ProspectWindows,
}

impl EngineConfig {
    /// Reads the engine tuning variables; unset ones keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut heat = defaults.heat;
        heat.super_hot_multiplier = parse_var("HEAT_SUPER_MULTIPLIER", heat.super_hot_multiplier)?;
        if heat.super_hot_multiplier < 2 {
            return Err(ConfigError::InvalidMultiplier(heat.super_hot_multiplier));
        }

        let matching = MatchingWeights {
            rate: parse_var("MATCH_WEIGHT_RATE", defaults.matching.rate)?,
            speed: parse_var("MATCH_WEIGHT_SPEED", defaults.matching.speed)?,
            risk: parse_var("MATCH_WEIGHT_RISK", defaults.matching.risk)?,
        };
        if !matching.is_valid() {
            return Err(ConfigError::InvalidWeights);
        }

        let prospects = ProspectWindows {
            inactivity: parse_window(
                "PROSPECT_STALE_DAYS",
                defaults.prospects.inactivity.num_days(),
                Duration::try_days,
            )?,
            appointment_horizon: parse_window(
                "PROSPECT_APPOINTMENT_HOURS",
                defaults.prospects.appointment_horizon.num_hours(),
                Duration::try_hours,
            )?,
            fresh_lead: parse_window(
                "PROSPECT_FRESH_HOURS",
                defaults.prospects.fresh_lead.num_hours(),
                Duration::try_hours,
            )?,
        };

        Ok(Self {
            heat,
            matching,
            prospects,
        })
    }
}

/// Optional CSV files used to seed the in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub listings_csv: Option<PathBuf>,
    pub partners_csv: Option<PathBuf>,
    pub incidents_csv: Option<PathBuf>,
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: name,
                    value: raw.clone(),
                })
        }
        _ => Ok(default),
    }
}

/// Windows must be positive and representable as a `Duration`.
fn parse_window(
    name: &'static str,
    default: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    let units = parse_var(name, default)?;
    match to_duration(units) {
        Some(window) if units > 0 => Ok(window),
        _ => Err(ConfigError::InvalidWindow { var: name, units }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str, value: String },
    InvalidWeights,
    InvalidMultiplier(u64),
    InvalidWindow { var: &'static str, units: i64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be numeric, found '{value}'")
            }
            ConfigError::InvalidWeights => write!(
                f,
                "MATCH_WEIGHT_* must be finite, non-negative and not all zero"
            ),
            ConfigError::InvalidMultiplier(value) => {
                write!(f, "HEAT_SUPER_MULTIPLIER must be at least 2, found {value}")
            }
            ConfigError::InvalidWindow { var, units } => {
                write!(f, "{var} must be a positive window within range, found {units}")
            }
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
