use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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

/// Top-level configuration shared by both service binaries.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub sweep: SweepConfig,
    pub collaborators: CollaboratorConfig,
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

        let sweep_interval_ms = env::var("APP_SWEEP_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidSweepInterval)?;

        let product_engine_url = env::var("APP_PRODUCT_ENGINE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string());
        let scoring_url =
            env::var("APP_SCORING_URL").unwrap_or_else(|_| "http://127.0.0.1:8091".to_string());
        let disbursement_url = env::var("APP_DISBURSEMENT_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8092".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            sweep: SweepConfig {
                interval_ms: sweep_interval_ms,
            },
            collaborators: CollaboratorConfig {
                product_engine_url,
                scoring_url,
                disbursement_url,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Cadence of the recurring application evaluation sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub interval_ms: u64,
}

impl SweepConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Base URLs of the remote collaborators the origination side calls.
#[derive(Debug, Clone)]
pub struct CollaboratorConfig {
    pub product_engine_url: String,
    pub scoring_url: String,
    pub disbursement_url: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidSweepInterval,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidSweepInterval => {
                write!(f, "APP_SWEEP_INTERVAL_MS must be a valid u64")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidSweepInterval => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
