use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use storage::sqlite::SqlitePoolConfig;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:kudzidza.sqlite3?mode=rwc";
pub const DEFAULT_PORT: u16 = 8001;

/// Origins the CORS layer accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return Self::Any;
        }
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect();
        if origins.is_empty() {
            Self::Any
        } else {
            Self::List(origins)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub database_url: String,
    pub pool: SqlitePoolConfig,
    pub allowed_origins: AllowedOrigins,
    /// Directory for the daily rolling log file, when file logging is enabled.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = non_empty("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = non_empty("HOST")
            .and_then(|value| value.trim().parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let database_url =
            non_empty("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let defaults = SqlitePoolConfig::default();
        let max_connections = non_empty("DB_MAX_CONNECTIONS")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.max_connections);
        let acquire_timeout = non_empty("DB_ACQUIRE_TIMEOUT_SECS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map_or(defaults.acquire_timeout, Duration::from_secs);

        let allowed_origins = non_empty("ALLOWED_ORIGINS")
            .map_or(AllowedOrigins::Any, |raw| AllowedOrigins::parse(&raw));

        let file_logs = non_empty("ENABLE_FILE_LOGS")
            .is_some_and(|value| matches!(value.trim(), "true" | "1"));
        let log_dir = file_logs.then(|| {
            PathBuf::from(non_empty("LOG_DIR").unwrap_or_else(|| "./logs".to_string()))
        });

        Self {
            host,
            port,
            log_level,
            database_url,
            pool: SqlitePoolConfig {
                max_connections,
                acquire_timeout,
            },
            allowed_origins,
            log_dir,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
