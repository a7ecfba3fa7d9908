//! Process configuration, read from environment variables.
//!
//! Every setting has a development default. Insecure defaults (JWT secret, admin
//! password) are logged at `warn` when used.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use billbook_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@admin.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "1234";
/// One year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 525_600;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` selects the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    /// How long a unit of work waits for a lock before giving up with a conflict.
    pub lock_timeout: Duration,
    /// Total attempts for an invoice creation that hits a transient conflict.
    pub conflict_retries: u32,
    pub admin: AdminSeed,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = parse_or(&var, "BILLBOOK_BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;

        let database = match var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&var, "BILLBOOK_DB_MAX_CONNECTIONS", Some(10))?,
            }),
            None => None,
        };

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let ttl_minutes: i64 = parse_or(&var, "BILLBOOK_TOKEN_TTL_MINUTES", Some(60))?;
        let token_ttl = Some(ttl_minutes)
            .filter(|m| (1..=MAX_TOKEN_TTL_MINUTES).contains(m))
            .and_then(chrono::Duration::try_minutes)
            .ok_or_else(|| ConfigError::Invalid {
                key: "BILLBOOK_TOKEN_TTL_MINUTES",
                value: ttl_minutes.to_string(),
            })?;

        let lock_timeout_ms: u64 = parse_or(&var, "BILLBOOK_LOCK_TIMEOUT_MS", Some(5000))?;

        let conflict_retries: u32 = parse_or(&var, "BILLBOOK_CONFLICT_RETRIES", Some(3))?;
        if conflict_retries == 0 {
            return Err(ConfigError::Invalid {
                key: "BILLBOOK_CONFLICT_RETRIES",
                value: "0".to_string(),
            });
        }

        let admin_email = var("BILLBOOK_ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());
        let admin_password = var("BILLBOOK_ADMIN_PASSWORD").unwrap_or_else(|| {
            tracing::warn!("BILLBOOK_ADMIN_PASSWORD not set; seeding admin with insecure default");
            DEFAULT_ADMIN_PASSWORD.to_string()
        });

        let log_format = match var("BILLBOOK_LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "BILLBOOK_LOG_FORMAT",
                value: raw,
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            database,
            jwt_secret,
            token_ttl,
            lock_timeout: Duration::from_millis(lock_timeout_ms),
            conflict_retries,
            admin: AdminSeed {
                email: admin_email,
                password: admin_password,
            },
            log_format,
        })
    }
}

fn parse_or<T, V>(var: &V, key: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => default.ok_or(ConfigError::Invalid {
            key,
            value: String::new(),
        }),
    }
}
