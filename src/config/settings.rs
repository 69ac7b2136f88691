use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::ConfigError;

/// Ten years.
pub const MAX_TOKEN_LIFETIME_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    /// Bearer tokens older than this are rejected.
    pub token_lifetime_seconds: u64,
    pub body_limit_bytes: usize,
    pub cors_allow_origins: CorsOrigins,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: "postgres://localhost/business_app".into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            db_max_connections: 10,
            token_lifetime_seconds: 3600,
            body_limit_bytes: 2 * 1024 * 1024,
            cors_allow_origins: CorsOrigins::Any,
        }
    }
}

fn parsed<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            message: format!("{s:?}: {e}"),
        }),
    }
}

fn parse_origins(raw: Option<String>) -> CorsOrigins {
    let Some(raw) = raw else {
        return CorsOrigins::Any;
    };
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}

impl Settings {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Settings::default();
        let settings = Settings {
            database_url: lookup("DATABASE_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(d.database_url),
            bind_addr: parsed("BIND_ADDR", lookup("BIND_ADDR"), d.bind_addr)?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), d.db_max_connections)?,
            token_lifetime_seconds: parsed(
                "TOKEN_LIFETIME_SECONDS",
                lookup("TOKEN_LIFETIME_SECONDS"),
                d.token_lifetime_seconds,
            )?,
            body_limit_bytes: parsed("BODY_LIMIT_BYTES", lookup("BODY_LIMIT_BYTES"), d.body_limit_bytes)?,
            cors_allow_origins: parse_origins(lookup("CORS_ALLOW_ORIGINS")),
        };
        if settings.token_lifetime_seconds == 0 || settings.token_lifetime_seconds > MAX_TOKEN_LIFETIME_SECONDS {
            return Err(ConfigError::InvalidValue {
                key: "TOKEN_LIFETIME_SECONDS",
                message: format!("must be between 1 and {MAX_TOKEN_LIFETIME_SECONDS}"),
            });
        }
        if settings.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_MAX_CONNECTIONS",
                message: "must be at least 1".into(),
            });
        }
        Ok(settings)
    }
}
