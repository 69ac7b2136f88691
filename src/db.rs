//! Database bootstrap: create the target database if missing, then open the pool.

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::config::Settings;
use crate::error::{AppError, ConfigError};
use crate::sql::quoted;

const MAINTENANCE_DB: &str = "postgres";

fn parse_url(database_url: &str) -> Result<PgConnectOptions, ConfigError> {
    PgConnectOptions::from_str(database_url).map_err(|e| ConfigError::InvalidValue {
        key: "DATABASE_URL",
        message: e.to_string(),
    })
}

/// Connect to the `postgres` maintenance database and `CREATE DATABASE` the
/// one named in `database_url` when it does not exist yet.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let opts = parse_url(database_url)?;
    let Some(name) = opts.get_database().map(str::to_string) else {
        return Ok(());
    };
    if name.is_empty() || name == MAINTENANCE_DB {
        return Ok(());
    }
    let mut conn = opts.database(MAINTENANCE_DB).connect().await?;
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %name, "database created");
    }
    Ok(())
}

pub async fn connect(settings: &Settings) -> Result<PgPool, AppError> {
    let opts = parse_url(&settings.database_url)?;
    let pool = PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect_with(opts)
        .await?;
    Ok(pool)
}
