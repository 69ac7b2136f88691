//! Versioned schema migrations embedded in the binary.
//! Applied scripts are recorded in `_schema_migrations`; each pending script runs in its own transaction.

use std::collections::HashSet;

use sqlx::PgPool;

use crate::error::{AppError, ConfigError};

pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial",
        sql: include_str!("../migrations/0001_initial.sql"),
    },
    Migration {
        version: 2,
        name: "lesson_url",
        sql: include_str!("../migrations/0002_lesson_url.sql"),
    },
];

const HISTORY_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS _schema_migrations (
        version BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

fn check_order(migrations: &[Migration]) -> Result<(), ConfigError> {
    for pair in migrations.windows(2) {
        if pair[1].version <= pair[0].version {
            return Err(ConfigError::Migration(format!(
                "version {} ({}) does not follow {} ({})",
                pair[1].version, pair[1].name, pair[0].version, pair[0].name
            )));
        }
    }
    Ok(())
}

/// Migrations whose version is not in `applied`, in version order.
pub fn pending<'m>(migrations: &'m [Migration], applied: &HashSet<i64>) -> Vec<&'m Migration> {
    migrations.iter().filter(|m| !applied.contains(&m.version)).collect()
}

/// Bring the schema up to date. Returns the number of scripts applied.
pub async fn apply_migrations(pool: &PgPool) -> Result<usize, AppError> {
    check_order(MIGRATIONS)?;
    sqlx::query(HISTORY_DDL).execute(pool).await?;
    let applied: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT version FROM _schema_migrations")
        .fetch_all(pool)
        .await?
        .into_iter()
        .collect();

    let todo = pending(MIGRATIONS, &applied);
    for m in &todo {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(m.sql).execute(&mut *tx).await.map_err(|e| {
            tracing::error!(version = m.version, name = m.name, error = %e, "migration failed");
            ConfigError::Migration(format!("{} ({}): {}", m.version, m.name, e))
        })?;
        sqlx::query("INSERT INTO _schema_migrations (version, name) VALUES ($1, $2)")
            .bind(m.version)
            .bind(m.name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(version = m.version, name = m.name, "migration applied");
    }
    Ok(todo.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_versions_are_strictly_increasing() {
        assert!(check_order(MIGRATIONS).is_ok());
    }

    #[test]
    fn out_of_order_versions_are_rejected() {
        let bad = [
            Migration { version: 2, name: "b", sql: "" },
            Migration { version: 2, name: "c", sql: "" },
        ];
        assert!(check_order(&bad).is_err());
    }

    #[test]
    fn pending_skips_applied_versions() {
        let applied: HashSet<i64> = [1].into_iter().collect();
        let todo = pending(MIGRATIONS, &applied);
        assert_eq!(todo.iter().map(|m| m.version).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn second_script_adds_lesson_url() {
        assert!(MIGRATIONS[1].sql.starts_with("ALTER TABLE lesson ADD COLUMN lesson_url"));
    }
}
