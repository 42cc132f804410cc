use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{db_url, DbKind};
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_INTERVAL_MS: u64 = 500;

/// Retry a connection attempt with fixed interval delays.
/// Returns the error of the last attempt once all retries are exhausted.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempts = attempt, interval_ms, "connection_retry=success");
                }
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(_) => {
                warn!(attempt, max_attempts, interval_ms, "connection_retry=failed");
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
        }
    }
}

fn connect_options(kind: DbKind, url: String) -> ConnectOptions {
    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging(false)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5));
    match kind {
        // Each sqlite::memory: connection is a separate database.
        DbKind::SqliteMemory => {
            opts.max_connections(1).min_connections(1);
        }
        DbKind::SqliteFile => {
            opts.max_connections(4);
        }
        DbKind::Postgres | DbKind::Memory => {
            opts.max_connections(10);
        }
    }
    opts
}

/// Connect to the database selected by `kind`. Does NOT run migrations.
pub async fn connect_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let url = db_url(kind)?.ok_or_else(|| {
        AppError::config("the in-memory store has no database to connect to")
    })?;
    connect_url(kind, &url).await
}

/// Connect to an explicit URL, e.g. a temp SQLite file in tests.
pub async fn connect_url(kind: DbKind, url: &str) -> Result<DatabaseConnection, AppError> {
    let attempts = if kind == DbKind::Postgres {
        CONNECT_ATTEMPTS
    } else {
        1
    };

    let conn = retry_connection(
        move || async move {
            Database::connect(connect_options(kind, url.to_string()))
                .await
                .map_err(|e| {
                    AppError::db(format!("failed to connect to {kind:?} database: {e}"))
                })
        },
        attempts,
        CONNECT_RETRY_INTERVAL_MS,
    )
    .await?;

    if matches!(kind, DbKind::SqliteFile | DbKind::SqliteMemory) {
        conn.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    }

    info!(db_kind = ?kind, "database connected");
    Ok(conn)
}

/// Connect and bring the schema up to date: the single entrypoint for startup.
pub async fn bootstrap_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(kind).await?;
    migrate_up(&conn).await?;
    Ok(conn)
}

pub async fn migrate_up(conn: &DatabaseConnection) -> Result<(), AppError> {
    migrate(conn, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::db(format!("migration failed: {e}")))
}
