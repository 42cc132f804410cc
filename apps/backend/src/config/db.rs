use std::env;
use std::str::FromStr;

use crate::error::AppError;

/// Which credential store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    /// PostgreSQL, connection parts from `POSTGRES_*`
    Postgres,
    /// SQLite file at `SQLITE_PATH`
    SqliteFile,
    /// Throwaway SQLite database in memory
    SqliteMemory,
    /// In-process store, no database at all
    Memory,
}

impl FromStr for DbKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DbKind::Postgres),
            "sqlite-file" | "sqlite" => Ok(DbKind::SqliteFile),
            "sqlite-memory" => Ok(DbKind::SqliteMemory),
            "memory" => Ok(DbKind::Memory),
            other => Err(AppError::config(format!(
                "DB_KIND must be one of postgres, sqlite-file, sqlite-memory, memory; got '{other}'"
            ))),
        }
    }
}

impl DbKind {
    /// Read `DB_KIND`; unset means the in-memory store.
    pub fn from_env() -> Result<Self, AppError> {
        match env::var("DB_KIND") {
            Ok(v) => v.parse(),
            Err(_) => Ok(DbKind::Memory),
        }
    }

    pub fn is_sql(self) -> bool {
        !matches!(self, DbKind::Memory)
    }
}

/// Builds the connection URL for `kind`. `None` for the in-memory store.
pub fn db_url(kind: DbKind) -> Result<Option<String>, AppError> {
    match kind {
        DbKind::Postgres => {
            let host = host();
            let port = port();
            let db_name = must_var("POSTGRES_DB")?;
            let username = must_var("POSTGRES_USER")?;
            let password = must_var("POSTGRES_PASSWORD")?;
            Ok(Some(format!(
                "postgresql://{username}:{password}@{host}:{port}/{db_name}"
            )))
        }
        DbKind::SqliteFile => {
            let path = env::var("SQLITE_PATH").unwrap_or_else(|_| "myflix.db".to_string());
            Ok(Some(sqlite_file_url(&path)))
        }
        DbKind::SqliteMemory => Ok(Some("sqlite::memory:".to_string())),
        DbKind::Memory => Ok(None),
    }
}

/// `mode=rwc` creates the file on first use.
pub fn sqlite_file_url(path: &str) -> String {
    format!("sqlite://{path}?mode=rwc")
}

/// Get database host from environment (defaults to localhost)
fn host() -> String {
    env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string())
}

/// Get database port from environment (defaults to 5432)
fn port() -> String {
    env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string())
}

/// Get required environment variable or return error
fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}
