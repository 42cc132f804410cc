//! Process configuration loaded from environment variables at startup.

use std::env;
use std::time::Duration;

use crate::config::db::DbKind;
use crate::error::AppError;

pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Settings {
    // Server
    pub host: String,
    pub port: u16,

    // Credential store
    pub db_kind: DbKind,
    pub store_timeout: Duration,

    // Security
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
}

impl Settings {
    /// Load and validate all configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port_str = env::var("BACKEND_PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port_str.parse::<u16>().map_err(|_| {
            AppError::config(format!(
                "BACKEND_PORT must be a valid port number, got '{port_str}'"
            ))
        })?;

        let jwt_secret = jwt_secret_from_env()?;

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => parse_bcrypt_cost(&raw)?,
            Err(_) => DEFAULT_BCRYPT_COST,
        };

        let store_timeout_ms = match env::var("STORE_TIMEOUT_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| {
                    AppError::config(format!(
                        "STORE_TIMEOUT_MS must be a positive integer, got '{raw}'"
                    ))
                })?,
            Err(_) => DEFAULT_STORE_TIMEOUT_MS,
        };

        Ok(Settings {
            host,
            port,
            db_kind: DbKind::from_env()?,
            store_timeout: Duration::from_millis(store_timeout_ms),
            jwt_secret,
            bcrypt_cost,
        })
    }
}

fn jwt_secret_from_env() -> Result<String, AppError> {
    match env::var("BACKEND_JWT_SECRET") {
        Ok(secret) if secret.len() >= MIN_JWT_SECRET_LEN => Ok(secret),
        Ok(_) => Err(AppError::config(format!(
            "BACKEND_JWT_SECRET is too short; use at least {MIN_JWT_SECRET_LEN} characters"
        ))),
        Err(_) => Err(AppError::config("BACKEND_JWT_SECRET must be set")),
    }
}

/// bcrypt accepts costs 4 through 31.
pub fn parse_bcrypt_cost(raw: &str) -> Result<u32, AppError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|cost| (4..=31).contains(cost))
        .ok_or_else(|| {
            AppError::config(format!(
                "BCRYPT_COST must be an integer between 4 and 31, got '{raw}'"
            ))
        })
}
