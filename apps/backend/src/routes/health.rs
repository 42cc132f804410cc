use actix_web::{web, HttpResponse};
use migration::get_latest_migration_version;
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::logging::pii::Redacted;
use crate::state::app_state::AppState;

pub async fn root() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().body("Welcome to myFlix!"))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    store: &'static str,
    db: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_error: Option<String>,
    migrations: String,
    time: String,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let time = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let response = match app_state.db() {
        // In-memory store: nothing to check.
        None => HealthResponse {
            status: "ok",
            app_version: env!("CARGO_PKG_VERSION"),
            store: "memory",
            db: "none",
            db_error: None,
            migrations: "n/a".to_string(),
            time,
        },
        Some(db) => {
            let check = db
                .query_one(Statement::from_string(
                    db.get_database_backend(),
                    "SELECT 1 AS health_check",
                ))
                .await;

            let (db_status, db_error, migrations) = match check {
                Ok(_) => {
                    let version = match get_latest_migration_version(db).await {
                        Ok(Some(version)) => version,
                        Ok(None) => "no_migrations".to_string(),
                        Err(_) => "unknown".to_string(),
                    };
                    ("ok", None, version)
                }
                Err(e) => (
                    "error",
                    Some(format!("DB query failed: {}", Redacted(&e.to_string()))),
                    "unknown".to_string(),
                ),
            };

            HealthResponse {
                status: "ok",
                app_version: env!("CARGO_PKG_VERSION"),
                store: "sql",
                db: db_status,
                db_error,
                migrations,
                time,
            }
        }
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health));
}
