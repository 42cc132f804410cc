use actix_web::{web, App, HttpServer};
use myflix_backend::config::settings::Settings;
use myflix_backend::infra::state::build_state;
use myflix_backend::middleware::cors::cors_middleware;
use myflix_backend::middleware::request_trace::RequestTrace;
use myflix_backend::middleware::structured_logger::StructuredLogger;
use myflix_backend::middleware::trace_span::TraceSpan;
use myflix_backend::routes;
use myflix_backend::state::security_config::SecurityConfig;
use myflix_backend::telemetry;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let security_config = SecurityConfig::new(settings.jwt_secret.as_bytes())
        .with_bcrypt_cost(settings.bcrypt_cost);

    let app_state = match build_state()
        .with_db(settings.db_kind)
        .with_store_timeout(settings.store_timeout)
        .with_security(security_config)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    info!(
        host = %settings.host,
        port = settings.port,
        db_kind = ?settings.db_kind,
        "starting myFlix backend"
    );

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
