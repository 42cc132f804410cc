use actix_web::test;
use myflix_backend::config::db::DbKind;
use myflix_backend::infra::state::build_state;

use crate::support::create_test_app;

#[actix_web::test]
async fn test_root_banner() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state().build().await?;
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body = test::read_body(resp).await;
    assert_eq!(body, "Welcome to myFlix!");

    Ok(())
}

#[actix_web::test]
async fn test_health_in_memory() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state().build().await?;
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["app_version"], env!("CARGO_PKG_VERSION"));
    assert!(body.get("db_error").is_none());

    Ok(())
}

#[actix_web::test]
async fn test_health_reports_migration_version() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state().with_db(DbKind::SqliteMemory).build().await?;
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["store"], "sql");
    assert_eq!(body["db"], "ok");
    assert_eq!(body["migrations"], "m20240301_000001_users");

    Ok(())
}
