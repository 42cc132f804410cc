use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details;
use backend_test_support::unique_helpers::{unique_email, unique_username};
use serde_json::json;

use crate::support::create_test_app;
use crate::support::factory::test_state;

#[actix_web::test]
async fn test_register_then_login() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await?;

    let username = unique_username("alice");
    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({
            "Username": username,
            "Password": "secret1",
            "Email": unique_email("alice"),
            "Birthday": "1990-04-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let created: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(created["Username"], username.as_str());
    assert_eq!(created["Birthday"], "1990-04-01");
    assert_eq!(created["TopMovies"], json!([]));
    assert!(created.get("Password").is_none());
    assert!(created.get("PasswordHash").is_none());

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "Username": username, "Password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    Ok(())
}

#[actix_web::test]
async fn test_duplicate_username_conflicts() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await?;

    let body = json!({
        "Username": "alice",
        "Password": "secret1",
        "Email": "alice@example.com"
    });

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&body)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let problem = assert_problem_details(resp, StatusCode::CONFLICT, "USERNAME_TAKEN").await;
    assert_eq!(problem.detail, "alice already exists.");

    Ok(())
}

#[actix_web::test]
async fn test_invalid_fields_are_reported_together() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({
            "Username": "al ice",
            "Email": "not-an-email",
            "Birthday": "1990-13-45"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let problem =
        assert_problem_details(resp, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR").await;
    assert!(problem.has_field_error("Username"));
    assert!(problem.has_field_error("Password"));
    assert!(problem.has_field_error("Email"));
    assert!(problem.has_field_error("Birthday"));

    Ok(())
}

#[actix_web::test]
async fn test_missing_username_is_required() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "Password": "secret1", "Email": "a@example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let problem =
        assert_problem_details(resp, StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR").await;
    assert_eq!(problem.errors.len(), 1);
    assert_eq!(problem.errors[0].field, "Username");
    assert_eq!(problem.errors[0].message, "Username is required.");

    Ok(())
}
