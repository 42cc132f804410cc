// The bearer-token gate in front of protected routes.

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details;
use myflix_backend::state::security_config::SecurityConfig;
use serde_json::json;

use crate::support::auth::{bearer_header, mint_expired_token, mint_test_token};
use crate::support::create_test_app;
use crate::support::factory::{seed_user, test_state};

#[actix_web::test]
async fn test_login_then_me() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    seed_user(&state, "alice", "secret1").await;

    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "Username": "alice", "Password": "secret1" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let token = body["token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(bearer_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let me: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(me["Username"], "alice");

    Ok(())
}

#[actix_web::test]
async fn test_missing_header() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::get().uri("/me").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get("www-authenticate").and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
    assert_problem_details(resp, StatusCode::UNAUTHORIZED, "UNAUTHORIZED_MISSING_BEARER").await;

    Ok(())
}

#[actix_web::test]
async fn test_malformed_scheme() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let alice = seed_user(&state, "alice", "secret1").await;
    let token = mint_test_token(&alice, &state.security);
    let app = create_test_app(state).with_prod_routes().build().await?;

    for header in [
        format!("Token {token}"),
        format!("bearer {token}"),
        "Bearer".to_string(),
        format!("Bearer {token} extra"),
    ] {
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", header))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_problem_details(resp, StatusCode::UNAUTHORIZED, "UNAUTHORIZED_MISSING_BEARER")
            .await;
    }

    Ok(())
}

#[actix_web::test]
async fn test_garbage_token() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(bearer_header("not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, StatusCode::UNAUTHORIZED, "UNAUTHORIZED_INVALID_JWT").await;

    Ok(())
}

#[actix_web::test]
async fn test_expired_token() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let alice = seed_user(&state, "alice", "secret1").await;
    let token = mint_expired_token(&alice, &state.security);
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(bearer_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, StatusCode::UNAUTHORIZED, "UNAUTHORIZED_EXPIRED_JWT").await;

    Ok(())
}

#[actix_web::test]
async fn test_token_signed_with_other_secret() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let alice = seed_user(&state, "alice", "secret1").await;
    let other = SecurityConfig::new("a_completely_different_signing_secret!!".as_bytes());
    let token = mint_test_token(&alice, &other);
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(bearer_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, StatusCode::UNAUTHORIZED, "UNAUTHORIZED_INVALID_JWT").await;

    Ok(())
}

#[actix_web::test]
async fn test_token_of_deleted_user_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let alice = seed_user(&state, "alice", "secret1").await;
    let token = mint_test_token(&alice, &state.security);
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::delete()
        .uri("/users/alice")
        .insert_header(bearer_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "alice was deleted.");

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(bearer_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, StatusCode::UNAUTHORIZED, "UNAUTHORIZED_USER_NOT_FOUND").await;

    Ok(())
}

#[actix_web::test]
async fn test_rename_keeps_token_valid() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await?;
    let alice = seed_user(&state, "alice", "secret1").await;
    let token = mint_test_token(&alice, &state.security);
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::put()
        .uri("/users/alice")
        .insert_header(bearer_header(&token))
        .set_json(json!({ "Username": "alicia" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(bearer_header(&token))
        .to_request();
    let me: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["Username"], "alicia");
    assert_eq!(me["Id"], alice.id);

    Ok(())
}
