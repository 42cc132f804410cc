// A store that never answers in time surfaces as 503 on account routes and
// as the generic refusal on login; a store that fails outright is a 500.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::test;
use async_trait::async_trait;
use backend_test_support::problem_details::assert_problem_details;
use myflix_backend::errors::domain::InfraErrorKind;
use myflix_backend::errors::DomainError;
use myflix_backend::infra::state::build_state;
use myflix_backend::repos::users::{NewUser, User, UserChanges, UserStore};
use serde_json::json;
use time::OffsetDateTime;

use crate::common::assert_login_refused;
use crate::support::auth::{bearer_header, mint_test_token};
use crate::support::create_test_app;

#[derive(Clone, Copy)]
enum Fault {
    Stall,
    Broken,
}

struct FaultyStore(Fault);

impl FaultyStore {
    async fn fail<T: Send>(&self) -> Result<T, DomainError> {
        match self.0 {
            Fault::Stall => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Err(DomainError::infra(InfraErrorKind::Timeout, "stalled"))
            }
            Fault::Broken => Err(DomainError::infra(
                InfraErrorKind::Other("io".into()),
                "storage engine failure",
            )),
        }
    }
}

#[async_trait]
impl UserStore for FaultyStore {
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, DomainError> {
        self.fail().await
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<User>, DomainError> {
        self.fail().await
    }

    async fn create(&self, _new_user: NewUser) -> Result<User, DomainError> {
        self.fail().await
    }

    async fn update(
        &self,
        _username: &str,
        _changes: UserChanges,
    ) -> Result<Option<User>, DomainError> {
        self.fail().await
    }

    async fn delete(&self, _username: &str) -> Result<bool, DomainError> {
        self.fail().await
    }

    async fn add_favorite(
        &self,
        _username: &str,
        _movie_id: &str,
    ) -> Result<Option<User>, DomainError> {
        self.fail().await
    }

    async fn remove_favorite(
        &self,
        _username: &str,
        _movie_id: &str,
    ) -> Result<Option<User>, DomainError> {
        self.fail().await
    }
}

async fn faulty_state(
    fault: Fault,
) -> Result<myflix_backend::AppState, myflix_backend::AppError> {
    build_state()
        .with_store(Arc::new(FaultyStore(fault)))
        .with_store_timeout(Duration::from_millis(50))
        .build()
        .await
}

async fn slow_state() -> Result<myflix_backend::AppState, myflix_backend::AppError> {
    faulty_state(Fault::Stall).await
}

/// A user the store has never seen; only its id and name end up in the token.
fn token_holder() -> User {
    User {
        id: 1,
        username: "alice".into(),
        password_hash: String::new(),
        email: "alice@example.com".into(),
        birthday: None,
        favorites: Vec::new(),
        created_at: OffsetDateTime::now_utc(),
    }
}

#[actix_web::test]
async fn test_registration_times_out_with_503() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(slow_state().await?)
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({
            "Username": "alice",
            "Password": "secret1",
            "Email": "alice@example.com"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get("retry-after").and_then(|v| v.to_str().ok()),
        Some("1")
    );
    assert_problem_details(resp, StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE").await;

    Ok(())
}

#[actix_web::test]
async fn test_login_times_out_with_generic_refusal() -> Result<(), Box<dyn std::error::Error>> {
    let app = create_test_app(slow_state().await?)
        .with_prod_routes()
        .build()
        .await?;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "Username": "alice", "Password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body = assert_login_refused(resp, "Something is not right", "SERVICE_UNAVAILABLE").await;
    assert!(!body.to_string().contains("timed out"));

    Ok(())
}

#[actix_web::test]
async fn test_token_lookup_times_out_with_503() -> Result<(), Box<dyn std::error::Error>> {
    let state = slow_state().await?;
    let token = mint_test_token(&token_holder(), &state.security);
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::get()
        .uri("/me")
        .insert_header(bearer_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get("retry-after").and_then(|v| v.to_str().ok()),
        Some("1")
    );
    assert_problem_details(resp, StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE").await;

    Ok(())
}

#[actix_web::test]
async fn test_token_lookup_store_failure_is_500() -> Result<(), Box<dyn std::error::Error>> {
    let state = faulty_state(Fault::Broken).await?;
    let token = mint_test_token(&token_holder(), &state.security);
    let app = create_test_app(state).with_prod_routes().build().await?;

    let req = test::TestRequest::get()
        .uri("/users/alice")
        .insert_header(bearer_header(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.headers().get("retry-after").is_none());
    let problem =
        assert_problem_details(resp, StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL").await;
    assert!(!problem.detail.contains("storage engine"));

    Ok(())
}
