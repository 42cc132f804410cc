//! Seed users directly through the account service.

use myflix_backend::error::AppError;
use myflix_backend::infra::state::build_state;
use myflix_backend::repos::users::User;
use myflix_backend::services::users::{register, Registration};
use myflix_backend::state::app_state::AppState;

/// In-memory store behind the usual timeout wrapper, test security config.
pub async fn test_state() -> Result<AppState, AppError> {
    build_state().build().await
}

pub async fn seed_user(state: &AppState, username: &str, password: &str) -> User {
    register(
        state.store.as_ref(),
        &state.hasher,
        Registration {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            email: Some(format!("{username}@example.com")),
            birthday: None,
        },
    )
    .await
    .expect("seed user should register")
}
