use std::time::SystemTime;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::credentials::{verify_credentials, CredentialError};
use crate::auth::jwt::mint_access_token;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::ValidatedJson;
use crate::logging::pii::{mask_identifier, Redacted};
use crate::logging::security;
use crate::routes::users::UserResponse;
use crate::state::app_state::AppState;
use crate::trace_ctx;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Body of every refused login. Clients see the same shape whether the
/// username is unknown or the password is wrong.
#[derive(Debug, Serialize)]
pub struct LoginFailure {
    pub message: &'static str,
    pub code: &'static str,
    pub trace_id: String,
}

fn refused(message: &'static str, code: ErrorCode) -> HttpResponse {
    HttpResponse::BadRequest().json(LoginFailure {
        message,
        code: code.as_str(),
        trace_id: trace_ctx::trace_id(),
    })
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Exchange a username and password for a signed access token.
async fn login(
    body: ValidatedJson<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (Some(username), Some(password)) = (present(body.username), present(body.password))
    else {
        security::login_failed("missing_credentials", "");
        return Ok(refused("Missing credentials", ErrorCode::MissingCredentials));
    };

    let user = match verify_credentials(
        app_state.store.as_ref(),
        &app_state.hasher,
        &username,
        &password,
    )
    .await
    {
        Ok(user) => user,
        Err(CredentialError::InvalidCredentials) => {
            security::login_failed("invalid_credentials", &username);
            return Ok(refused(
                "Incorrect username or password.",
                ErrorCode::InvalidCredentials,
            ));
        }
        Err(CredentialError::Store(e)) => {
            let code = if e.is_retryable() {
                ErrorCode::ServiceUnavailable
            } else {
                ErrorCode::Internal
            };
            error!(
                error = %Redacted(&e.to_string()),
                code = code.as_str(),
                "credential store failed during login"
            );
            return Ok(refused("Something is not right", code));
        }
    };

    let token = mint_access_token(&user, SystemTime::now(), &app_state.security)?;
    info!(user_id = user.id, username = %mask_identifier(&user.username), "login succeeded");

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(user),
        token,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/login").route(web::post().to(login)));
}
