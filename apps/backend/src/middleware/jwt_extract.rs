//! Bearer-token gate for protected resources.
//!
//! Parses `Authorization: Bearer <token>`, verifies the token against the
//! configured `SecurityConfig` and stores the `Claims` in request extensions
//! for `CurrentUser`. Any failure short-circuits with a 401 Problem Details.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::{web, Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::auth::jwt::verify_access_token;
use crate::error::AppError;
use crate::logging::security;
use crate::state::app_state::AppState;

pub struct JwtExtract;

impl<S, B> Transform<S, ServiceRequest> for JwtExtract
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtExtractMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtExtractMiddleware { service }))
    }
}

pub struct JwtExtractMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for JwtExtractMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match extract_bearer_from_header(req.headers().get(header::AUTHORIZATION)) {
            Ok(token) => token,
            Err(err) => {
                security::token_rejected("missing_or_malformed_bearer", req.path());
                return Box::pin(async { Err(err.into()) });
            }
        };

        let Some(app_state) = req.app_data::<web::Data<AppState>>() else {
            return Box::pin(async {
                Err(AppError::internal("AppState not available").into())
            });
        };

        let verified = verify_access_token(&token, &app_state.security);
        match verified {
            Ok(claims) => {
                // Store claims in request extensions BEFORE calling the service
                req.extensions_mut().insert(claims);
                Box::pin(self.service.call(req))
            }
            Err(err) => {
                let reason = match err {
                    AppError::UnauthorizedExpiredJwt => "expired",
                    _ => "invalid",
                };
                security::token_rejected(reason, req.path());
                Box::pin(async move { Err(err.into()) })
            }
        }
    }
}

/// Exactly two whitespace-separated parts, the first being `Bearer`.
fn extract_bearer_from_header(header_value: Option<&HeaderValue>) -> Result<String, AppError> {
    let auth_str = header_value
        .and_then(|value| value.to_str().ok())
        .ok_or_else(AppError::unauthorized_missing_bearer)?;

    let parts: Vec<&str> = auth_str.split_whitespace().collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok((*token).to_string()),
        _ => Err(AppError::unauthorized_missing_bearer()),
    }
}
