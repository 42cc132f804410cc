use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use tracing::warn;

use crate::auth::claims::Claims;
use crate::error::AppError;
use crate::logging::security;
use crate::repos::users::User;
use crate::state::app_state::AppState;

/// The user a verified bearer token belongs to, looked up fresh on every
/// request from the `Claims` that `JwtExtract` left in request extensions.
///
/// A token whose user has since been deleted is refused with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // Absent when the route was not wrapped in JwtExtract.
            let claims = req
                .extensions()
                .get::<Claims>()
                .cloned()
                .ok_or_else(AppError::unauthorized)?;

            let app_state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::internal("AppState not available"))?;

            let user = app_state.store.find_by_id(claims.uid).await.map_err(|e| {
                warn!(uid = claims.uid, error = %e, "credential store failed during token resolution");
                AppError::from(e)
            })?;

            match user {
                Some(user) => Ok(CurrentUser(user)),
                None => {
                    security::token_rejected("user_not_found", req.path());
                    Err(AppError::unauthorized_user_not_found())
                }
            }
        })
    }
}
