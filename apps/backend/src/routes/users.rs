use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::extractors::ValidatedJson;
use crate::middleware::jwt_extract::JwtExtract;
use crate::repos::users::User;
use crate::services::users::{self, ProfileUpdate, Registration};
use crate::state::app_state::AppState;

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub birthday: Option<String>,
    pub top_movies: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let birthday = user
            .birthday
            .and_then(|d| d.format(format_description!("[year]-[month]-[day]")).ok());
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            birthday,
            top_movies: user.favorites,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

/// Handlers under `/users/{username}` only act on the caller's own account.
fn ensure_self(current: &CurrentUser, username: &str) -> Result<(), AppError> {
    if current.username == username {
        Ok(())
    } else {
        Err(AppError::forbidden())
    }
}

async fn register(
    body: ValidatedJson<UserRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = Registration {
        username: body.username,
        password: body.password,
        email: body.email,
        birthday: body.birthday,
    };

    let user = users::register(app_state.store.as_ref(), &app_state.hasher, input).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

async fn me(current_user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(current_user.into_inner())))
}

async fn get_user(
    path: web::Path<String>,
    current_user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    ensure_self(&current_user, &path)?;
    Ok(HttpResponse::Ok().json(UserResponse::from(current_user.into_inner())))
}

async fn update_user(
    path: web::Path<String>,
    current_user: CurrentUser,
    body: ValidatedJson<UserRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    ensure_self(&current_user, &username)?;

    let body = body.into_inner();
    let input = ProfileUpdate {
        username: body.username,
        password: body.password,
        email: body.email,
        birthday: body.birthday,
    };

    let user =
        users::update_profile(app_state.store.as_ref(), &app_state.hasher, &username, input)
            .await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

async fn delete_user(
    path: web::Path<String>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    ensure_self(&current_user, &username)?;

    let message = users::delete_account(app_state.store.as_ref(), &username).await?;
    Ok(HttpResponse::Ok().json(MessageResponse { message }))
}

async fn add_favorite(
    path: web::Path<(String, String)>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (username, movie_id) = path.into_inner();
    ensure_self(&current_user, &username)?;

    let user = users::add_favorite(app_state.store.as_ref(), &username, &movie_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

async fn remove_favorite(
    path: web::Path<(String, String)>,
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (username, movie_id) = path.into_inner();
    ensure_self(&current_user, &username)?;

    let user = users::remove_favorite(app_state.store.as_ref(), &username, &movie_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/users").route(web::post().to(register)));
    cfg.service(
        web::resource("/me")
            .wrap(JwtExtract)
            .route(web::get().to(me)),
    );
    cfg.service(
        web::scope("/users/{username}")
            .wrap(JwtExtract)
            .service(
                web::resource("")
                    .route(web::get().to(get_user))
                    .route(web::put().to(update_user))
                    .route(web::delete().to(delete_user)),
            )
            .service(
                web::resource("/topMovies/{movie_id}")
                    .route(web::post().to(add_favorite))
                    .route(web::delete().to(remove_favorite)),
            ),
    );
}
