use actix_web::web;

pub mod auth;
pub mod health;
pub mod users;

/// Register every route. Protected resources carry their own `JwtExtract`
/// wrapper, so tests and `main` share one configuration.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(auth::configure_routes)
        .configure(users::configure_routes);
}
