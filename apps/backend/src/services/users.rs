//! Account operations: registration, profile updates, removal, favorites.

use lazy_regex::regex_is_match;
use time::macros::format_description;
use time::Date;
use tracing::info;

use crate::auth::password::{PasswordHasher, MAX_PASSWORD_BYTES, PASSWORD_TOO_LONG};
use crate::error::{AppError, FieldError};
use crate::errors::ErrorCode;
use crate::logging::pii::mask_identifier;
use crate::repos::users::{NewUser, User, UserChanges, UserStore};

/// Registration input as received; validated by `register`.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
}

/// Profile update input; absent fields stay as they are.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
}

const USERNAME_NOT_ALNUM: &str = "Username contains non alphanumeric characters - not allowed.";
const EMAIL_INVALID: &str = "Email does not appear to be valid.";
const BIRTHDAY_INVALID: &str = "Birthday must be a date in YYYY-MM-DD format.";

fn is_alphanumeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_email(s: &str) -> bool {
    regex_is_match!(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$", s)
}

/// Accepts `YYYY-MM-DD`, or an ISO datetime whose date part is that.
pub fn parse_birthday(raw: &str) -> Option<Date> {
    let date_part = raw.split('T').next().unwrap_or(raw);
    Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn invalid(errors: Vec<FieldError>) -> AppError {
    AppError::invalid("Invalid user data", errors)
}

fn user_not_found(username: &str) -> AppError {
    AppError::not_found(ErrorCode::UserNotFound, format!("{username} was not found."))
}

fn username_taken(username: &str) -> AppError {
    AppError::conflict(ErrorCode::UsernameTaken, format!("{username} already exists."))
}

/// Create an account. Duplicate usernames are rejected with 409; if two
/// registrations race, the store's unique index decides the winner.
pub async fn register(
    store: &dyn UserStore,
    hasher: &PasswordHasher,
    input: Registration,
) -> Result<User, AppError> {
    let mut errors = Vec::new();

    let username = non_empty(input.username);
    match username.as_deref() {
        None => errors.push(FieldError::new("Username", "Username is required.")),
        Some(u) if !is_alphanumeric(u) => errors.push(FieldError::new("Username", USERNAME_NOT_ALNUM)),
        Some(_) => {}
    }

    let password = input.password.filter(|p| !p.is_empty());
    match password.as_deref() {
        None => errors.push(FieldError::new("Password", "Password is required.")),
        Some(p) if p.len() > MAX_PASSWORD_BYTES => {
            errors.push(FieldError::new("Password", PASSWORD_TOO_LONG))
        }
        Some(_) => {}
    }

    let email = non_empty(input.email);
    match email.as_deref() {
        None => errors.push(FieldError::new("Email", "Email is required.")),
        Some(e) if !is_email(e) => errors.push(FieldError::new("Email", EMAIL_INVALID)),
        Some(_) => {}
    }

    let birthday = match non_empty(input.birthday) {
        None => None,
        Some(raw) => match parse_birthday(&raw) {
            Some(date) => Some(date),
            None => {
                errors.push(FieldError::new("Birthday", BIRTHDAY_INVALID));
                None
            }
        },
    };

    let (Some(username), Some(password), Some(email)) = (username, password, email) else {
        return Err(invalid(errors));
    };
    if !errors.is_empty() {
        return Err(invalid(errors));
    }

    if store.find_by_username(&username).await?.is_some() {
        return Err(username_taken(&username));
    }

    let password_hash = hasher.hash_blocking(password).await?;
    let user = store
        .create(NewUser {
            username,
            password_hash,
            email,
            birthday,
        })
        .await?;

    info!(user_id = user.id, username = %mask_identifier(&user.username), "user registered");
    Ok(user)
}

/// Apply a partial profile update to `current_username`.
pub async fn update_profile(
    store: &dyn UserStore,
    hasher: &PasswordHasher,
    current_username: &str,
    input: ProfileUpdate,
) -> Result<User, AppError> {
    let mut errors = Vec::new();

    if let Some(u) = input.username.as_deref() {
        if !is_alphanumeric(u) {
            errors.push(FieldError::new("Username", USERNAME_NOT_ALNUM));
        }
    }
    if let Some(e) = input.email.as_deref() {
        if !is_email(e) {
            errors.push(FieldError::new("Email", EMAIL_INVALID));
        }
    }
    if let Some(p) = input.password.as_deref() {
        if p.is_empty() {
            errors.push(FieldError::new("Password", "Password must not be empty."));
        } else if p.len() > MAX_PASSWORD_BYTES {
            errors.push(FieldError::new("Password", PASSWORD_TOO_LONG));
        }
    }
    let birthday = match input.birthday.as_deref() {
        None => None,
        Some(raw) => {
            let parsed = parse_birthday(raw);
            if parsed.is_none() {
                errors.push(FieldError::new("Birthday", BIRTHDAY_INVALID));
            }
            parsed
        }
    };
    if !errors.is_empty() {
        return Err(invalid(errors));
    }

    let username = input.username.filter(|u| u != current_username);
    if let Some(new_name) = username.as_deref() {
        if store.find_by_username(new_name).await?.is_some() {
            return Err(username_taken(new_name));
        }
    }

    let password_hash = match input.password {
        Some(p) => Some(hasher.hash_blocking(p).await?),
        None => None,
    };

    let changes = UserChanges {
        username,
        password_hash,
        email: input.email,
        birthday,
    };
    let rehashed = changes.password_hash.is_some();

    let user = store
        .update(current_username, changes)
        .await?
        .ok_or_else(|| user_not_found(current_username))?;

    info!(user_id = user.id, rehashed, "user profile updated");
    Ok(user)
}

/// Remove an account. Tokens issued to it stop resolving immediately.
pub async fn delete_account(store: &dyn UserStore, username: &str) -> Result<String, AppError> {
    if store.delete(username).await? {
        info!(username = %mask_identifier(username), "user deleted");
        Ok(format!("{username} was deleted."))
    } else {
        Err(user_not_found(username))
    }
}

pub async fn add_favorite(
    store: &dyn UserStore,
    username: &str,
    movie_id: &str,
) -> Result<User, AppError> {
    store
        .add_favorite(username, movie_id)
        .await?
        .ok_or_else(|| user_not_found(username))
}

pub async fn remove_favorite(
    store: &dyn UserStore,
    username: &str,
    movie_id: &str,
) -> Result<User, AppError> {
    store
        .remove_favorite(username, movie_id)
        .await?
        .ok_or_else(|| user_not_found(username))
}
