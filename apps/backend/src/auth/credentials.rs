//! Username/password verification against the credential store.

use thiserror::Error;

use crate::auth::password::PasswordHasher;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::repos::users::{User, UserStore};
use crate::AppError;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown username or wrong password; callers cannot tell which.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("credential store failure: {0}")]
    Store(#[from] DomainError),
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredentials => AppError::InvalidCredentials,
            CredentialError::Store(e) => e.into(),
        }
    }
}

/// Check `password` against the stored hash of `username`.
///
/// Lookup is exact and case-sensitive. Never writes to the store.
pub async fn verify_credentials(
    store: &dyn UserStore,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<User, CredentialError> {
    let Some(user) = store.find_by_username(username).await? else {
        return Err(CredentialError::InvalidCredentials);
    };

    let matches = hasher
        .verify_blocking(password.to_string(), user.password_hash.clone())
        .await
        .map_err(|e| {
            CredentialError::Store(DomainError::infra(
                InfraErrorKind::Other("hasher".into()),
                e.to_string(),
            ))
        })?;

    if matches {
        Ok(user)
    } else {
        Err(CredentialError::InvalidCredentials)
    }
}
