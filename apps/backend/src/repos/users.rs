//! Credential store: the user domain model and the `UserStore` seam.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tracing::warn;

use crate::errors::domain::{DomainError, InfraErrorKind};

/// User domain model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<Date>,
    /// Movie ids, in the order they were added, no duplicates.
    pub favorites: Vec<String>,
    pub created_at: OffsetDateTime,
}

/// A user about to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<Date>,
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<Date>,
}

/// Persisted user records, addressed by username or by stable id.
///
/// Lookups by username are exact and case-sensitive. Username uniqueness is
/// the store's job: `create` and renaming `update`s report
/// `ConflictKind::UniqueUsername` when the name is taken.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError>;

    /// `Ok(None)` when no user has that username.
    async fn update(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, DomainError>;

    /// `Ok(false)` when no user has that username.
    async fn delete(&self, username: &str) -> Result<bool, DomainError>;

    /// `ConflictKind::FavoriteExists` when the movie is already listed.
    async fn add_favorite(
        &self,
        username: &str,
        movie_id: &str,
    ) -> Result<Option<User>, DomainError>;

    /// Removing a movie that is not listed is a no-op.
    async fn remove_favorite(
        &self,
        username: &str,
        movie_id: &str,
    ) -> Result<Option<User>, DomainError>;
}

/// Bounds every call on the wrapped store by a fixed timeout.
///
/// A call that runs out of time fails with `InfraErrorKind::Timeout`; the
/// inner future is dropped, which abandons the query.
#[derive(Clone)]
pub struct TimeoutStore {
    inner: Arc<dyn UserStore>,
    timeout: Duration,
}

impl TimeoutStore {
    pub fn new(inner: Arc<dyn UserStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, DomainError>> + Send,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "credential store call timed out"
                );
                Err(DomainError::infra(
                    InfraErrorKind::Timeout,
                    format!("credential store {op} timed out"),
                ))
            }
        }
    }
}

#[async_trait]
impl UserStore for TimeoutStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.bounded("find_by_username", self.inner.find_by_username(username))
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        self.bounded("find_by_id", self.inner.find_by_id(id)).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        self.bounded("create", self.inner.create(new_user)).await
    }

    async fn update(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, DomainError> {
        self.bounded("update", self.inner.update(username, changes))
            .await
    }

    async fn delete(&self, username: &str) -> Result<bool, DomainError> {
        self.bounded("delete", self.inner.delete(username)).await
    }

    async fn add_favorite(
        &self,
        username: &str,
        movie_id: &str,
    ) -> Result<Option<User>, DomainError> {
        self.bounded("add_favorite", self.inner.add_favorite(username, movie_id))
            .await
    }

    async fn remove_favorite(
        &self,
        username: &str,
        movie_id: &str,
    ) -> Result<Option<User>, DomainError> {
        self.bounded(
            "remove_favorite",
            self.inner.remove_favorite(username, movie_id),
        )
        .await
    }
}
