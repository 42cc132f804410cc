//! In-process user store, used when no database is configured and in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use time::OffsetDateTime;

use crate::errors::domain::{ConflictKind, DomainError};
use crate::repos::users::{NewUser, User, UserChanges, UserStore};

/// Users keyed by id. Every mutation runs under the single write lock, so the
/// uniqueness check and the insert cannot interleave.
pub struct InMemoryUserStore {
    users: RwLock<HashMap<i64, User>>,
    next_id: AtomicI64,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    fn taken(username: &str) -> DomainError {
        DomainError::conflict(
            ConflictKind::UniqueUsername,
            format!("{username} already exists."),
        )
    }

    fn with_user_mut<T>(
        &self,
        username: &str,
        f: impl FnOnce(&mut User) -> Result<T, DomainError>,
    ) -> Result<Option<T>, DomainError> {
        let mut users = self.users.write();
        match users.values_mut().find(|u| u.username == username) {
            Some(user) => f(user).map(Some),
            None => Ok(None),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write();
        if users.values().any(|u| u.username == new_user.username) {
            return Err(Self::taken(&new_user.username));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let user = User {
            id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            email: new_user.email,
            birthday: new_user.birthday,
            favorites: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn update(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, DomainError> {
        let mut users = self.users.write();

        if let Some(new_name) = changes.username.as_deref() {
            if new_name != username && users.values().any(|u| u.username == new_name) {
                return Err(Self::taken(new_name));
            }
        }

        let Some(user) = users.values_mut().find(|u| u.username == username) else {
            return Ok(None);
        };
        if let Some(name) = changes.username {
            user.username = name;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(birthday) = changes.birthday {
            user.birthday = Some(birthday);
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, username: &str) -> Result<bool, DomainError> {
        let mut users = self.users.write();
        let id = users
            .values()
            .find(|u| u.username == username)
            .map(|u| u.id);
        Ok(id.and_then(|id| users.remove(&id)).is_some())
    }

    async fn add_favorite(
        &self,
        username: &str,
        movie_id: &str,
    ) -> Result<Option<User>, DomainError> {
        self.with_user_mut(username, |user| {
            if user.favorites.iter().any(|m| m == movie_id) {
                return Err(DomainError::conflict(
                    ConflictKind::FavoriteExists,
                    "Movie is already on your list.",
                ));
            }
            user.favorites.push(movie_id.to_string());
            Ok(user.clone())
        })
    }

    async fn remove_favorite(
        &self,
        username: &str,
        movie_id: &str,
    ) -> Result<Option<User>, DomainError> {
        self.with_user_mut(username, |user| {
            user.favorites.retain(|m| m != movie_id);
            Ok(user.clone())
        })
    }
}
