//! SeaORM adapter for the credential store.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{user_favorites, users};
use crate::errors::domain::{ConflictKind, DomainError};
use crate::infra::db_errors::map_db_err;
use crate::repos::users::{NewUser, User, UserChanges, UserStore};

pub mod dto;

pub use dto::{UserCreate, UserUpdate};

// Adapter functions return DbErr; `SeaUserStore` maps to DomainError.

pub async fn find_user_by_username<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    username: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(conn)
        .await
}

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find_by_id(user_id).one(conn).await
}

/// Favorite movie ids of one user, oldest first.
pub async fn load_favorites<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Vec<String>, sea_orm::DbErr> {
    let rows = user_favorites::Entity::find()
        .filter(user_favorites::Column::UserId.eq(user_id))
        .order_by_asc(user_favorites::Column::Id)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|row| row.movie_id).collect())
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: UserCreate,
) -> Result<users::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let user_active = users::ActiveModel {
        id: NotSet,
        username: Set(dto.username),
        password_hash: Set(dto.password_hash),
        email: Set(dto.email),
        birthday: Set(dto.birthday),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user_active.insert(conn).await
}

pub async fn update_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    current: users::Model,
    dto: UserUpdate,
) -> Result<users::Model, sea_orm::DbErr> {
    let mut active: users::ActiveModel = current.into();
    if let Some(username) = dto.username {
        active.username = Set(username);
    }
    if let Some(hash) = dto.password_hash {
        active.password_hash = Set(hash);
    }
    if let Some(email) = dto.email {
        active.email = Set(email);
    }
    if let Some(birthday) = dto.birthday {
        active.birthday = Set(Some(birthday));
    }
    active.updated_at = Set(time::OffsetDateTime::now_utc());
    active.update(conn).await
}

/// Deletes the user and its favorites. Returns the number of user rows removed.
pub async fn delete_user<C: ConnectionTrait + TransactionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let txn = conn.begin().await?;
    user_favorites::Entity::delete_many()
        .filter(user_favorites::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    let result = users::Entity::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;
    Ok(result.rows_affected)
}

pub async fn insert_favorite<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    movie_id: &str,
) -> Result<user_favorites::Model, sea_orm::DbErr> {
    let favorite = user_favorites::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        movie_id: Set(movie_id.to_string()),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };
    favorite.insert(conn).await
}

pub async fn delete_favorite<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    movie_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    let result = user_favorites::Entity::delete_many()
        .filter(user_favorites::Column::UserId.eq(user_id))
        .filter(user_favorites::Column::MovieId.eq(movie_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// `UserStore` over a sea-orm connection (PostgreSQL or SQLite).
#[derive(Debug, Clone)]
pub struct SeaUserStore {
    db: DatabaseConnection,
}

impl SeaUserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn hydrate(&self, model: users::Model) -> Result<User, DomainError> {
        let favorites = load_favorites(&self.db, model.id)
            .await
            .map_err(map_db_err)?;
        Ok(User {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            email: model.email,
            birthday: model.birthday,
            favorites,
            created_at: model.created_at,
        })
    }

    async fn hydrate_opt(&self, model: Option<users::Model>) -> Result<Option<User>, DomainError> {
        match model {
            Some(model) => self.hydrate(model).await.map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserStore for SeaUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let model = find_user_by_username(&self.db, username)
            .await
            .map_err(map_db_err)?;
        self.hydrate_opt(model).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let model = find_user_by_id(&self.db, id).await.map_err(map_db_err)?;
        self.hydrate_opt(model).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let username = new_user.username.clone();
        let dto = UserCreate::new(new_user.username, new_user.password_hash, new_user.email)
            .with_birthday(new_user.birthday);
        let model = create_user(&self.db, dto)
            .await
            .map_err(|e| with_username_detail(map_db_err(e), &username))?;
        self.hydrate(model).await
    }

    async fn update(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, DomainError> {
        let Some(current) = find_user_by_username(&self.db, username)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let new_name = changes.username.clone();
        let dto = UserUpdate {
            username: changes.username,
            password_hash: changes.password_hash,
            email: changes.email,
            birthday: changes.birthday,
        };
        let model = update_user(&self.db, current, dto).await.map_err(|e| {
            let err = map_db_err(e);
            match new_name.as_deref() {
                Some(name) => with_username_detail(err, name),
                None => err,
            }
        })?;
        self.hydrate(model).await.map(Some)
    }

    async fn delete(&self, username: &str) -> Result<bool, DomainError> {
        let Some(current) = find_user_by_username(&self.db, username)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(false);
        };
        let removed = delete_user(&self.db, current.id)
            .await
            .map_err(map_db_err)?;
        Ok(removed > 0)
    }

    async fn add_favorite(
        &self,
        username: &str,
        movie_id: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(current) = find_user_by_username(&self.db, username)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };
        // The (user_id, movie_id) unique index turns a repeat into FavoriteExists.
        insert_favorite(&self.db, current.id, movie_id)
            .await
            .map_err(map_db_err)?;
        self.hydrate(current).await.map(Some)
    }

    async fn remove_favorite(
        &self,
        username: &str,
        movie_id: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(current) = find_user_by_username(&self.db, username)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };
        delete_favorite(&self.db, current.id, movie_id)
            .await
            .map_err(map_db_err)?;
        self.hydrate(current).await.map(Some)
    }
}

/// Rewrites a unique-username conflict so the detail names the username.
fn with_username_detail(err: DomainError, username: &str) -> DomainError {
    match err {
        DomainError::Conflict(ConflictKind::UniqueUsername, _) => DomainError::conflict(
            ConflictKind::UniqueUsername,
            format!("{username} already exists."),
        ),
        other => other,
    }
}
