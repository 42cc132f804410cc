use std::sync::Arc;

use myflix_backend::adapters::SeaUserStore;
use myflix_backend::auth::password::PasswordHasher;
use myflix_backend::config::db::{sqlite_file_url, DbKind};
use myflix_backend::errors::domain::{ConflictKind, DomainError};
use myflix_backend::infra::db::{connect_url, migrate_up};
use myflix_backend::repos::users::{NewUser, UserChanges, UserStore};
use myflix_backend::services::users::{register, Registration};
use myflix_backend::ErrorCode;
use sea_orm::DatabaseConnection;
use time::macros::date;

async fn file_backed_store(dir: &tempfile::TempDir) -> (SeaUserStore, DatabaseConnection) {
    let path = dir.path().join("users.db");
    let url = sqlite_file_url(path.to_str().expect("utf-8 temp path"));
    let conn = connect_url(DbKind::SqliteFile, &url)
        .await
        .expect("connect to sqlite file");
    migrate_up(&conn).await.expect("migrate");
    (SeaUserStore::new(conn.clone()), conn)
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password_hash: "$2b$04$placeholderplaceholderplaceholderplaceholderpla".to_string(),
        email: format!("{username}@example.com"),
        birthday: None,
    }
}

#[tokio::test]
async fn test_create_and_find() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let (store, _conn) = file_backed_store(&dir).await;

    let created = store
        .create(NewUser {
            birthday: Some(date!(1990 - 04 - 01)),
            ..new_user("alice")
        })
        .await?;
    assert!(created.favorites.is_empty());

    let by_name = store.find_by_username("alice").await?.expect("by username");
    let by_id = store.find_by_id(created.id).await?.expect("by id");
    assert_eq!(by_name.id, created.id);
    assert_eq!(by_id.username, "alice");
    assert_eq!(by_id.birthday, Some(date!(1990 - 04 - 01)));

    assert!(store.find_by_username("Alice").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_unique_username_is_enforced_by_the_index() -> Result<(), Box<dyn std::error::Error>>
{
    let dir = tempfile::tempdir()?;
    let (store, _conn) = file_backed_store(&dir).await;

    store.create(new_user("alice")).await?;
    let err = store.create(new_user("alice")).await.unwrap_err();
    match err {
        DomainError::Conflict(ConflictKind::UniqueUsername, detail) => {
            assert_eq!(detail, "alice already exists.");
        }
        other => panic!("expected username conflict, got {other:?}"),
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_first_write_wins() -> Result<(), Box<dyn std::error::Error>>
{
    let dir = tempfile::tempdir()?;
    let (store, _conn) = file_backed_store(&dir).await;
    let store = Arc::new(store);
    let hasher = PasswordHasher::new(4);

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let input = Registration {
                    username: Some("alice".into()),
                    password: Some(format!("secret{i}")),
                    email: Some(format!("alice{i}@example.com")),
                    birthday: None,
                };
                register(store.as_ref(), &hasher, input).await
            })
        })
        .collect();

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for attempt in attempts {
        match attempt.await? {
            Ok(user) => winners.push(user),
            Err(e) => {
                assert_eq!(e.code(), ErrorCode::UsernameTaken, "unexpected error: {e}");
                conflicts += 1;
            }
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts, 7);

    let stored = store.find_by_username("alice").await?.expect("winner persisted");
    assert_eq!(stored.id, winners[0].id);
    assert_eq!(stored.email, winners[0].email);

    Ok(())
}

#[tokio::test]
async fn test_update_and_rename() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let (store, _conn) = file_backed_store(&dir).await;

    let alice = store.create(new_user("alice")).await?;
    store.create(new_user("bob")).await?;

    let err = store
        .update(
            "alice",
            UserChanges {
                username: Some("bob".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::UniqueUsername, _)
    ));

    let renamed = store
        .update(
            "alice",
            UserChanges {
                username: Some("alicia".into()),
                email: Some("alicia@example.com".into()),
                ..Default::default()
            },
        )
        .await?
        .expect("alice exists");
    assert_eq!(renamed.id, alice.id);
    assert_eq!(renamed.email, "alicia@example.com");

    assert!(store.update("nobody", UserChanges::default()).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_favorites_and_cascade_delete() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let (store, _conn) = file_backed_store(&dir).await;

    let alice = store.create(new_user("alice")).await?;
    store.add_favorite("alice", "m1").await?;
    let user = store.add_favorite("alice", "m2").await?.expect("alice exists");
    assert_eq!(user.favorites, vec!["m1".to_string(), "m2".to_string()]);

    let err = store.add_favorite("alice", "m1").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::FavoriteExists, _)
    ));

    let user = store
        .remove_favorite("alice", "absent")
        .await?
        .expect("alice exists");
    assert_eq!(user.favorites.len(), 2);

    assert!(store.delete("alice").await?);
    assert!(!store.delete("alice").await?);
    assert!(store.find_by_id(alice.id).await?.is_none());

    // A recreated account starts with no favorites
    store.create(new_user("alice")).await?;
    let again = store.find_by_username("alice").await?.expect("recreated");
    assert!(again.favorites.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_data_survives_reconnect() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    {
        let (store, conn) = file_backed_store(&dir).await;
        store.create(new_user("alice")).await?;
        conn.close().await?;
    }

    let (store, _conn) = file_backed_store(&dir).await;
    assert!(store.find_by_username("alice").await?.is_some());

    Ok(())
}
