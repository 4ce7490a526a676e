mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use auth_service::application::Application;
use auth_service::domain::auth::models::PasswordResetToken;
use auth_service::domain::auth::models::RegisterCommand;
use auth_service::domain::auth::ports::AuthServicePort;
use auth_service::domain::auth::models::RefreshToken;
use auth_service::domain::auth::ports::PasswordResetTokenStore;
use auth_service::domain::auth::ports::RefreshTokenStore;
use auth_service::domain::errors::StoreError;
use auth_service::domain::user::models::EmailAddress;
use auth_service::domain::user::models::Role;
use auth_service::domain::user::models::User;
use auth_service::domain::user::models::UserId;
use auth_service::domain::user::models::Username;
use auth_service::domain::user::ports::UserDirectory;
use auth_service::repositories::PostgresPasswordResetTokenStore;
use auth_service::repositories::PostgresRefreshTokenStore;
use auth_service::outbound::clock::SystemClock;
use auth_service::repositories::PostgresUserRepository;
use chrono::Duration;
use chrono::DurationRound;
use chrono::Utc;
use common::TestDb;

fn new_user(username: &str) -> User {
    User::register(
        Username::new(username.to_string()).unwrap(),
        EmailAddress::new(format!("{username}@example.com")).unwrap(),
        "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        // PostgreSQL keeps microseconds.
        Utc::now().duration_trunc(Duration::seconds(1)).unwrap(),
    )
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_user_round_trip() {
    let db = TestDb::new().await;
    let users = PostgresUserRepository::new(db.pool.clone());

    let mut alice = new_user("alice");
    alice.roles = BTreeSet::from([Role::user(), Role::new("ADMIN")]);
    let saved = users.save(alice).await.expect("Failed to insert user");
    assert!(saved.id.is_assigned());

    let found = users.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(found, saved);
    assert_eq!(users.find_by_email("alice@example.com").await.unwrap(), Some(saved.clone()));
    assert_eq!(users.find_by_id(saved.id).await.unwrap(), Some(saved.clone()));
    assert_eq!(users.find_by_username("nobody").await.unwrap(), None);

    let mut changed = saved.clone();
    changed.password_hash = "$argon2id$changed".to_string();
    users.save(changed).await.expect("Failed to update user");
    let reloaded = users.find_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(reloaded.password_hash, "$argon2id$changed");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_user_unique_constraints() {
    let db = TestDb::new().await;
    let users = PostgresUserRepository::new(db.pool.clone());
    users.save(new_user("alice")).await.unwrap();

    let mut same_username = new_user("alice");
    same_username.email = EmailAddress::new("other@example.com".to_string()).unwrap();
    assert_eq!(
        users.save(same_username).await,
        Err(StoreError::UsernameTaken("alice".to_string()))
    );

    let mut same_email = new_user("alicia");
    same_email.email = EmailAddress::new("alice@example.com".to_string()).unwrap();
    assert_eq!(
        users.save(same_email).await,
        Err(StoreError::EmailTaken("alice@example.com".to_string()))
    );

    let mut ghost = new_user("ghost");
    ghost.id = UserId(999_999);
    assert!(matches!(users.save(ghost).await, Err(StoreError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_refresh_tokens_are_replaced_per_user() {
    let db = TestDb::new().await;
    let users = PostgresUserRepository::new(db.pool.clone());
    let store = Arc::new(PostgresRefreshTokenStore::new(db.pool.clone()));
    let user = users.save(new_user("alice")).await.unwrap();
    let now = Utc::now().duration_trunc(Duration::seconds(1)).unwrap();

    let first = RefreshToken::issue(user.id, "first-value".to_string(), now, Duration::days(7));
    store.replace_for_user(first).await.unwrap();
    let second = RefreshToken::issue(user.id, "second-value".to_string(), now, Duration::days(7));
    store.replace_for_user(second.clone()).await.unwrap();

    assert_eq!(store.find_by_value("first-value").await.unwrap(), None);
    assert_eq!(store.find_by_value("second-value").await.unwrap(), Some(second));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let token = RefreshToken::issue(user.id, format!("racer-{i}"), now, Duration::days(7));
                store.replace_for_user(token).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().expect("Replacement failed");
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens WHERE user_id = $1")
        .bind(user.id.0)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_refresh_token_values_are_not_stored() {
    let db = TestDb::new().await;
    let users = PostgresUserRepository::new(db.pool.clone());
    let store = PostgresRefreshTokenStore::new(db.pool.clone());
    let user = users.save(new_user("alice")).await.unwrap();

    let token = RefreshToken::issue(user.id, "plaintext-value".to_string(), Utc::now(), Duration::days(7));
    store.replace_for_user(token).await.unwrap();

    let stored: String = sqlx::query_scalar("SELECT token_hash FROM refresh_tokens WHERE user_id = $1")
        .bind(user.id.0)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    assert_ne!(stored, "plaintext-value");
    assert_eq!(stored, auth::token::fingerprint("plaintext-value"));

    assert!(store.revoke("plaintext-value").await.unwrap());
    assert!(store.find_by_value("plaintext-value").await.unwrap().unwrap().revoked);
    assert_eq!(store.delete_by_user_id(user.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_password_reset_token_lifecycle() {
    let db = TestDb::new().await;
    let users = PostgresUserRepository::new(db.pool.clone());
    let store = PostgresPasswordResetTokenStore::new(db.pool.clone());
    let user = users.save(new_user("bob")).await.unwrap();
    let now = Utc::now().duration_trunc(Duration::seconds(1)).unwrap();

    let token = PasswordResetToken::issue(user.id, "reset-value".to_string(), now, Duration::minutes(30));
    store.replace_for_user(token.clone()).await.unwrap();
    assert_eq!(store.find_by_value("reset-value").await.unwrap(), Some(token.clone()));

    assert!(store.mark_used(token.id).await.unwrap());
    assert!(store.find_by_value("reset-value").await.unwrap().unwrap().used);
    assert!(!store.mark_used(token.id).await.unwrap());

    store.delete_by_id(token.id).await.unwrap();
    assert_eq!(store.find_by_value("reset-value").await.unwrap(), None);
    assert_eq!(store.delete_by_user_id(user.id).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_application_serves_full_flow() {
    let db = TestDb::new().await;
    let mut config = common::test_config();
    config.database.url = db.url();

    let app = Application::build(&config, Arc::new(SystemClock))
        .await
        .expect("Failed to build application");

    app.service
        .register(RegisterCommand::new(
            Username::new("carol".to_string()).unwrap(),
            EmailAddress::new("carol@example.com".to_string()).unwrap(),
            "old password".to_string(),
        ))
        .await
        .expect("Registration failed");
    let session = app.service.login("carol", "old password").await.unwrap();
    app.service
        .refresh_access_token(Some(&session.refresh_token))
        .await
        .expect("Refresh failed");

    app.service.request_password_reset("carol").await.unwrap();
    let token = app
        .outbox
        .last_token_for("carol@example.com")
        .await
        .expect("No reset notification");
    app.service.reset_password(&token, "new password").await.unwrap();

    app.service.login("carol", "new password").await.expect("Login failed");
    app.pool.close().await;
}
