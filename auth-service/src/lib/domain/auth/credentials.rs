use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::errors::CredentialError;
use crate::domain::auth::ports::CredentialVerifier;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserDirectory;

/// Credential verifier backed by the user directory and Argon2 hashes.
pub struct PasswordCredentialVerifier<U>
where
    U: UserDirectory,
{
    users: Arc<U>,
    password_hasher: auth::PasswordHasher,
}

impl<U> PasswordCredentialVerifier<U>
where
    U: UserDirectory,
{
    pub fn new(users: Arc<U>) -> Self {
        Self {
            users,
            password_hasher: auth::PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<U> CredentialVerifier for PasswordCredentialVerifier<U>
where
    U: UserDirectory,
{
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            self.password_hasher.verify_decoy(password);
            return Err(CredentialError::InvalidCredentials);
        };

        match self.password_hasher.verify(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => return Err(CredentialError::InvalidCredentials),
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                return Err(CredentialError::InvalidCredentials);
            }
        }

        if !user.enabled {
            tracing::warn!(user_id = %user.id, "Rejected credentials of disabled account");
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(user)
    }

    fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        self.password_hasher
            .hash(password)
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::errors::StoreError;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Role;
    use crate::domain::user::models::UserId;
    use crate::domain::user::models::Username;

    mock! {
        pub TestUserDirectory {}

        #[async_trait]
        impl UserDirectory for TestUserDirectory {
            async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
            async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
            async fn save(&self, user: User) -> Result<User, StoreError>;
        }
    }

    fn stored_user(password: &str, enabled: bool) -> User {
        User {
            id: UserId(11),
            username: Username::new("alice".to_string()).unwrap(),
            email: EmailAddress::new("alice@example.com".to_string()).unwrap(),
            password_hash: auth::PasswordHasher::new().hash(password).unwrap(),
            roles: BTreeSet::from([Role::user()]),
            enabled,
            created_at: Utc::now(),
        }
    }

    fn verifier_returning(user: Option<User>) -> PasswordCredentialVerifier<MockTestUserDirectory> {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(user.clone()));
        PasswordCredentialVerifier::new(Arc::new(directory))
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let verifier = verifier_returning(Some(stored_user("correct", true)));

        let user = verifier
            .authenticate("alice", "correct")
            .await
            .expect("Authentication failed");
        assert_eq!(user.id, UserId(11));
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let unknown = verifier_returning(None)
            .authenticate("nobody", "correct")
            .await;
        let wrong = verifier_returning(Some(stored_user("correct", true)))
            .authenticate("alice", "wrong")
            .await;

        assert_eq!(unknown, Err(CredentialError::InvalidCredentials));
        assert_eq!(wrong, Err(CredentialError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_disabled_account_is_rejected() {
        let verifier = verifier_returning(Some(stored_user("correct", false)));

        let result = verifier.authenticate("alice", "correct").await;
        assert_eq!(result, Err(CredentialError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_directory_failure_is_reported_as_store_error() {
        let mut directory = MockTestUserDirectory::new();
        directory
            .expect_find_by_username()
            .returning(|_| Err(StoreError::Database("connection reset".to_string())));
        let verifier = PasswordCredentialVerifier::new(Arc::new(directory));

        let result = verifier.authenticate("alice", "correct").await;
        assert!(matches!(result, Err(CredentialError::Store(_))));
    }

    #[test]
    fn test_hash_password_produces_argon2_hash() {
        let verifier = PasswordCredentialVerifier::new(Arc::new(MockTestUserDirectory::new()));

        let hash = verifier.hash_password("secret").expect("Hashing failed");
        assert!(hash.starts_with("$argon2"));
        assert!(auth::PasswordHasher::new().verify("secret", &hash).unwrap());
    }
}
