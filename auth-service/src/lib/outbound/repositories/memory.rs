//! In-process implementations of the persistence ports.
//!
//! Each store keeps its records behind one `RwLock`, so every operation
//! (including the delete-then-insert of `replace_for_user`) is atomic with
//! respect to every other operation on the same store.

use std::collections::BTreeMap;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::auth::models::PasswordResetToken;
use crate::domain::auth::models::RefreshToken;
use crate::domain::auth::models::TokenId;
use crate::domain::auth::ports::PasswordResetTokenStore;
use crate::domain::auth::ports::RefreshTokenStore;
use crate::domain::errors::StoreError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserDirectory;

#[derive(Debug)]
struct UserTable {
    users: BTreeMap<UserId, User>,
    next_id: i64,
}

impl UserTable {
    fn conflict_with(&self, user: &User) -> Option<StoreError> {
        self.users
            .values()
            .filter(|existing| existing.id != user.id)
            .find_map(|existing| {
                if existing.username == user.username {
                    Some(StoreError::UsernameTaken(user.username.to_string()))
                } else if existing.email == user.email {
                    Some(StoreError::EmailTaken(user.email.to_string()))
                } else {
                    None
                }
            })
    }
}

/// User directory held in memory; ids are assigned sequentially from 1.
#[derive(Debug)]
pub struct InMemoryUserDirectory {
    table: RwLock<UserTable>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(UserTable {
                users: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Remove a user outright, as an administrator would.
    pub async fn remove(&self, id: UserId) -> Option<User> {
        self.table.write().await.users.remove(&id)
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .users
            .values()
            .find(|user| user.username.as_str() == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .users
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.table.read().await.users.get(&id).cloned())
    }

    async fn save(&self, mut user: User) -> Result<User, StoreError> {
        let mut table = self.table.write().await;

        if let Some(conflict) = table.conflict_with(&user) {
            return Err(conflict);
        }

        if user.id.is_assigned() {
            if !table.users.contains_key(&user.id) {
                return Err(StoreError::NotFound(user.id.to_string()));
            }
        } else {
            user.id = UserId(table.next_id);
            table.next_id += 1;
        }

        table.users.insert(user.id, user.clone());
        Ok(user)
    }
}

/// Refresh token store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: RwLock<HashMap<TokenId, RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every token currently held for `user_id`.
    pub async fn tokens_for_user(&self, user_id: UserId) -> Vec<RefreshToken> {
        self.tokens
            .read()
            .await
            .values()
            .filter(|token| token.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn replace_for_user(&self, token: RefreshToken) -> Result<RefreshToken, StoreError> {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, existing| existing.user_id != token.user_id);
        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_by_value(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|stored| stored.token == token).cloned())
    }

    async fn revoke(&self, token: &str) -> Result<bool, StoreError> {
        let mut tokens = self.tokens.write().await;
        match tokens.values_mut().find(|stored| stored.token == token) {
            Some(stored) => {
                stored.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_user_id(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, existing| existing.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_by_id(&self, id: TokenId) -> Result<(), StoreError> {
        self.tokens.write().await.remove(&id);
        Ok(())
    }
}

/// Password reset token store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryPasswordResetTokenStore {
    tokens: RwLock<HashMap<TokenId, PasswordResetToken>>,
}

impl InMemoryPasswordResetTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every token currently held for `user_id`.
    pub async fn tokens_for_user(&self, user_id: UserId) -> Vec<PasswordResetToken> {
        self.tokens
            .read()
            .await
            .values()
            .filter(|token| token.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PasswordResetTokenStore for InMemoryPasswordResetTokenStore {
    async fn replace_for_user(
        &self,
        token: PasswordResetToken,
    ) -> Result<PasswordResetToken, StoreError> {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, existing| existing.user_id != token.user_id);
        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_by_value(&self, token: &str) -> Result<Option<PasswordResetToken>, StoreError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|stored| stored.token == token).cloned())
    }

    async fn mark_used(&self, id: TokenId) -> Result<bool, StoreError> {
        match self.tokens.write().await.get_mut(&id) {
            Some(stored) if !stored.used => {
                stored.used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_user_id(&self, user_id: UserId) -> Result<u64, StoreError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, existing| existing.user_id != user_id);
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_by_id(&self, id: TokenId) -> Result<(), StoreError> {
        self.tokens.write().await.remove(&id);
        Ok(())
    }
}
