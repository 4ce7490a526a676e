use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Directory of user records consulted by the credential service.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Insert or update a user.
    ///
    /// A user whose id is `UserId::UNASSIGNED` is inserted and returned with
    /// the id the directory assigned; any other id updates that record.
    ///
    /// # Returns
    /// The persisted user entity
    ///
    /// # Errors
    /// * `NotFound` - Update of an id the directory does not hold
    /// * `UsernameTaken` - Username belongs to another user
    /// * `EmailTaken` - Email belongs to another user
    /// * `Database` - Database operation failed
    async fn save(&self, user: User) -> Result<User, StoreError>;
}
