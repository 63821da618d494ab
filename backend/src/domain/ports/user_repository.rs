//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Email, NewUser, PasswordHash, User, UserCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column (`email` or `username`) already holds the value.
        Duplicate { field: String } => "a user with this {field} already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, returning the stored record.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and their password hash by login email.
    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Fetch the stored password hash for a user.
    async fn password_hash(&self, id: UserId)
    -> Result<Option<PasswordHash>, UserPersistenceError>;

    /// Replace the stored password hash.
    async fn update_password(
        &self,
        id: UserId,
        hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;

    /// Replace the avatar path, returning the previous one.
    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<String>,
    ) -> Result<Option<String>, UserPersistenceError>;

    /// List users ordered by id.
    async fn list(&self, page: PageRequest) -> Result<Page<User>, UserPersistenceError>;
}
