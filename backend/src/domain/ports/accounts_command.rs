//! Driving port for account mutations: registration, password and avatar.

use async_trait::async_trait;

use crate::domain::{Email, Error, ImageUpload, NewPassword, PersonName, User, UserId, Username};

/// Validated registration form.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Unique login address.
    pub email: Email,
    pub username: Username,
    pub first_name: PersonName,
    pub last_name: PersonName,
    /// Plaintext password, hashed before it is stored.
    pub password: NewPassword,
}

/// Driving port for account registration and profile changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Create an account. Duplicate email or username is `InvalidRequest`.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Change a password after verifying the current one.
    async fn set_password(
        &self,
        user: UserId,
        current_password: String,
        new_password: NewPassword,
    ) -> Result<(), Error>;

    /// Store a new avatar and return its media-relative path.
    async fn set_avatar(&self, user: UserId, upload: ImageUpload) -> Result<String, Error>;

    /// Drop the avatar, removing the stored file.
    async fn clear_avatar(&self, user: UserId) -> Result<(), Error>;
}
