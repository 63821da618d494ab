//! Account services: registration, login, passwords, avatars and profiles.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountsCommand, LoginService, MediaStore, Registration, SubscriptionRepository, UserRepository,
    UsersQuery,
};
use crate::domain::repository_errors::{map_media_error, map_subscription_error, map_user_error};
use crate::domain::{
    Error, ImageUpload, LoginCredentials, MediaKind, NewPassword, NewUser, PasswordHash, User,
    UserId, UserProfile,
};

/// Account service implementing the account and profile driving ports.
#[derive(Clone)]
pub struct AccountService<U, S, M> {
    users: Arc<U>,
    subscriptions: Arc<S>,
    media: Arc<M>,
}

impl<U, S, M> AccountService<U, S, M> {
    /// Create a new service with the given adapters.
    pub fn new(users: Arc<U>, subscriptions: Arc<S>, media: Arc<M>) -> Self {
        Self {
            users,
            subscriptions,
            media,
        }
    }
}

impl<U, S, M> AccountService<U, S, M>
where
    U: UserRepository,
    S: SubscriptionRepository,
    M: MediaStore,
{
    async fn replace_avatar(&self, user: UserId, avatar: Option<String>) -> Result<(), Error> {
        let keep = avatar.clone();
        let previous = self
            .users
            .set_avatar(user, avatar)
            .await
            .map_err(map_user_error)?;
        if let Some(previous) = previous.filter(|path| Some(path) != keep.as_ref())
            && let Err(err) = self.media.remove(&previous).await
        {
            warn!(%user, path = %previous, error = %err, "failed to remove old avatar");
        }
        Ok(())
    }

    async fn subscribed_to(
        &self,
        viewer: Option<UserId>,
        users: &[User],
    ) -> Result<HashSet<UserId>, Error> {
        let Some(viewer) = viewer else {
            return Ok(HashSet::new());
        };
        let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        self.subscriptions
            .followed_among(viewer, &ids)
            .await
            .map_err(map_subscription_error)
    }
}

#[async_trait]
impl<U, S, M> LoginService for AccountService<U, S, M>
where
    U: UserRepository,
    S: SubscriptionRepository,
    M: MediaStore,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let found = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_error)?;
        match found {
            Some(stored) if stored.password_hash.verify(credentials.password()) => {
                info!(user = %stored.user.id, "login succeeded");
                Ok(stored.user.id)
            }
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}

#[async_trait]
impl<U, S, M> AccountsCommand for AccountService<U, S, M>
where
    U: UserRepository,
    S: SubscriptionRepository,
    M: MediaStore,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            email,
            username,
            first_name,
            last_name,
            password,
        } = registration;
        let new_user = NewUser {
            email,
            username,
            first_name,
            last_name,
            password_hash: PasswordHash::hash(&password)?,
        };
        let user = self
            .users
            .create(&new_user)
            .await
            .map_err(map_user_error)?;
        info!(user = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    async fn set_password(
        &self,
        user: UserId,
        current_password: String,
        new_password: NewPassword,
    ) -> Result<(), Error> {
        let stored = self
            .users
            .password_hash(user)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        if !stored.verify(&current_password) {
            return Err(Error::invalid_request("current password is incorrect")
                .with_details(json!({ "field": "current_password", "code": "mismatch" })));
        }
        let hash = PasswordHash::hash(&new_password)?;
        self.users
            .update_password(user, &hash)
            .await
            .map_err(map_user_error)?;
        info!(%user, "password changed");
        Ok(())
    }

    async fn set_avatar(&self, user: UserId, upload: ImageUpload) -> Result<String, Error> {
        let path = self
            .media
            .store(MediaKind::Avatar, &upload)
            .await
            .map_err(map_media_error)?;
        self.replace_avatar(user, Some(path.clone())).await?;
        Ok(path)
    }

    async fn clear_avatar(&self, user: UserId) -> Result<(), Error> {
        self.replace_avatar(user, None).await
    }
}

#[async_trait]
impl<U, S, M> UsersQuery for AccountService<U, S, M>
where
    U: UserRepository,
    S: SubscriptionRepository,
    M: MediaStore,
{
    async fn list_users(
        &self,
        viewer: Option<UserId>,
        page: PageRequest,
    ) -> Result<Page<UserProfile>, Error> {
        let users = self.users.list(page).await.map_err(map_user_error)?;
        let followed = self.subscribed_to(viewer, users.items()).await?;
        Ok(users.map(|user| UserProfile {
            is_subscribed: followed.contains(&user.id),
            user,
        }))
    }

    async fn profile(&self, viewer: Option<UserId>, id: UserId) -> Result<UserProfile, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
        let is_subscribed = match viewer {
            Some(viewer) if viewer != id => self
                .subscriptions
                .exists(viewer, id)
                .await
                .map_err(map_subscription_error)?,
            _ => false,
        };
        Ok(UserProfile {
            user,
            is_subscribed,
        })
    }
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
