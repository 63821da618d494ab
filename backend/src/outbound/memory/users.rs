//! User and subscription ports over the in-memory state.

use std::collections::HashSet;

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    SubscriptionRepository, SubscriptionRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{Email, NewUser, PasswordHash, User, UserCredentials, UserId};

use super::{InMemoryStore, StoredUser};

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, new_user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state.users.values().any(|u| u.user.email == new_user.email) {
            return Err(UserPersistenceError::duplicate("email"));
        }
        if state
            .users
            .values()
            .any(|u| u.user.username == new_user.username)
        {
            return Err(UserPersistenceError::duplicate("username"));
        }
        let id = UserId::new(state.last_user + 1)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let user = User {
            id,
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            avatar: None,
        };
        state.last_user += 1;
        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: new_user.password_hash.clone(),
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .find(|stored| &stored.user.email == email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn password_hash(
        &self,
        id: UserId,
    ) -> Result<Option<PasswordHash>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(&id).map(|stored| stored.password_hash.clone()))
    }

    async fn update_password(
        &self,
        id: UserId,
        hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        let stored = state
            .users
            .get_mut(&id)
            .ok_or_else(|| UserPersistenceError::query("user not found for password update"))?;
        stored.password_hash = hash.clone();
        Ok(())
    }

    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<String>,
    ) -> Result<Option<String>, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        let stored = state
            .users
            .get_mut(&id)
            .ok_or_else(|| UserPersistenceError::query("user not found for avatar update"))?;
        Ok(std::mem::replace(&mut stored.user.avatar, avatar))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        let users: Vec<User> = state.users.values().map(|s| s.user.clone()).collect();
        Ok(Page::from_slice(&users, page))
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn insert(
        &self,
        user: UserId,
        author: UserId,
    ) -> Result<(), SubscriptionRepositoryError> {
        let mut state = self.lock().map_err(SubscriptionRepositoryError::query)?;
        if user == author {
            return Err(SubscriptionRepositoryError::self_subscription());
        }
        if !state.users.contains_key(&user) || !state.users.contains_key(&author) {
            return Err(SubscriptionRepositoryError::query(
                "subscription references a missing user",
            ));
        }
        if !state.subscriptions.insert((user, author)) {
            return Err(SubscriptionRepositoryError::unique_violation());
        }
        Ok(())
    }

    async fn delete(
        &self,
        user: UserId,
        author: UserId,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let mut state = self.lock().map_err(SubscriptionRepositoryError::query)?;
        Ok(state.subscriptions.remove(&(user, author)))
    }

    async fn exists(
        &self,
        user: UserId,
        author: UserId,
    ) -> Result<bool, SubscriptionRepositoryError> {
        let state = self.lock().map_err(SubscriptionRepositoryError::query)?;
        Ok(state.subscriptions.contains(&(user, author)))
    }

    async fn followed_among(
        &self,
        user: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, SubscriptionRepositoryError> {
        let state = self.lock().map_err(SubscriptionRepositoryError::query)?;
        Ok(authors
            .iter()
            .copied()
            .filter(|author| state.subscriptions.contains(&(user, *author)))
            .collect())
    }

    async fn list_authors(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<User>, SubscriptionRepositoryError> {
        let state = self.lock().map_err(SubscriptionRepositoryError::query)?;
        let authors: Vec<User> = state
            .subscriptions
            .iter()
            .filter(|(follower, _)| *follower == user)
            .filter_map(|(_, author)| state.users.get(author))
            .map(|stored| stored.user.clone())
            .collect();
        Ok(Page::from_slice(&authors, page))
    }
}
