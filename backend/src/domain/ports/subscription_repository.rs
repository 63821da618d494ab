//! Port for the user-follows-author relation.

use std::collections::HashSet;

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by subscription repository adapters.
    pub enum SubscriptionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "subscription repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "subscription repository query failed: {message}",
        /// The (user, author) pair already exists.
        UniqueViolation => "subscription already exists",
        /// Storage refused a self-subscription.
        SelfSubscription => "users cannot subscribe to themselves",
    }
}

/// Persistence port for follower/author pairs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Record that `user` follows `author`.
    async fn insert(&self, user: UserId, author: UserId)
    -> Result<(), SubscriptionRepositoryError>;

    /// Remove the relation, reporting whether a row was deleted.
    async fn delete(
        &self,
        user: UserId,
        author: UserId,
    ) -> Result<bool, SubscriptionRepositoryError>;

    /// Whether `user` follows `author`.
    async fn exists(&self, user: UserId, author: UserId)
    -> Result<bool, SubscriptionRepositoryError>;

    /// The subset of `authors` that `user` follows.
    async fn followed_among(
        &self,
        user: UserId,
        authors: &[UserId],
    ) -> Result<HashSet<UserId>, SubscriptionRepositoryError>;

    /// Authors followed by `user`, ordered by id.
    async fn list_authors(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<User>, SubscriptionRepositoryError>;
}
