//! Driving ports for following authors and listing followed authors.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{AuthorSubscription, Error, ToggleOp, Toggled, UserId};

/// Driving port for following and unfollowing authors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsCommand: Send + Sync {
    /// Follow or unfollow `author`. `recipes_limit` truncates the recipe
    /// cards returned with a new subscription.
    async fn toggle(
        &self,
        op: ToggleOp,
        user: UserId,
        author: UserId,
        recipes_limit: Option<u32>,
    ) -> Result<Toggled<AuthorSubscription>, Error>;
}

/// Driving port for the viewer's subscription list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsQuery: Send + Sync {
    /// Authors followed by `user`, each with their recipe cards.
    async fn subscriptions(
        &self,
        user: UserId,
        page: PageRequest,
        recipes_limit: Option<u32>,
    ) -> Result<Page<AuthorSubscription>, Error>;
}
