//! Following authors.
//!
//! Same add/remove shape as the recipe relations plus a self-subscription
//! guard that fires before any lookup.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::ports::{
    RecipeRepository, SubscriptionRepository, SubscriptionRepositoryError, SubscriptionsCommand,
    SubscriptionsQuery, UserRepository,
};
use crate::domain::repository_errors::{map_recipe_error, map_subscription_error, map_user_error};
use crate::domain::toggle::{relation_exists, relation_missing};
use crate::domain::{Error, RecipeSummary, ToggleOp, Toggled, User, UserId, UserProfile};

/// An author the viewer follows, with a preview of their recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSubscription {
    pub profile: UserProfile,
    /// Newest recipes first, capped by `recipes_limit`.
    pub recipes: Vec<RecipeSummary>,
    /// Total recipes by the author, ignoring the cap.
    pub recipes_count: u64,
}

/// Subscription service implementing the subscription driving ports.
#[derive(Clone)]
pub struct SubscriptionService<U, S, R> {
    users: Arc<U>,
    subscriptions: Arc<S>,
    recipes: Arc<R>,
}

impl<U, S, R> SubscriptionService<U, S, R> {
    /// Create a new service with the given repositories.
    pub fn new(users: Arc<U>, subscriptions: Arc<S>, recipes: Arc<R>) -> Self {
        Self {
            users,
            subscriptions,
            recipes,
        }
    }
}

impl<U, S, R> SubscriptionService<U, S, R>
where
    U: UserRepository,
    S: SubscriptionRepository,
    R: RecipeRepository,
{
    async fn subscription_view(
        &self,
        author: User,
        recipes_limit: Option<u32>,
    ) -> Result<AuthorSubscription, Error> {
        let recipes = self
            .recipes
            .summaries_by_author(author.id, recipes_limit)
            .await
            .map_err(map_recipe_error)?;
        let recipes_count = self
            .recipes
            .count_by_author(author.id)
            .await
            .map_err(map_recipe_error)?;
        Ok(AuthorSubscription {
            profile: UserProfile {
                user: author,
                is_subscribed: true,
            },
            recipes,
            recipes_count,
        })
    }

    async fn subscribe(
        &self,
        user: UserId,
        author: User,
        recipes_limit: Option<u32>,
    ) -> Result<Toggled<AuthorSubscription>, Error> {
        let author_id = author.id;
        if self
            .subscriptions
            .exists(user, author_id)
            .await
            .map_err(map_subscription_error)?
        {
            return Err(relation_exists("already subscribed to this author"));
        }
        match self.subscriptions.insert(user, author_id).await {
            Ok(()) => {}
            Err(SubscriptionRepositoryError::UniqueViolation) => {
                return Err(relation_exists("already subscribed to this author"));
            }
            Err(err) => return Err(map_subscription_error(err)),
        }
        info!(%user, author = %author_id, "subscribed");
        let view = self.subscription_view(author, recipes_limit).await?;
        Ok(Toggled::Added(view))
    }

    async fn unsubscribe(
        &self,
        user: UserId,
        author: UserId,
    ) -> Result<Toggled<AuthorSubscription>, Error> {
        let deleted = self
            .subscriptions
            .delete(user, author)
            .await
            .map_err(map_subscription_error)?;
        if !deleted {
            return Err(relation_missing("not subscribed to this author"));
        }
        info!(%user, %author, "unsubscribed");
        Ok(Toggled::Removed)
    }
}

#[async_trait]
impl<U, S, R> SubscriptionsCommand for SubscriptionService<U, S, R>
where
    U: UserRepository,
    S: SubscriptionRepository,
    R: RecipeRepository,
{
    async fn toggle(
        &self,
        op: ToggleOp,
        user: UserId,
        author: UserId,
        recipes_limit: Option<u32>,
    ) -> Result<Toggled<AuthorSubscription>, Error> {
        if user == author {
            return Err(Error::invalid_request(
                "users cannot subscribe to themselves",
            ));
        }
        let found = self
            .users
            .find_by_id(author)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {author} not found")))?;

        match op {
            ToggleOp::Add => self.subscribe(user, found, recipes_limit).await,
            ToggleOp::Remove => self.unsubscribe(user, author).await,
        }
    }
}

#[async_trait]
impl<U, S, R> SubscriptionsQuery for SubscriptionService<U, S, R>
where
    U: UserRepository,
    S: SubscriptionRepository,
    R: RecipeRepository,
{
    async fn subscriptions(
        &self,
        user: UserId,
        page: PageRequest,
        recipes_limit: Option<u32>,
    ) -> Result<Page<AuthorSubscription>, Error> {
        let authors = self
            .subscriptions
            .list_authors(user, page)
            .await
            .map_err(map_subscription_error)?;
        let total = authors.total();
        let mut views = Vec::with_capacity(authors.items().len());
        for author in authors.into_items() {
            views.push(self.subscription_view(author, recipes_limit).await?);
        }
        Ok(Page::new(views, total))
    }
}

#[cfg(test)]
#[path = "subscriptions_tests.rs"]
mod tests;
