//! Driving port for the downloadable shopping list.

use async_trait::async_trait;

use crate::domain::{Error, ShoppingList, UserId};

/// Driving port for the cart's aggregated shopping list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShoppingListQuery: Send + Sync {
    /// Aggregate every ingredient in `user`'s cart.
    async fn shopping_list(&self, user: UserId) -> Result<ShoppingList, Error>;
}
