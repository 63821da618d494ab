//! Port for recipe persistence, listing and cart line reads.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    CartLine, NewRecipe, Recipe, RecipeFilter, RecipeId, RecipeSummary, RecipeUpdate, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
        /// A tag or ingredient id does not exist.
        UnknownReference { field: String } => "unknown {field} referenced by recipe",
    }
}

/// Persistence port for recipes, their ingredients, and their tags.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a recipe with its tag links and ingredient lines.
    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError>;

    /// Replace a recipe's content. Returns `None` when the recipe is missing.
    async fn update(
        &self,
        id: RecipeId,
        update: &RecipeUpdate,
    ) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Delete a recipe and everything that references it.
    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError>;

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError>;

    async fn exists(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError>;

    /// Filtered listing, newest first.
    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, RecipeRepositoryError>;

    /// Newest-first cards by one author, truncated to `limit` when given.
    async fn summaries_by_author(
        &self,
        author: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<RecipeSummary>, RecipeRepositoryError>;

    async fn count_by_author(&self, author: UserId) -> Result<u64, RecipeRepositoryError>;

    /// Every ingredient line of every recipe in `user`'s shopping cart.
    async fn cart_lines(&self, user: UserId) -> Result<Vec<CartLine>, RecipeRepositoryError>;
}
