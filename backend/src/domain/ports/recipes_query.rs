//! Driving port for recipe reads and short-link resolution.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, RecipeId, RecipeListing, RecipeView, UserId};

/// Driving port for recipe reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipesQuery: Send + Sync {
    /// Filtered listing, newest first.
    async fn list(
        &self,
        viewer: Option<UserId>,
        listing: RecipeListing,
        page: PageRequest,
    ) -> Result<Page<RecipeView>, Error>;

    /// Recipe detail, `NotFound` when missing.
    async fn get(&self, viewer: Option<UserId>, id: RecipeId) -> Result<RecipeView, Error>;

    /// Confirm a recipe exists before a short link redirects to it.
    async fn resolve_short_link(&self, id: RecipeId) -> Result<RecipeId, Error>;
}
