//! Driving port for recipe authoring.

use async_trait::async_trait;

use crate::domain::{Error, ImageUpload, RecipeDraft, RecipeId, RecipeView, UserId};

/// Driving port for recipe mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipesCommand: Send + Sync {
    /// Publish a recipe authored by `author`.
    async fn create(
        &self,
        author: UserId,
        draft: RecipeDraft,
        image: ImageUpload,
    ) -> Result<RecipeView, Error>;

    /// Check that `viewer` may edit recipe `id` before its content is
    /// validated. Fails with 401, 404 or 403 in that order.
    async fn authorize_edit(&self, viewer: Option<UserId>, id: RecipeId) -> Result<(), Error>;

    /// Replace a recipe's content; only its author may do so.
    async fn update(
        &self,
        viewer: Option<UserId>,
        id: RecipeId,
        draft: RecipeDraft,
        image: Option<ImageUpload>,
    ) -> Result<RecipeView, Error>;

    /// Delete a recipe; only its author may do so.
    async fn delete(&self, viewer: Option<UserId>, id: RecipeId) -> Result<(), Error>;
}
