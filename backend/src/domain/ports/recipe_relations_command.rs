//! Driving port for favorite and shopping-cart toggles.

use async_trait::async_trait;

use crate::domain::{Error, RecipeId, RecipeSummary, ToggleOp, Toggled, UserId};

use super::RecipeRelationKind;

/// Driving port for favourites and shopping-cart toggles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRelationsCommand: Send + Sync {
    /// Add or remove `recipe` from one of `user`'s collections.
    async fn toggle(
        &self,
        kind: RecipeRelationKind,
        op: ToggleOp,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<Toggled<RecipeSummary>, Error>;
}
