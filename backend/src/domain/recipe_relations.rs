//! Favorite and shopping-cart toggles.
//!
//! One service handles both collections; the relation kind only selects
//! which table the repository touches.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    RecipeRelationError, RecipeRelationKind, RecipeRelationRepository, RecipeRelationsCommand,
    RecipeRepository,
};
use crate::domain::repository_errors::{map_recipe_error, map_relation_error};
use crate::domain::toggle::{relation_exists, relation_missing};
use crate::domain::{Error, RecipeId, RecipeSummary, ToggleOp, Toggled, UserId};

/// Toggle service implementing [`RecipeRelationsCommand`].
#[derive(Clone)]
pub struct RecipeRelationService<R, L> {
    recipes: Arc<R>,
    relations: Arc<L>,
}

impl<R, L> RecipeRelationService<R, L> {
    /// Create a new service over the recipe and relation repositories.
    pub fn new(recipes: Arc<R>, relations: Arc<L>) -> Self {
        Self { recipes, relations }
    }
}

impl<R, L> RecipeRelationService<R, L>
where
    R: RecipeRepository,
    L: RecipeRelationRepository,
{
    async fn add(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        summary: RecipeSummary,
    ) -> Result<Toggled<RecipeSummary>, Error> {
        let recipe = summary.id;
        if self
            .relations
            .exists(kind, user, recipe)
            .await
            .map_err(map_relation_error)?
        {
            return Err(relation_exists(format!("recipe is already in {kind}")));
        }
        match self.relations.insert(kind, user, recipe).await {
            Ok(()) => {}
            Err(RecipeRelationError::UniqueViolation) => {
                return Err(relation_exists(format!("recipe is already in {kind}")));
            }
            Err(err) => return Err(map_relation_error(err)),
        }
        info!(%user, %recipe, %kind, "recipe added");
        Ok(Toggled::Added(summary))
    }

    async fn remove(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<Toggled<RecipeSummary>, Error> {
        let deleted = self
            .relations
            .delete(kind, user, recipe)
            .await
            .map_err(map_relation_error)?;
        if !deleted {
            return Err(relation_missing(format!("recipe is not in {kind}")));
        }
        info!(%user, %recipe, %kind, "recipe removed");
        Ok(Toggled::Removed)
    }
}

#[async_trait]
impl<R, L> RecipeRelationsCommand for RecipeRelationService<R, L>
where
    R: RecipeRepository,
    L: RecipeRelationRepository,
{
    async fn toggle(
        &self,
        kind: RecipeRelationKind,
        op: ToggleOp,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<Toggled<RecipeSummary>, Error> {
        let found = self
            .recipes
            .find(recipe)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(|| Error::not_found(format!("recipe {recipe} not found")))?;

        match op {
            ToggleOp::Add => self.add(kind, user, found.summary()).await,
            ToggleOp::Remove => self.remove(kind, user, recipe).await,
        }
    }
}

#[cfg(test)]
#[path = "recipe_relations_tests.rs"]
mod tests;
