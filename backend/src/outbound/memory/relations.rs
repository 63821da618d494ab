//! Favorite and shopping-cart marks over the in-memory state.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;

use crate::domain::ports::{RecipeRelationError, RecipeRelationKind, RecipeRelationRepository};
use crate::domain::{RecipeId, UserId};

use super::{InMemoryStore, State};

impl State {
    fn relation(&self, kind: RecipeRelationKind) -> &BTreeSet<(UserId, RecipeId)> {
        match kind {
            RecipeRelationKind::Favorite => &self.favorites,
            RecipeRelationKind::ShoppingCart => &self.shopping_cart,
        }
    }

    fn relation_mut(&mut self, kind: RecipeRelationKind) -> &mut BTreeSet<(UserId, RecipeId)> {
        match kind {
            RecipeRelationKind::Favorite => &mut self.favorites,
            RecipeRelationKind::ShoppingCart => &mut self.shopping_cart,
        }
    }
}

#[async_trait]
impl RecipeRelationRepository for InMemoryStore {
    async fn insert(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<(), RecipeRelationError> {
        let mut state = self.lock().map_err(RecipeRelationError::query)?;
        if !state.users.contains_key(&user) || !state.recipes.contains_key(&recipe) {
            return Err(RecipeRelationError::query(format!(
                "{kind} entry references a missing row"
            )));
        }
        if !state.relation_mut(kind).insert((user, recipe)) {
            return Err(RecipeRelationError::unique_violation());
        }
        Ok(())
    }

    async fn delete(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeRelationError> {
        let mut state = self.lock().map_err(RecipeRelationError::query)?;
        Ok(state.relation_mut(kind).remove(&(user, recipe)))
    }

    async fn exists(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeRelationError> {
        let state = self.lock().map_err(RecipeRelationError::query)?;
        Ok(state.relation(kind).contains(&(user, recipe)))
    }

    async fn marked_among(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, RecipeRelationError> {
        let state = self.lock().map_err(RecipeRelationError::query)?;
        let marks = state.relation(kind);
        Ok(recipes
            .iter()
            .copied()
            .filter(|recipe| marks.contains(&(user, *recipe)))
            .collect())
    }
}
