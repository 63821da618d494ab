//! In-process adapter implementing every repository port.
//!
//! Holds all state behind one mutex and enforces the same uniqueness rules
//! as the PostgreSQL schema: unique email and username, unique relation
//! pairs, no self-subscription and known tag and ingredient references.
//! Used by handler tests and by the database-less development mode.

mod recipes;
mod relations;
mod users;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::{
    Ingredient, IngredientAmount, IngredientId, PasswordHash, RecipeId, RecipeValidationError,
    Tag, TagId, User, UserId,
};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: PasswordHash,
}

#[derive(Debug, Clone)]
struct StoredRecipe {
    author: UserId,
    name: String,
    text: String,
    cooking_time: u32,
    image: String,
    pub_date: DateTime<Utc>,
    tags: Vec<TagId>,
    ingredients: Vec<IngredientAmount>,
}

#[derive(Debug, Default)]
struct State {
    last_user: i64,
    users: BTreeMap<UserId, StoredUser>,
    /// `(user, author)` pairs.
    subscriptions: BTreeSet<(UserId, UserId)>,
    last_tag: i64,
    tags: BTreeMap<TagId, Tag>,
    last_ingredient: i64,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    last_recipe: i64,
    recipes: BTreeMap<RecipeId, StoredRecipe>,
    favorites: BTreeSet<(UserId, RecipeId)>,
    shopping_cart: BTreeSet<(UserId, RecipeId)>,
}

/// Shared in-memory store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    /// Add a tag to the catalogue, returning it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns the validation error for an invalid name or slug.
    pub fn seed_tag(&self, name: &str, slug: &str) -> Result<Tag, RecipeValidationError> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = TagId::new(state.last_tag + 1)?;
        let tag = Tag::new(id, name, slug)?;
        state.last_tag += 1;
        state.tags.insert(id, tag.clone());
        Ok(tag)
    }

    /// Add an ingredient to the catalogue, returning it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns the validation error for an invalid name or unit.
    pub fn seed_ingredient(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Ingredient, RecipeValidationError> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = IngredientId::new(state.last_ingredient + 1)?;
        let ingredient = Ingredient::new(id, name, measurement_unit)?;
        state.last_ingredient += 1;
        state.ingredients.insert(id, ingredient.clone());
        Ok(ingredient)
    }
}
