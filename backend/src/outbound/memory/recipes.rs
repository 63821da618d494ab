//! Recipe and reference data ports over the in-memory state.

use async_trait::async_trait;
use chrono::Utc;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    RecipeRepository, RecipeRepositoryError, ReferenceDataError, ReferenceDataRepository,
};
use crate::domain::{
    CartLine, Ingredient, IngredientId, IngredientLine, NewRecipe, Recipe, RecipeDraft,
    RecipeFilter, RecipeId, RecipeSummary, RecipeUpdate, Tag, TagId, UserId,
};

use super::{InMemoryStore, State, StoredRecipe};

impl State {
    fn check_references(&self, draft: &RecipeDraft) -> Result<(), RecipeRepositoryError> {
        if draft.tags().iter().any(|id| !self.tags.contains_key(id)) {
            return Err(RecipeRepositoryError::unknown_reference("tags"));
        }
        if draft
            .ingredients()
            .iter()
            .any(|line| !self.ingredients.contains_key(&line.ingredient_id))
        {
            return Err(RecipeRepositoryError::unknown_reference("ingredients"));
        }
        Ok(())
    }

    fn hydrate(&self, id: RecipeId, stored: &StoredRecipe) -> Result<Recipe, RecipeRepositoryError> {
        let tags = stored
            .tags
            .iter()
            .map(|tag| {
                self.tags
                    .get(tag)
                    .cloned()
                    .ok_or_else(|| RecipeRepositoryError::query("recipe links a missing tag"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ingredients = stored
            .ingredients
            .iter()
            .map(|line| {
                self.ingredients
                    .get(&line.ingredient_id)
                    .cloned()
                    .map(|ingredient| IngredientLine {
                        ingredient,
                        amount: line.amount,
                    })
                    .ok_or_else(|| {
                        RecipeRepositoryError::query("recipe lists a missing ingredient")
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Recipe {
            id,
            author: stored.author,
            name: stored.name.clone(),
            text: stored.text.clone(),
            cooking_time: stored.cooking_time,
            image: stored.image.clone(),
            pub_date: stored.pub_date,
            tags,
            ingredients,
        })
    }

    fn matches(&self, id: RecipeId, stored: &StoredRecipe, filter: &RecipeFilter) -> bool {
        if filter.author.is_some_and(|author| author != stored.author) {
            return false;
        }
        if !filter.tags.is_empty()
            && !stored.tags.iter().any(|tag| {
                self.tags
                    .get(tag)
                    .is_some_and(|tag| filter.tags.contains(&tag.slug))
            })
        {
            return false;
        }
        if filter
            .favorited_by
            .is_some_and(|user| !self.favorites.contains(&(user, id)))
        {
            return false;
        }
        !filter
            .in_cart_of
            .is_some_and(|user| !self.shopping_cart.contains(&(user, id)))
    }

    /// Recipes newest first, ties broken by descending id.
    fn newest_first(&self) -> Vec<(RecipeId, &StoredRecipe)> {
        let mut recipes: Vec<_> = self.recipes.iter().map(|(id, r)| (*id, r)).collect();
        recipes.sort_by(|(a_id, a), (b_id, b)| {
            b.pub_date.cmp(&a.pub_date).then_with(|| b_id.cmp(a_id))
        });
        recipes
    }
}

fn stored_content(draft: &RecipeDraft, stored: &mut StoredRecipe) {
    stored.name = draft.name().to_owned();
    stored.text = draft.text().to_owned();
    stored.cooking_time = draft.cooking_time();
    stored.tags = draft.tags().to_vec();
    stored.ingredients = draft.ingredients().to_vec();
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        state.check_references(&recipe.draft)?;
        if !state.users.contains_key(&recipe.author) {
            return Err(RecipeRepositoryError::query("recipe author does not exist"));
        }
        let id = RecipeId::new(state.last_recipe + 1)
            .map_err(|err| RecipeRepositoryError::query(err.to_string()))?;
        let mut stored = StoredRecipe {
            author: recipe.author,
            name: String::new(),
            text: String::new(),
            cooking_time: 0,
            image: recipe.image.clone(),
            pub_date: Utc::now(),
            tags: Vec::new(),
            ingredients: Vec::new(),
        };
        stored_content(&recipe.draft, &mut stored);
        let created = state.hydrate(id, &stored)?;
        state.last_recipe += 1;
        state.recipes.insert(id, stored);
        Ok(created)
    }

    async fn update(
        &self,
        id: RecipeId,
        update: &RecipeUpdate,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        state.check_references(&update.draft)?;
        let Some(mut stored) = state.recipes.get(&id).cloned() else {
            return Ok(None);
        };
        stored_content(&update.draft, &mut stored);
        if let Some(image) = &update.image {
            stored.image.clone_from(image);
        }
        let updated = state.hydrate(id, &stored)?;
        state.recipes.insert(id, stored);
        Ok(Some(updated))
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut state = self.lock().map_err(RecipeRepositoryError::query)?;
        if state.recipes.remove(&id).is_none() {
            return Ok(false);
        }
        state.favorites.retain(|(_, recipe)| *recipe != id);
        state.shopping_cart.retain(|(_, recipe)| *recipe != id);
        Ok(true)
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        state
            .recipes
            .get(&id)
            .map(|stored| state.hydrate(id, stored))
            .transpose()
    }

    async fn exists(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        Ok(state.recipes.contains_key(&id))
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        let matching: Vec<(RecipeId, &StoredRecipe)> = state
            .newest_first()
            .into_iter()
            .filter(|(id, stored)| state.matches(*id, stored, filter))
            .collect();
        let window = page.window(matching.len());
        let items = matching
            .get(window)
            .unwrap_or_default()
            .iter()
            .map(|(id, stored)| state.hydrate(*id, stored))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, matching.len() as u64))
    }

    async fn summaries_by_author(
        &self,
        author: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<RecipeSummary>, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        let limit = limit.map_or(usize::MAX, |limit| limit as usize);
        Ok(state
            .newest_first()
            .into_iter()
            .filter(|(_, stored)| stored.author == author)
            .take(limit)
            .map(|(id, stored)| RecipeSummary {
                id,
                name: stored.name.clone(),
                image: stored.image.clone(),
                cooking_time: stored.cooking_time,
            })
            .collect())
    }

    async fn count_by_author(&self, author: UserId) -> Result<u64, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        Ok(state
            .recipes
            .values()
            .filter(|stored| stored.author == author)
            .count() as u64)
    }

    async fn cart_lines(&self, user: UserId) -> Result<Vec<CartLine>, RecipeRepositoryError> {
        let state = self.lock().map_err(RecipeRepositoryError::query)?;
        let mut lines = Vec::new();
        for (_, recipe) in state.shopping_cart.iter().filter(|(u, _)| *u == user) {
            let Some(stored) = state.recipes.get(recipe) else {
                continue;
            };
            for line in &stored.ingredients {
                let ingredient = state.ingredients.get(&line.ingredient_id).ok_or_else(|| {
                    RecipeRepositoryError::query("recipe lists a missing ingredient")
                })?;
                lines.push(CartLine {
                    name: ingredient.name.clone(),
                    measurement_unit: ingredient.measurement_unit.clone(),
                    amount: line.amount,
                });
            }
        }
        Ok(lines)
    }
}

#[async_trait]
impl ReferenceDataRepository for InMemoryStore {
    async fn list_tags(&self) -> Result<Vec<Tag>, ReferenceDataError> {
        let state = self.lock().map_err(ReferenceDataError::query)?;
        Ok(state.tags.values().cloned().collect())
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, ReferenceDataError> {
        let state = self.lock().map_err(ReferenceDataError::query)?;
        Ok(state.tags.get(&id).cloned())
    }

    async fn search_ingredients(
        &self,
        name_prefix: Option<String>,
    ) -> Result<Vec<Ingredient>, ReferenceDataError> {
        let state = self.lock().map_err(ReferenceDataError::query)?;
        let prefix = name_prefix.map(|p| p.to_lowercase()).unwrap_or_default();
        let mut found: Vec<Ingredient> = state
            .ingredients
            .values()
            .filter(|i| i.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
        });
        Ok(found)
    }

    async fn find_ingredient(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, ReferenceDataError> {
        let state = self.lock().map_err(ReferenceDataError::query)?;
        Ok(state.ingredients.get(&id).cloned())
    }
}
