//! PostgreSQL-backed `RecipeRepository` implementation.
//!
//! Recipes are stored across `recipes`, `recipe_tags` and
//! `recipe_ingredients`. Writes touch all three inside one transaction;
//! reads load the recipe rows first and then batch-load tags and ingredient
//! lines for the whole page.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    CartLine, Ingredient, IngredientLine, NewRecipe, Recipe, RecipeDraft, RecipeFilter, RecipeId,
    RecipeSummary, RecipeUpdate, Tag, UserId,
};

use super::diesel_basic_error_mapping::{
    DieselFailure, classify_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{collect_rows, page_bounds, row_count};
use super::models::{
    IngredientRow, NewRecipeIngredientRow, NewRecipeRow, RecipeChangeset, RecipeRow,
    RecipeTagRow, TagRow, column_quantity, recipe_id, stored_quantity, user_id,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_cart, tags,
};

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipeRepositoryError {
    map_basic_pool_error(error, RecipeRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecipeRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => RecipeRepositoryError::connection(message),
        failure @ DieselFailure::ForeignKeyViolation { .. } => {
            if failure.constraint_contains("tag") {
                RecipeRepositoryError::unknown_reference("tags")
            } else if failure.constraint_contains("ingredient") {
                RecipeRepositoryError::unknown_reference("ingredients")
            } else {
                RecipeRepositoryError::query("recipe references a missing row")
            }
        }
        DieselFailure::Query(message) => RecipeRepositoryError::query(message),
        DieselFailure::UniqueViolation { .. } | DieselFailure::CheckViolation { .. } => {
            RecipeRepositoryError::query("recipe constraint violation")
        }
    }
}

type FilteredRecipes = recipes::BoxedQuery<'static, Pg>;

/// Base query with every present filter applied.
fn filtered(filter: &RecipeFilter) -> FilteredRecipes {
    let mut query = recipes::table.into_boxed();
    if let Some(author) = filter.author {
        query = query.filter(recipes::author_id.eq(author.value()));
    }
    if !filter.tags.is_empty() {
        let tagged = recipe_tags::table
            .inner_join(tags::table)
            .filter(tags::slug.eq_any(filter.tags.clone()))
            .select(recipe_tags::recipe_id);
        query = query.filter(recipes::id.eq_any(tagged));
    }
    if let Some(user) = filter.favorited_by {
        let favorited = favorites::table
            .filter(favorites::user_id.eq(user.value()))
            .select(favorites::recipe_id);
        query = query.filter(recipes::id.eq_any(favorited));
    }
    if let Some(user) = filter.in_cart_of {
        let in_cart = shopping_cart::table
            .filter(shopping_cart::user_id.eq(user.value()))
            .select(shopping_cart::recipe_id);
        query = query.filter(recipes::id.eq_any(in_cart));
    }
    query
}

fn summary_from_row(row: RecipeRow) -> Result<RecipeSummary, String> {
    Ok(RecipeSummary {
        id: recipe_id(row.id)?,
        name: row.name,
        image: row.image,
        cooking_time: stored_quantity(row.cooking_time, "cooking_time")?,
    })
}

/// Insert tag links and ingredient lines for `recipe`.
async fn insert_children(
    conn: &mut AsyncPgConnection,
    recipe: i64,
    draft: &RecipeDraft,
) -> Result<(), diesel::result::Error> {
    let tag_rows: Vec<RecipeTagRow> = draft
        .tags()
        .iter()
        .map(|tag| RecipeTagRow {
            recipe_id: recipe,
            tag_id: tag.value(),
        })
        .collect();
    diesel::insert_into(recipe_tags::table)
        .values(&tag_rows)
        .execute(conn)
        .await?;

    let ingredient_rows: Vec<NewRecipeIngredientRow> = draft
        .ingredients()
        .iter()
        .map(|line| NewRecipeIngredientRow {
            recipe_id: recipe,
            ingredient_id: line.ingredient_id.value(),
            amount: column_quantity(line.amount),
        })
        .collect();
    diesel::insert_into(recipe_ingredients::table)
        .values(&ingredient_rows)
        .execute(conn)
        .await?;
    Ok(())
}

type TagLinks = Vec<(i64, TagRow)>;
type IngredientLinks = Vec<(i64, i32, IngredientRow)>;

/// Batch-load tags and ingredient lines and assemble domain recipes.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<RecipeRow>,
) -> Result<Vec<Recipe>, RecipeRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let tag_links: TagLinks = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(ids.clone()))
        .order_by(tags::id)
        .select((recipe_tags::recipe_id, TagRow::as_select()))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let ingredient_links: IngredientLinks = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(ids))
        .order_by(recipe_ingredients::id)
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            IngredientRow::as_select(),
        ))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    assemble(rows, tag_links, ingredient_links).map_err(RecipeRepositoryError::query)
}

fn assemble(
    rows: Vec<RecipeRow>,
    tag_links: TagLinks,
    ingredient_links: IngredientLinks,
) -> Result<Vec<Recipe>, String> {
    let mut tags_by_recipe: HashMap<i64, Vec<Tag>> = HashMap::new();
    for (recipe, row) in tag_links {
        tags_by_recipe
            .entry(recipe)
            .or_default()
            .push(Tag::try_from(row)?);
    }
    let mut lines_by_recipe: HashMap<i64, Vec<IngredientLine>> = HashMap::new();
    for (recipe, amount, row) in ingredient_links {
        lines_by_recipe
            .entry(recipe)
            .or_default()
            .push(IngredientLine {
                ingredient: Ingredient::try_from(row)?,
                amount: stored_quantity(amount, "amount")?,
            });
    }

    rows.into_iter()
        .map(|row| {
            Ok(Recipe {
                id: recipe_id(row.id)?,
                author: user_id(row.author_id)?,
                tags: tags_by_recipe.remove(&row.id).unwrap_or_default(),
                ingredients: lines_by_recipe.remove(&row.id).unwrap_or_default(),
                cooking_time: stored_quantity(row.cooking_time, "cooking_time")?,
                name: row.name,
                text: row.text,
                image: row.image,
                pub_date: row.pub_date,
            })
        })
        .collect()
}

async fn hydrate_one(
    conn: &mut AsyncPgConnection,
    row: RecipeRow,
) -> Result<Recipe, RecipeRepositoryError> {
    hydrate(conn, vec![row])
        .await?
        .pop()
        .ok_or_else(|| RecipeRepositoryError::query("recipe vanished while loading"))
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRecipeRow {
            author_id: recipe.author.value(),
            name: recipe.draft.name(),
            text: recipe.draft.text(),
            cooking_time: column_quantity(recipe.draft.cooking_time()),
            image: recipe.image.as_str(),
        };
        let draft = &recipe.draft;

        let stored: RecipeRow = conn
            .transaction(|conn| {
                async move {
                    let stored: RecipeRow = diesel::insert_into(recipes::table)
                        .values(&row)
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;
                    insert_children(conn, stored.id, draft).await?;
                    Ok(stored)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        hydrate_one(&mut conn, stored).await
    }

    async fn update(
        &self,
        id: RecipeId,
        update: &RecipeUpdate,
    ) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = RecipeChangeset {
            name: update.draft.name(),
            text: update.draft.text(),
            cooking_time: column_quantity(update.draft.cooking_time()),
            image: update.image.as_deref(),
        };
        let draft = &update.draft;

        let stored: Option<RecipeRow> = conn
            .transaction(|conn| {
                async move {
                    let stored: Option<RecipeRow> =
                        diesel::update(recipes::table.find(id.value()))
                            .set(&changeset)
                            .returning(RecipeRow::as_returning())
                            .get_result(conn)
                            .await
                            .optional()?;
                    let Some(stored) = stored else {
                        return Ok(None);
                    };
                    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(stored.id)))
                        .execute(conn)
                        .await?;
                    diesel::delete(
                        recipe_ingredients::table
                            .filter(recipe_ingredients::recipe_id.eq(stored.id)),
                    )
                    .execute(conn)
                    .await?;
                    insert_children(conn, stored.id, draft).await?;
                    Ok(Some(stored))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match stored {
            Some(row) => hydrate_one(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(recipes::table.find(id.value()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RecipeRow> = recipes::table
            .find(id.value())
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match row {
            Some(row) => hydrate_one(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(recipes::table.find(id.value())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = page_bounds(page);
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<RecipeRow> = filtered(filter)
            .select(RecipeRow::as_select())
            .order_by((recipes::pub_date.desc(), recipes::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = hydrate(&mut conn, rows).await?;
        Ok(Page::new(items, row_count(total)))
    }

    async fn summaries_by_author(
        &self,
        author: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<RecipeSummary>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = recipes::table
            .filter(recipes::author_id.eq(author.value()))
            .select(RecipeRow::as_select())
            .order_by((recipes::pub_date.desc(), recipes::id.desc()))
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(i64::from(limit));
        }
        let rows: Vec<RecipeRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(summary_from_row),
            RecipeRepositoryError::query,
        )
    }

    async fn count_by_author(&self, author: UserId) -> Result<u64, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = recipes::table
            .filter(recipes::author_id.eq(author.value()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row_count(total))
    }

    async fn cart_lines(&self, user: UserId) -> Result<Vec<CartLine>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, String, i32)> = shopping_cart::table
            .inner_join(
                recipe_ingredients::table
                    .on(recipe_ingredients::recipe_id.eq(shopping_cart::recipe_id)),
            )
            .inner_join(ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)))
            .filter(shopping_cart::user_id.eq(user.value()))
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter().map(|(name, measurement_unit, amount)| {
                Ok(CartLine {
                    name,
                    measurement_unit,
                    amount: stored_quantity(amount, "amount")?,
                })
            }),
            RecipeRepositoryError::query,
        )
    }
}
