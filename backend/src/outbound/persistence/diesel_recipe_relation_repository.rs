//! PostgreSQL-backed `RecipeRelationRepository` over `favorites` and
//! `shopping_cart`.
//!
//! Both tables share the `(id, user_id, recipe_id)` shape, so each operation
//! is written once per table through `with_relation_table!`.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RecipeRelationError, RecipeRelationKind, RecipeRelationRepository};
use crate::domain::{RecipeId, UserId};

use super::diesel_basic_error_mapping::{
    DieselFailure, classify_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::collect_rows;
use super::models::recipe_id;
use super::pool::{DbPool, PoolError};

/// Diesel-backed implementation of the `RecipeRelationRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRelationRepository {
    pool: DbPool,
}

impl DieselRecipeRelationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipeRelationError {
    map_basic_pool_error(error, RecipeRelationError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RecipeRelationError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => RecipeRelationError::connection(message),
        DieselFailure::UniqueViolation { .. } => RecipeRelationError::unique_violation(),
        DieselFailure::Query(message) => RecipeRelationError::query(message),
        DieselFailure::ForeignKeyViolation { .. } | DieselFailure::CheckViolation { .. } => {
            RecipeRelationError::query("relation constraint violation")
        }
    }
}

/// Expand `$body` with `$table` bound to the table module for `$kind`.
macro_rules! with_relation_table {
    ($kind:expr, $table:ident => $body:expr) => {
        match $kind {
            RecipeRelationKind::Favorite => {
                use super::schema::favorites as $table;
                $body
            }
            RecipeRelationKind::ShoppingCart => {
                use super::schema::shopping_cart as $table;
                $body
            }
        }
    };
}

#[async_trait]
impl RecipeRelationRepository for DieselRecipeRelationRepository {
    async fn insert(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<(), RecipeRelationError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = with_relation_table!(kind, relation => {
            diesel::insert_into(relation::table)
                .values((
                    relation::user_id.eq(user.value()),
                    relation::recipe_id.eq(recipe.value()),
                ))
                .execute(&mut conn)
                .await
        });
        inserted.map(|_| ()).map_err(map_diesel_error)
    }

    async fn delete(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeRelationError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = with_relation_table!(kind, relation => {
            diesel::delete(
                relation::table
                    .filter(relation::user_id.eq(user.value()))
                    .filter(relation::recipe_id.eq(recipe.value())),
            )
            .execute(&mut conn)
            .await
        })
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn exists(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeRelationError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        with_relation_table!(kind, relation => {
            diesel::select(diesel::dsl::exists(
                relation::table
                    .filter(relation::user_id.eq(user.value()))
                    .filter(relation::recipe_id.eq(recipe.value())),
            ))
            .get_result::<bool>(&mut conn)
            .await
        })
        .map_err(map_diesel_error)
    }

    async fn marked_among(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, RecipeRelationError> {
        if recipes.is_empty() {
            return Ok(HashSet::new());
        }
        let raw: Vec<i64> = recipes.iter().map(|id| id.value()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let marked: Vec<i64> = with_relation_table!(kind, relation => {
            relation::table
                .filter(relation::user_id.eq(user.value()))
                .filter(relation::recipe_id.eq_any(raw))
                .select(relation::recipe_id)
                .load(&mut conn)
                .await
        })
        .map_err(map_diesel_error)?;

        let ids = collect_rows(marked.into_iter().map(recipe_id), RecipeRelationError::query)?;
        Ok(ids.into_iter().collect())
    }
}
