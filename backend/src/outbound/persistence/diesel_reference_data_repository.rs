//! PostgreSQL-backed read adapter for tags and ingredients.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReferenceDataError, ReferenceDataRepository};
use crate::domain::{Ingredient, IngredientId, Tag, TagId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::collect_rows;
use super::models::{IngredientRow, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, tags};

/// Diesel-backed implementation of the `ReferenceDataRepository` port.
#[derive(Clone)]
pub struct DieselReferenceDataRepository {
    pool: DbPool,
}

impl DieselReferenceDataRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReferenceDataError {
    map_basic_pool_error(error, ReferenceDataError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReferenceDataError {
    map_basic_diesel_error(
        error,
        ReferenceDataError::query,
        ReferenceDataError::connection,
    )
}

/// Escape `LIKE` wildcards so a user-supplied prefix matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

diesel::define_sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

#[async_trait]
impl ReferenceDataRepository for DieselReferenceDataRepository {
    async fn list_tags(&self) -> Result<Vec<Tag>, ReferenceDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TagRow> = tags::table
            .select(TagRow::as_select())
            .order_by(tags::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(Tag::try_from), ReferenceDataError::query)
    }

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, ReferenceDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TagRow> = tags::table
            .find(id.value())
            .select(TagRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Tag::try_from)
            .transpose()
            .map_err(ReferenceDataError::query)
    }

    async fn search_ingredients(
        &self,
        name_prefix: Option<String>,
    ) -> Result<Vec<Ingredient>, ReferenceDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = ingredients::table
            .select(IngredientRow::as_select())
            .order_by((ingredients::name, ingredients::measurement_unit))
            .into_boxed();
        if let Some(prefix) = name_prefix.as_deref().filter(|p| !p.is_empty()) {
            query = query.filter(lower(ingredients::name).like(like_prefix(prefix)));
        }
        let rows: Vec<IngredientRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(Ingredient::try_from),
            ReferenceDataError::query,
        )
    }

    async fn find_ingredient(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, ReferenceDataError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<IngredientRow> = ingredients::table
            .find(id.value())
            .select(IngredientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Ingredient::try_from)
            .transpose()
            .map_err(ReferenceDataError::query)
    }
}
