//! Read-side port for tags and ingredients.
//!
//! Both catalogues are read-only through the API; rows are seeded by
//! migrations or operators.

use async_trait::async_trait;

use crate::domain::{Ingredient, IngredientId, Tag, TagId};

use super::define_port_error;

define_port_error! {
    /// Errors raised when reading reference data.
    pub enum ReferenceDataError {
        /// Repository connection could not be established.
        Connection { message: String } => "reference data connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "reference data query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceDataRepository: Send + Sync {
    /// All tags ordered by id.
    async fn list_tags(&self) -> Result<Vec<Tag>, ReferenceDataError>;

    async fn find_tag(&self, id: TagId) -> Result<Option<Tag>, ReferenceDataError>;

    /// Ingredients ordered by name, filtered by a case-insensitive name prefix.
    async fn search_ingredients(
        &self,
        name_prefix: Option<String>,
    ) -> Result<Vec<Ingredient>, ReferenceDataError>;

    async fn find_ingredient(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, ReferenceDataError>;
}
