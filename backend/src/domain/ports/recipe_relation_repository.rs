//! Port for per-user recipe marks: favorites and shopping-cart entries.
//!
//! Both relations are (user, recipe) pairs with a uniqueness constraint, so
//! one trait serves both and [`RecipeRelationKind`] selects the table.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;

use crate::domain::{RecipeId, UserId};

use super::define_port_error;

/// Which user/recipe relation an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeRelationKind {
    /// The user marked the recipe as a favourite.
    Favorite,
    /// The recipe sits in the user's shopping cart.
    ShoppingCart,
}

impl RecipeRelationKind {
    /// Human-readable collection name used in messages.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

impl fmt::Display for RecipeRelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

define_port_error! {
    /// Errors raised by recipe relation adapters.
    pub enum RecipeRelationError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe relation connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe relation query failed: {message}",
        /// The (user, recipe) pair already exists.
        UniqueViolation => "relation already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRelationRepository: Send + Sync {
    async fn insert(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<(), RecipeRelationError>;

    /// Remove the pair, reporting whether a row was deleted.
    async fn delete(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeRelationError>;

    async fn exists(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, RecipeRelationError>;

    /// The subset of `recipes` that `user` has marked.
    async fn marked_among(
        &self,
        kind: RecipeRelationKind,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, RecipeRelationError>;
}
