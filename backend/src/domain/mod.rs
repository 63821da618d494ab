//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, and the services that implement the driving ports.
//! Keep types immutable and document invariants in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - User, Recipe, Tag, Ingredient: validated aggregates.
//! - AccountService, RecipeService, RecipeRelationService,
//!   SubscriptionService, ShoppingListService: port implementations.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod media;
pub mod permissions;
pub mod ports;
pub mod recipe;
pub mod recipe_relations;
pub mod recipes;
pub(crate) mod repository_errors;
pub mod shopping_list;
pub mod subscriptions;
pub mod toggle;
pub mod trace_id;
pub mod user;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::accounts::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, NewPassword, PASSWORD_MAX, PASSWORD_MIN, PasswordHash,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::media::{ImageUpload, ImageUploadError, MediaKind};
pub use self::permissions::{Access, authorize};
pub use self::recipe::{
    CartLine, Ingredient, IngredientAmount, IngredientId, IngredientLine, NewRecipe, Recipe,
    RecipeDraft, RecipeFilter, RecipeId, RecipeListing, RecipeSummary, RecipeUpdate,
    RecipeValidationError, RecipeView, Tag, TagId,
};
pub use self::recipe_relations::RecipeRelationService;
pub use self::recipes::{RecipeService, RecipeServicePorts};
pub use self::shopping_list::{
    SHOPPING_LIST_TITLE, ShoppingList, ShoppingListLine, ShoppingListService,
};
pub use self::subscriptions::{AuthorSubscription, SubscriptionService};
pub use self::toggle::{RELATION_EXISTS, RELATION_MISSING, ToggleOp, Toggled};
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, NewUser, PersonName, User, UserCredentials, UserId, UserProfile, UserValidationError,
    Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use foodgram::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
