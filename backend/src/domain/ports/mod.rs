//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`MediaStore`]) are implemented by outbound
//! adapters. Driving ports (`*Command`, `*Query`, [`LoginService`]) are
//! implemented by domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts_command;
mod login_service;
mod media_store;
mod recipe_relation_repository;
mod recipe_relations_command;
mod recipe_repository;
mod recipes_command;
mod recipes_query;
mod reference_data_repository;
mod shopping_list_query;
mod subscription_repository;
mod subscriptions_command;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use accounts_command::MockAccountsCommand;
pub use accounts_command::{AccountsCommand, Registration};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use media_store::MockMediaStore;
pub use media_store::{MediaStore, MediaStoreError};
#[cfg(test)]
pub use recipe_relation_repository::MockRecipeRelationRepository;
pub use recipe_relation_repository::{
    RecipeRelationError, RecipeRelationKind, RecipeRelationRepository,
};
#[cfg(test)]
pub use recipe_relations_command::MockRecipeRelationsCommand;
pub use recipe_relations_command::RecipeRelationsCommand;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipeRepository, RecipeRepositoryError};
#[cfg(test)]
pub use recipes_command::MockRecipesCommand;
pub use recipes_command::RecipesCommand;
#[cfg(test)]
pub use recipes_query::MockRecipesQuery;
pub use recipes_query::RecipesQuery;
#[cfg(test)]
pub use reference_data_repository::MockReferenceDataRepository;
pub use reference_data_repository::{ReferenceDataError, ReferenceDataRepository};
#[cfg(test)]
pub use shopping_list_query::MockShoppingListQuery;
pub use shopping_list_query::ShoppingListQuery;
#[cfg(test)]
pub use subscription_repository::MockSubscriptionRepository;
pub use subscription_repository::{SubscriptionRepository, SubscriptionRepositoryError};
#[cfg(test)]
pub use subscriptions_command::{MockSubscriptionsCommand, MockSubscriptionsQuery};
pub use subscriptions_command::{SubscriptionsCommand, SubscriptionsQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
