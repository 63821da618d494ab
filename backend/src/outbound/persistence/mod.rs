//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Constraint-aware errors**: unique, foreign key and check violations
//!   are mapped to the port error variants services rely on.
//!
//! # Example
//!
//! ```ignore
//! use foodgram::outbound::persistence::{DbPool, PoolConfig, DieselRecipeRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/foodgram")).await?;
//! let recipes = DieselRecipeRepository::new(pool.clone());
//! ```

mod diesel_basic_error_mapping;
mod diesel_helpers;
mod diesel_recipe_relation_repository;
mod diesel_recipe_repository;
mod diesel_reference_data_repository;
mod diesel_subscription_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_recipe_relation_repository::DieselRecipeRelationRepository;
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_reference_data_repository::DieselReferenceDataRepository;
pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_POOL_SIZE, DbPool, PoolConfig, PoolError};
