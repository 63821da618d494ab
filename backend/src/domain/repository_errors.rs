//! Mapping from driven-port failures to transport-agnostic domain errors.
//!
//! Connection failures become `ServiceUnavailable`; query failures become
//! `InternalError`, which adapters redact. Variants with domain meaning
//! (uniqueness, unknown references) are handled by the calling service
//! before falling back to these helpers.

use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{
    MediaStoreError, RecipeRelationError, RecipeRepositoryError, ReferenceDataError,
    SubscriptionRepositoryError, UserPersistenceError,
};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::invalid_request(format!("a user with this {field} already exists"))
                .with_details(json!({ "field": field, "code": "duplicate" }))
        }
    }
}

pub(crate) fn map_subscription_error(error: SubscriptionRepositoryError) -> Error {
    match error {
        SubscriptionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("subscription repository unavailable: {message}"))
        }
        SubscriptionRepositoryError::Query { message } => {
            Error::internal(format!("subscription repository error: {message}"))
        }
        SubscriptionRepositoryError::UniqueViolation => {
            crate::domain::toggle::relation_exists("already subscribed to this author")
        }
        SubscriptionRepositoryError::SelfSubscription => {
            Error::invalid_request("users cannot subscribe to themselves")
        }
    }
}

pub(crate) fn map_recipe_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipeRepositoryError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
        RecipeRepositoryError::UnknownReference { field } => {
            Error::invalid_request(format!("unknown {field} referenced by recipe"))
                .with_details(json!({ "field": field, "code": "unknown_reference" }))
        }
    }
}

pub(crate) fn map_relation_error(error: RecipeRelationError) -> Error {
    match error {
        RecipeRelationError::Connection { message } => {
            Error::service_unavailable(format!("relation repository unavailable: {message}"))
        }
        RecipeRelationError::Query { message } => {
            Error::internal(format!("relation repository error: {message}"))
        }
        RecipeRelationError::UniqueViolation => {
            crate::domain::toggle::relation_exists("relation already exists")
        }
    }
}

pub(crate) fn map_reference_data_error(error: ReferenceDataError) -> Error {
    match error {
        ReferenceDataError::Connection { message } => {
            Error::service_unavailable(format!("reference data unavailable: {message}"))
        }
        ReferenceDataError::Query { message } => {
            Error::internal(format!("reference data error: {message}"))
        }
    }
}

pub(crate) fn map_media_error(error: MediaStoreError) -> Error {
    Error::internal(error.to_string())
}
