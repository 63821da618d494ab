//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes `400 invalid_request` with a
//! `{"field", "code"}` details object so clients can highlight the input.

use std::fmt::Display;

use pagination::PaginationError;
use serde_json::json;

use crate::domain::{
    Error, ImageUploadError, IngredientId, LoginValidationError, RecipeId, RecipeValidationError,
    TagId, UserId, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidValue,
    InvalidImage,
    InvalidPagination,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidImage => "invalid_image",
            ErrorCode::InvalidPagination => "invalid_pagination",
        }
    }
}

fn field_error(field: &str, code: ErrorCode, message: impl Display) -> Error {
    Error::invalid_request(message.to_string()).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: &str) -> Error {
    field_error(
        field,
        ErrorCode::MissingField,
        format!("missing required field: {field}"),
    )
}

pub(crate) fn invalid_value_error(field: &str, message: impl Display) -> Error {
    field_error(field, ErrorCode::InvalidValue, message)
}

/// Field a user validation failure refers to.
fn user_field(err: &UserValidationError) -> &'static str {
    match err {
        UserValidationError::NonPositiveId => "id",
        UserValidationError::EmptyEmail
        | UserValidationError::InvalidEmail
        | UserValidationError::EmailTooLong { .. } => "email",
        UserValidationError::EmptyUsername
        | UserValidationError::UsernameTooLong { .. }
        | UserValidationError::UsernameInvalidCharacters
        | UserValidationError::UsernameReserved => "username",
        UserValidationError::EmptyName { field }
        | UserValidationError::NameTooLong { field, .. } => *field,
    }
}

pub(crate) fn user_validation_error(err: UserValidationError) -> Error {
    field_error(user_field(&err), ErrorCode::InvalidValue, err)
}

/// Map a password or login failure onto `field`.
pub(crate) fn login_validation_error(err: LoginValidationError, password_field: &str) -> Error {
    let field = match err {
        LoginValidationError::InvalidEmail => "email",
        LoginValidationError::EmptyPassword
        | LoginValidationError::PasswordTooShort { .. }
        | LoginValidationError::PasswordTooLong { .. } => password_field,
    };
    field_error(field, ErrorCode::InvalidValue, err)
}

pub(crate) fn recipe_validation_error(err: RecipeValidationError) -> Error {
    field_error(err.field(), ErrorCode::InvalidValue, err)
}

pub(crate) fn image_error(field: &str, err: ImageUploadError) -> Error {
    field_error(field, ErrorCode::InvalidImage, err)
}

pub(crate) fn pagination_error(err: PaginationError) -> Error {
    let field = match err {
        PaginationError::ZeroLimit => "limit",
        PaginationError::ZeroPage | PaginationError::PageAndOffset => "page",
    };
    field_error(field, ErrorCode::InvalidPagination, err)
}

/// Path ids that cannot exist are reported as missing resources.
pub(crate) fn recipe_id_from_path(raw: i64) -> Result<RecipeId, Error> {
    RecipeId::new(raw).map_err(|_| Error::not_found(format!("recipe {raw} not found")))
}

pub(crate) fn user_id_from_path(raw: i64) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::not_found(format!("user {raw} not found")))
}

pub(crate) fn tag_id_from_path(raw: i64) -> Result<TagId, Error> {
    TagId::new(raw).map_err(|_| Error::not_found(format!("tag {raw} not found")))
}

pub(crate) fn ingredient_id_from_path(raw: i64) -> Result<IngredientId, Error> {
    IngredientId::new(raw).map_err(|_| Error::not_found(format!("ingredient {raw} not found")))
}
