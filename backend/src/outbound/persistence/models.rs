//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types return a
//! plain message on failure; repositories wrap it in their `Query` variant.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Email, Ingredient, IngredientId, PasswordHash, PersonName, RecipeId, Tag, TagId, User,
    UserCredentials, UserId, Username,
};

use super::schema::{
    ingredients, recipe_ingredients, recipe_tags, recipes, subscriptions, tags, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        self.into_credentials().map(|credentials| credentials.user)
    }

    pub(crate) fn into_credentials(self) -> Result<UserCredentials, String> {
        let invalid = |err: crate::domain::UserValidationError| format!("stored user: {err}");
        let user = User {
            id: UserId::new(self.id).map_err(invalid)?,
            email: Email::new(&self.email).map_err(invalid)?,
            username: Username::new(self.username).map_err(invalid)?,
            first_name: PersonName::new(self.first_name, "first_name").map_err(invalid)?,
            last_name: PersonName::new(self.last_name, "last_name").map_err(invalid)?,
            avatar: self.avatar,
        };
        Ok(UserCredentials {
            user,
            password_hash: PasswordHash::from_phc(self.password_hash),
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub(crate) struct NewSubscriptionRow {
    pub user_id: i64,
    pub author_id: i64,
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl TryFrom<TagRow> for Tag {
    type Error = String;

    fn try_from(row: TagRow) -> Result<Self, Self::Error> {
        let id = TagId::new(row.id).map_err(|err| format!("stored tag: {err}"))?;
        Self::new(id, row.name, row.slug).map_err(|err| format!("stored tag: {err}"))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IngredientRow {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = String;

    fn try_from(row: IngredientRow) -> Result<Self, Self::Error> {
        let id = IngredientId::new(row.id).map_err(|err| format!("stored ingredient: {err}"))?;
        Self::new(id, row.name, row.measurement_unit)
            .map_err(|err| format!("stored ingredient: {err}"))
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// Row struct for reading from the recipes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeRow {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: String,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recipes)]
pub(crate) struct NewRecipeRow<'a> {
    pub author_id: i64,
    pub name: &'a str,
    pub text: &'a str,
    pub cooking_time: i32,
    pub image: &'a str,
}

/// Content columns replaced by an update; `image` is skipped when `None`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = recipes)]
pub(crate) struct RecipeChangeset<'a> {
    pub name: &'a str,
    pub text: &'a str,
    pub cooking_time: i32,
    pub image: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = recipe_tags)]
pub(crate) struct RecipeTagRow {
    pub recipe_id: i64,
    pub tag_id: i64,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = recipe_ingredients)]
pub(crate) struct NewRecipeIngredientRow {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub amount: i32,
}

/// Convert a stored quantity into the domain's unsigned representation.
pub(crate) fn stored_quantity(value: i32, field: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("stored {field} is negative: {value}"))
}

/// Convert a validated domain quantity into its column type.
///
/// Domain quantities never exceed 32000, so saturation is unreachable.
pub(crate) fn column_quantity(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub(crate) fn recipe_id(raw: i64) -> Result<RecipeId, String> {
    RecipeId::new(raw).map_err(|err| format!("stored recipe: {err}"))
}

pub(crate) fn user_id(raw: i64) -> Result<UserId, String> {
    UserId::new(raw).map_err(|err| format!("stored user: {err}"))
}
