//! Recipes and the reference data they are built from.
//!
//! Tags and ingredients are read-only catalogue entries. A recipe links to
//! both through validated identifier lists in [`RecipeDraft`].

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{UserId, UserProfile};

/// Validation errors for recipe, tag and ingredient values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    NonPositiveId { field: &'static str },
    EmptyField { field: &'static str },
    FieldTooLong { field: &'static str, max: usize },
    OutOfRange { field: &'static str, min: u32, max: u32 },
    InvalidSlug,
    NoIngredients,
    NoTags,
    DuplicateIngredient { id: i64 },
    DuplicateTag { id: i64 },
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveId { field } => write!(f, "{field} must be a positive integer"),
            Self::EmptyField { field } => write!(f, "{field} must not be empty"),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::OutOfRange { field, min, max } => {
                write!(f, "{field} must be between {min} and {max}")
            }
            Self::InvalidSlug => write!(
                f,
                "slug may only contain latin letters, digits, hyphens and underscores",
            ),
            Self::NoIngredients => write!(f, "a recipe needs at least one ingredient"),
            Self::NoTags => write!(f, "a recipe needs at least one tag"),
            Self::DuplicateIngredient { id } => write!(f, "ingredient {id} is listed twice"),
            Self::DuplicateTag { id } => write!(f, "tag {id} is listed twice"),
        }
    }
}

impl std::error::Error for RecipeValidationError {}

impl RecipeValidationError {
    /// Field the error refers to, for adapter error details.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveId { field }
            | Self::EmptyField { field }
            | Self::FieldTooLong { field, .. }
            | Self::OutOfRange { field, .. } => field,
            Self::InvalidSlug => "slug",
            Self::NoIngredients | Self::DuplicateIngredient { .. } => "ingredients",
            Self::NoTags | Self::DuplicateTag { .. } => "tags",
        }
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            #[doc = concat!("Validate and construct a [`", stringify!($name), "`].")]
            pub fn new(id: i64) -> Result<Self, RecipeValidationError> {
                if id <= 0 {
                    return Err(RecipeValidationError::NonPositiveId { field: $field });
                }
                Ok(Self(id))
            }

            /// Raw numeric value.
            pub fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = RecipeValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

numeric_id!(
    /// Recipe identifier; also the short-link key.
    RecipeId,
    "id"
);
numeric_id!(
    /// Tag identifier.
    TagId,
    "tags"
);
numeric_id!(
    /// Ingredient identifier.
    IngredientId,
    "ingredients"
);

/// Maximum recipe name length.
pub const RECIPE_NAME_MAX: usize = 256;
/// Maximum ingredient name length.
pub const INGREDIENT_NAME_MAX: usize = 128;
/// Maximum measurement unit length.
pub const MEASUREMENT_UNIT_MAX: usize = 64;
/// Maximum tag name and slug length.
pub const TAG_FIELD_MAX: usize = 32;
/// Smallest accepted cooking time and ingredient amount.
pub const QUANTITY_MIN: u32 = 1;
/// Largest accepted cooking time and ingredient amount.
pub const QUANTITY_MAX: u32 = 32_000;

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_regex() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        Regex::new(r"^[-a-zA-Z0-9_]+$")
            .unwrap_or_else(|error| panic!("slug regex failed to compile: {error}"))
    })
}

fn bounded_text(
    value: impl Into<String>,
    field: &'static str,
    max: Option<usize>,
) -> Result<String, RecipeValidationError> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(RecipeValidationError::EmptyField { field });
    }
    if let Some(max) = max
        && value.chars().count() > max
    {
        return Err(RecipeValidationError::FieldTooLong { field, max });
    }
    Ok(value)
}

fn quantity(value: u32, field: &'static str) -> Result<u32, RecipeValidationError> {
    if !(QUANTITY_MIN..=QUANTITY_MAX).contains(&value) {
        return Err(RecipeValidationError::OutOfRange {
            field,
            min: QUANTITY_MIN,
            max: QUANTITY_MAX,
        });
    }
    Ok(value)
}

/// Recipe tag, such as "breakfast".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

impl Tag {
    /// Validate and construct a [`Tag`].
    pub fn new(
        id: TagId,
        name: impl Into<String>,
        slug: impl Into<String>,
    ) -> Result<Self, RecipeValidationError> {
        let name = bounded_text(name, "name", Some(TAG_FIELD_MAX))?;
        let slug = bounded_text(slug, "slug", Some(TAG_FIELD_MAX))?;
        if !slug_regex().is_match(&slug) {
            return Err(RecipeValidationError::InvalidSlug);
        }
        Ok(Self { id, name, slug })
    }
}

/// Catalogue ingredient with its measurement unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

impl Ingredient {
    /// Validate and construct an [`Ingredient`].
    pub fn new(
        id: IngredientId,
        name: impl Into<String>,
        measurement_unit: impl Into<String>,
    ) -> Result<Self, RecipeValidationError> {
        Ok(Self {
            id,
            name: bounded_text(name, "name", Some(INGREDIENT_NAME_MAX))?,
            measurement_unit: bounded_text(
                measurement_unit,
                "measurement_unit",
                Some(MEASUREMENT_UNIT_MAX),
            )?,
        })
    }
}

/// Ingredient reference with the quantity a recipe needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: IngredientId,
    pub amount: u32,
}

impl IngredientAmount {
    /// Validate the amount range.
    pub fn new(ingredient_id: IngredientId, amount: u32) -> Result<Self, RecipeValidationError> {
        Ok(Self {
            ingredient_id,
            amount: quantity(amount, "amount")?,
        })
    }
}

/// Resolved ingredient line as shown on a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub ingredient: Ingredient,
    pub amount: u32,
}

/// Author-supplied recipe content, validated but not yet persisted.
///
/// ## Invariants
/// - `ingredients` and `tags` are non-empty and free of duplicates.
/// - `cooking_time` and every amount lie in `1..=32000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    name: String,
    text: String,
    cooking_time: u32,
    ingredients: Vec<IngredientAmount>,
    tags: Vec<TagId>,
}

impl RecipeDraft {
    /// Validate raw recipe content.
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        cooking_time: u32,
        ingredients: Vec<IngredientAmount>,
        tags: Vec<TagId>,
    ) -> Result<Self, RecipeValidationError> {
        let name = bounded_text(name, "name", Some(RECIPE_NAME_MAX))?;
        let text = bounded_text(text, "text", None)?;
        let cooking_time = quantity(cooking_time, "cooking_time")?;

        if ingredients.is_empty() {
            return Err(RecipeValidationError::NoIngredients);
        }
        let mut seen = HashSet::new();
        for line in &ingredients {
            if !seen.insert(line.ingredient_id) {
                return Err(RecipeValidationError::DuplicateIngredient {
                    id: line.ingredient_id.value(),
                });
            }
        }

        if tags.is_empty() {
            return Err(RecipeValidationError::NoTags);
        }
        let mut seen = HashSet::new();
        for tag in &tags {
            if !seen.insert(*tag) {
                return Err(RecipeValidationError::DuplicateTag { id: tag.value() });
            }
        }

        Ok(Self {
            name,
            text,
            cooking_time,
            ingredients,
            tags,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn cooking_time(&self) -> u32 {
        self.cooking_time
    }

    pub fn ingredients(&self) -> &[IngredientAmount] {
        &self.ingredients
    }

    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }
}

/// Recipe ready for insertion: draft plus author and stored image path.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub author: UserId,
    pub draft: RecipeDraft,
    pub image: String,
}

/// Replacement content for an existing recipe. `image` is kept when `None`.
#[derive(Debug, Clone)]
pub struct RecipeUpdate {
    pub draft: RecipeDraft,
    pub image: Option<String>,
}

/// Persisted recipe with resolved tags and ingredient lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub author: UserId,
    pub name: String,
    pub text: String,
    pub cooking_time: u32,
    pub image: String,
    pub pub_date: DateTime<Utc>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<IngredientLine>,
}

impl Recipe {
    /// Compact projection used by relation endpoints and subscriptions.
    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
            cooking_time: self.cooking_time,
        }
    }
}

/// Compact recipe card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: u32,
}

/// Recipe as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    pub recipe: Recipe,
    pub author: UserProfile,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Listing request as asked by a viewer.
///
/// The `only_*` flags refer to the viewer's own collections; anonymous
/// viewers have none, so setting either flag yields an empty listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeListing {
    pub author: Option<UserId>,
    pub tags: Vec<String>,
    pub only_favorited: bool,
    pub only_in_shopping_cart: bool,
}

impl RecipeListing {
    /// Resolve the viewer-relative flags into a storage filter.
    ///
    /// Returns `None` when the listing is necessarily empty.
    pub fn resolve(self, viewer: Option<UserId>) -> Option<RecipeFilter> {
        let wants_marks = self.only_favorited || self.only_in_shopping_cart;
        if wants_marks && viewer.is_none() {
            return None;
        }
        Some(RecipeFilter {
            author: self.author,
            tags: self.tags,
            favorited_by: viewer.filter(|_| self.only_favorited),
            in_cart_of: viewer.filter(|_| self.only_in_shopping_cart),
        })
    }
}

/// Storage filters; all present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<UserId>,
    /// Tag slugs; a recipe matches when it carries any of them.
    pub tags: Vec<String>,
    pub favorited_by: Option<UserId>,
    pub in_cart_of: Option<UserId>,
}

/// One ingredient line from a recipe in somebody's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: u32,
}
