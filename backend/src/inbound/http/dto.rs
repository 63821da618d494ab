//! Response bodies shared by several handler modules.
//!
//! Domain types stay free of serde and utoipa derives; these DTOs fix the
//! JSON shape clients see and carry the OpenAPI schema.

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AuthorSubscription, Ingredient, IngredientLine, RecipeSummary, RecipeView, Tag, Toggled,
    User, UserProfile,
};
use crate::inbound::http::links::PublicLinks;

/// Public user profile as seen by the viewer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "cook@example.org")]
    pub email: String,
    #[schema(example = "cook")]
    pub username: String,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Cook")]
    pub last_name: String,
    /// Whether the viewer follows this user.
    pub is_subscribed: bool,
    /// Absolute or prefix-relative avatar URL.
    #[schema(example = "/media/users/3f2a.png")]
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn from_profile(profile: UserProfile, links: &PublicLinks) -> Self {
        let UserProfile {
            user,
            is_subscribed,
        } = profile;
        Self {
            id: user.id.value(),
            email: user.email.to_string(),
            username: user.username.to_string(),
            first_name: user.first_name.as_ref().to_owned(),
            last_name: user.last_name.as_ref().to_owned(),
            is_subscribed,
            avatar: user.avatar.as_deref().map(|path| links.media_url(path)),
        }
    }
}

/// Account data echoed after registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for RegisteredUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            email: user.email.to_string(),
            username: user.username.to_string(),
            first_name: user.first_name.as_ref().to_owned(),
            last_name: user.last_name.as_ref().to_owned(),
        }
    }
}

/// Compact recipe card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeSummaryResponse {
    pub id: i64,
    #[schema(example = "Pancakes")]
    pub name: String,
    #[schema(example = "/media/recipes/images/9b1c.png")]
    pub image: String,
    /// Minutes.
    #[schema(example = 20)]
    pub cooking_time: u32,
}

impl RecipeSummaryResponse {
    pub fn new(summary: RecipeSummary, links: &PublicLinks) -> Self {
        Self {
            id: summary.id.value(),
            name: summary.name,
            image: links.media_url(&summary.image),
            cooking_time: summary.cooking_time,
        }
    }
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: u64,
}

impl SubscriptionResponse {
    pub fn new(subscription: AuthorSubscription, links: &PublicLinks) -> Self {
        Self {
            user: UserResponse::from_profile(subscription.profile, links),
            recipes: subscription
                .recipes
                .into_iter()
                .map(|summary| RecipeSummaryResponse::new(summary, links))
                .collect(),
            recipes_count: subscription.recipes_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagResponse {
    pub id: i64,
    #[schema(example = "Breakfast")]
    pub name: String,
    #[schema(example = "breakfast")]
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.value(),
            name: tag.name,
            slug: tag.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i64,
    #[schema(example = "sugar")]
    pub name: String,
    #[schema(example = "g")]
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id.value(),
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// Ingredient line of a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientLineResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    #[schema(example = 100)]
    pub amount: u32,
}

impl From<IngredientLine> for IngredientLineResponse {
    fn from(line: IngredientLine) -> Self {
        Self {
            id: line.ingredient.id.value(),
            name: line.ingredient.name,
            measurement_unit: line.ingredient.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Full recipe as seen by the viewer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<IngredientLineResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    #[schema(example = "Pancakes")]
    pub name: String,
    #[schema(example = "/media/recipes/images/9b1c.png")]
    pub image: String,
    pub text: String,
    /// Minutes.
    #[schema(example = 20)]
    pub cooking_time: u32,
}

impl RecipeResponse {
    pub fn new(view: RecipeView, links: &PublicLinks) -> Self {
        let RecipeView {
            recipe,
            author,
            is_favorited,
            is_in_shopping_cart,
        } = view;
        Self {
            id: recipe.id.value(),
            tags: recipe.tags.into_iter().map(TagResponse::from).collect(),
            author: UserResponse::from_profile(author, links),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(IngredientLineResponse::from)
                .collect(),
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: links.media_url(&recipe.image),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// `201` with the rendered body for an add, `204` for a remove.
pub(crate) fn toggled_response<T, U: Serialize>(
    toggled: Toggled<T>,
    render: impl FnOnce(T) -> U,
) -> HttpResponse {
    match toggled {
        Toggled::Added(value) => HttpResponse::Created().json(render(value)),
        Toggled::Removed => HttpResponse::NoContent().finish(),
    }
}
