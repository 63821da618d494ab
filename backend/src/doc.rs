//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: request and response DTOs plus the domain [`Error`] and
//!   [`ErrorCode`] payloads
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::dto::{
    IngredientLineResponse, IngredientResponse, RecipeResponse, RecipeSummaryResponse,
    RegisteredUserResponse, SubscriptionResponse, TagResponse, UserResponse,
};
use crate::inbound::http::recipes::{IngredientAmountRequest, RecipeRequest, ShortLinkResponse};
use crate::inbound::http::users::{
    AvatarRequest, AvatarResponse, RegisterRequest, SetPasswordRequest,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login/.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Foodgram backend API",
        description = "Recipe sharing: accounts, subscriptions, recipes, favorites and shopping lists.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::user_detail,
        crate::inbound::http::users::set_password,
        crate::inbound::http::users::set_avatar,
        crate::inbound::http::users::clear_avatar,
        crate::inbound::http::users::subscriptions,
        crate::inbound::http::users::subscribe,
        crate::inbound::http::users::unsubscribe,
        crate::inbound::http::reference_data::list_tags,
        crate::inbound::http::reference_data::tag_detail,
        crate::inbound::http::reference_data::list_ingredients,
        crate::inbound::http::reference_data::ingredient_detail,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::recipe_detail,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::recipe_link,
        crate::inbound::http::recipes::add_favorite,
        crate::inbound::http::recipes::remove_favorite,
        crate::inbound::http::recipes::add_to_cart,
        crate::inbound::http::recipes::remove_from_cart,
        crate::inbound::http::recipes::download_shopping_cart,
        crate::inbound::http::short_link::follow_short_link,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        RegisterRequest,
        SetPasswordRequest,
        AvatarRequest,
        AvatarResponse,
        RegisteredUserResponse,
        UserResponse,
        SubscriptionResponse,
        TagResponse,
        IngredientResponse,
        IngredientLineResponse,
        RecipeSummaryResponse,
        RecipeResponse,
        RecipeRequest,
        IngredientAmountRequest,
        ShortLinkResponse,
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "users", description = "Accounts, profiles and subscriptions"),
        (name = "recipes", description = "Recipes, favorites and the shopping cart"),
        (name = "reference", description = "Tags and ingredients"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
