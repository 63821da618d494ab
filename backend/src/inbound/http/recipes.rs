//! Recipe API handlers.
//!
//! ```text
//! GET    /api/recipes/?author=2&tags=breakfast&tags=dinner&is_favorited=1
//! POST   /api/recipes/
//! GET    /api/recipes/{id}/
//! PATCH  /api/recipes/{id}/
//! DELETE /api/recipes/{id}/
//! GET    /api/recipes/{id}/get-link/
//! POST   /api/recipes/{id}/favorite/
//! POST   /api/recipes/{id}/shopping_cart/
//! GET    /api/recipes/download_shopping_cart/
//! ```

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::RecipeRelationKind;
use crate::domain::{
    Error, ImageUpload, IngredientAmount, IngredientId, RecipeDraft, RecipeListing, TagId,
    ToggleOp, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{RecipeResponse, RecipeSummaryResponse, toggled_response};
use crate::inbound::http::paging::{PageEnvelope, PageParams, envelope};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    image_error, invalid_value_error, missing_field_error, recipe_id_from_path,
    recipe_validation_error,
};

/// File name offered for the shopping list download.
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// Recipe listing filters. `tags` may repeat; a recipe matches any of them.
#[derive(Debug, Default, Clone, PartialEq, Eq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListParams {
    /// Author id.
    pub author: Option<i64>,
    /// Tag slugs.
    pub tags: Vec<String>,
    /// `1` to keep only the viewer's favorites.
    pub is_favorited: Option<bool>,
    /// `1` to keep only recipes in the viewer's cart.
    pub is_in_shopping_cart: Option<bool>,
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, Error> {
    match raw {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(invalid_value_error(field, format!("{field} must be 0 or 1"))),
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, Error> {
    raw.parse()
        .map_err(|_| invalid_value_error(field, format!("{field} must be a positive integer")))
}

impl RecipeListParams {
    /// Parse a raw query string into filters and pagination. Unknown keys
    /// are ignored.
    pub fn from_query(query: &str) -> Result<(Self, PageParams), Error> {
        let mut params = Self::default();
        let mut page = PageParams::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "author" => params.author = Some(parse_number("author", &value)?),
                "tags" => params.tags.push(value.into_owned()),
                "is_favorited" => params.is_favorited = Some(parse_flag("is_favorited", &value)?),
                "is_in_shopping_cart" => {
                    params.is_in_shopping_cart = Some(parse_flag("is_in_shopping_cart", &value)?);
                }
                "limit" => page.limit = Some(parse_number("limit", &value)?),
                "offset" => page.offset = Some(parse_number("offset", &value)?),
                "page" => page.page = Some(parse_number("page", &value)?),
                _ => {}
            }
        }
        Ok((params, page))
    }

    fn listing(&self) -> Result<RecipeListing, Error> {
        let author = self
            .author
            .map(UserId::new)
            .transpose()
            .map_err(|err| invalid_value_error("author", err))?;
        Ok(RecipeListing {
            author,
            tags: self.tags.clone(),
            only_favorited: self.is_favorited.unwrap_or(false),
            only_in_shopping_cart: self.is_in_shopping_cart.unwrap_or(false),
        })
    }
}

/// One ingredient of a recipe write.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct IngredientAmountRequest {
    pub id: i64,
    #[schema(example = 100)]
    pub amount: i64,
}

/// Create and update body. Every field except `image` is required on both;
/// `image` may be omitted on update to keep the current one.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RecipeRequest {
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    pub tags: Option<Vec<i64>>,
    /// Base64 image data URL.
    #[schema(example = "data:image/png;base64,iVBORw0KGgo=")]
    pub image: Option<String>,
    #[schema(example = "Pancakes")]
    pub name: Option<String>,
    pub text: Option<String>,
    /// Minutes.
    #[schema(example = 20)]
    pub cooking_time: Option<i64>,
}

/// Out-of-range integers collapse to values the domain rejects by range.
fn clamp_to_u32(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

impl RecipeRequest {
    fn into_parts(self) -> Result<(RecipeDraft, Option<ImageUpload>), Error> {
        let name = self.name.ok_or_else(|| missing_field_error("name"))?;
        let text = self.text.ok_or_else(|| missing_field_error("text"))?;
        let cooking_time = self
            .cooking_time
            .ok_or_else(|| missing_field_error("cooking_time"))?;
        let ingredients = self
            .ingredients
            .ok_or_else(|| missing_field_error("ingredients"))?
            .into_iter()
            .map(|line| {
                IngredientAmount::new(IngredientId::new(line.id)?, clamp_to_u32(line.amount))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(recipe_validation_error)?;
        let tags = self
            .tags
            .ok_or_else(|| missing_field_error("tags"))?
            .into_iter()
            .map(TagId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(recipe_validation_error)?;
        let draft = RecipeDraft::new(name, text, clamp_to_u32(cooking_time), ingredients, tags)
            .map_err(recipe_validation_error)?;
        let image = self
            .image
            .map(|raw| ImageUpload::from_data_url(&raw))
            .transpose()
            .map_err(|err| image_error("image", err))?;
        Ok((draft, image))
    }
}

/// Short link body; the key is hyphenated for client compatibility.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    #[schema(example = "https://foodgram.example.com/s/7/")]
    pub short_link: String,
}

/// List recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/recipes/",
    params(RecipeListParams, PageParams),
    responses(
        (status = 200, description = "Recipes", body = PageEnvelope<RecipeResponse>),
        (status = 400, description = "Invalid filter or pagination", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security([])
)]
#[get("/recipes/")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<web::Json<PageEnvelope<RecipeResponse>>> {
    let (params, page_params) = RecipeListParams::from_query(req.query_string())?;
    let request = page_params.to_request()?;
    let page = state
        .recipes_query
        .list(session.user_id()?, params.listing()?, request)
        .await?;
    let body = envelope(page, request, &req, &state.links, |view| {
        RecipeResponse::new(view, &state.links)
    })?;
    Ok(web::Json(body))
}

/// Publish a recipe.
#[utoipa::path(
    post,
    path = "/api/recipes/",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = Error),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes/")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let (draft, image) = payload.into_inner().into_parts()?;
    let image = image.ok_or_else(|| missing_field_error("image"))?;
    let view = state.recipes.create(me, draft, image).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::new(view, &state.links)))
}

/// One recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security([])
)]
#[get("/recipes/{id}/")]
pub async fn recipe_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let id = recipe_id_from_path(path.into_inner())?;
    let view = state.recipes_query.get(session.user_id()?, id).await?;
    Ok(web::Json(RecipeResponse::new(view, &state.links)))
}

/// Replace a recipe's content. Only the author may edit.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[patch("/recipes/{id}/")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let me = session.require_user_id()?;
    let id = recipe_id_from_path(path.into_inner())?;
    state.recipes.authorize_edit(Some(me), id).await?;
    let (draft, image) = payload.into_inner().into_parts()?;
    let view = state.recipes.update(Some(me), id, draft, image).await?;
    Ok(web::Json(RecipeResponse::new(view, &state.links)))
}

/// Delete a recipe. Only the author may delete.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}/")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = recipe_id_from_path(path.into_inner())?;
    state.recipes.delete(session.user_id()?, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Absolute short link for sharing a recipe.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Short link", body = ShortLinkResponse),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipeLink",
    security([])
)]
#[get("/recipes/{id}/get-link/")]
pub async fn recipe_link(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    req: HttpRequest,
) -> ApiResult<web::Json<ShortLinkResponse>> {
    let id = recipe_id_from_path(path.into_inner())?;
    let id = state.recipes_query.resolve_short_link(id).await?;
    Ok(web::Json(ShortLinkResponse {
        short_link: state.links.short_link(&req, id)?,
    }))
}

async fn toggle_relation(
    state: &HttpState,
    session: &SessionContext,
    kind: RecipeRelationKind,
    op: ToggleOp,
    recipe: i64,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let recipe = recipe_id_from_path(recipe)?;
    let toggled = state.relations.toggle(kind, op, me, recipe).await?;
    Ok(toggled_response(toggled, |summary| {
        RecipeSummaryResponse::new(summary, &state.links)
    }))
}

/// Add a recipe to the viewer's favorites.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added", body = RecipeSummaryResponse),
        (status = 400, description = "Already a favorite", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addFavorite"
)]
#[post("/recipes/{id}/favorite/")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    toggle_relation(
        &state,
        &session,
        RecipeRelationKind::Favorite,
        ToggleOp::Add,
        path.into_inner(),
    )
    .await
}

/// Remove a recipe from the viewer's favorites.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Not a favorite", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFavorite"
)]
#[delete("/recipes/{id}/favorite/")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    toggle_relation(
        &state,
        &session,
        RecipeRelationKind::Favorite,
        ToggleOp::Remove,
        path.into_inner(),
    )
    .await
}

/// Put a recipe in the viewer's shopping cart.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added", body = RecipeSummaryResponse),
        (status = 400, description = "Already in the cart", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addToShoppingCart"
)]
#[post("/recipes/{id}/shopping_cart/")]
pub async fn add_to_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    toggle_relation(
        &state,
        &session,
        RecipeRelationKind::ShoppingCart,
        ToggleOp::Add,
        path.into_inner(),
    )
    .await
}

/// Take a recipe out of the viewer's shopping cart.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Not in the cart", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeFromShoppingCart"
)]
#[delete("/recipes/{id}/shopping_cart/")]
pub async fn remove_from_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    toggle_relation(
        &state,
        &session,
        RecipeRelationKind::ShoppingCart,
        ToggleOp::Remove,
        path.into_inner(),
    )
    .await
}

/// Aggregated ingredients of every recipe in the cart, as a text file.
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart/",
    responses(
        (status = 200, description = "Shopping list", content_type = "text/plain", body = String),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "downloadShoppingCart"
)]
#[get("/recipes/download_shopping_cart/")]
pub async fn download_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let list = state.shopping_list.shopping_list(me).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(SHOPPING_LIST_FILENAME.to_owned())],
        })
        .body(list.render()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::session::USER_ID_KEY;
    use crate::inbound::http::test_utils::{PNG_DATA_URL, TestContext, session_cookie};
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    fn query_collects_repeated_tags() {
        let (params, page) =
            RecipeListParams::from_query("tags=breakfast&author=3&tags=dinner&limit=2")
                .expect("valid query");

        assert_eq!(params.tags, vec!["breakfast", "dinner"]);
        assert_eq!(params.author, Some(3));
        assert_eq!(page.limit, Some(2));
    }

    #[rstest]
    #[case("is_favorited=yes", "is_favorited")]
    #[case("author=abc", "author")]
    #[case("limit=-1", "limit")]
    fn malformed_query_values_are_rejected(#[case] query: &str, #[case] field: &str) {
        let error = RecipeListParams::from_query(query).expect_err("invalid query");
        let details = error.details().expect("details");
        assert_eq!(details["field"], field);
    }

    #[rstest]
    #[case(json!({"text": "t", "cooking_time": 5, "ingredients": [{"id": 1, "amount": 1}], "tags": [1]}), "name")]
    #[case(json!({"name": "n", "text": "t", "cooking_time": 0, "ingredients": [{"id": 1, "amount": 1}], "tags": [1]}), "cooking_time")]
    #[case(json!({"name": "n", "text": "t", "cooking_time": 5, "ingredients": [{"id": 1, "amount": -3}], "tags": [1]}), "amount")]
    #[case(json!({"name": "n", "text": "t", "cooking_time": 5, "ingredients": [], "tags": [1]}), "ingredients")]
    #[case(json!({"name": "n", "text": "t", "cooking_time": 5, "ingredients": [{"id": 1, "amount": 1}], "tags": [1, 1]}), "tags")]
    fn recipe_requests_validate_fields(#[case] body: Value, #[case] field: &str) {
        let request: RecipeRequest = serde_json::from_value(body).expect("request json");

        let error = request.into_parts().expect_err("invalid recipe");

        assert_eq!(error.details().expect("details")["field"], field);
    }

    async fn body_of(res: actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> Value {
        actix_test::read_body_json(res).await
    }

    #[actix_web::test]
    async fn create_requires_login_and_image() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        let body = json!({
            "name": "Porridge",
            "text": "Cook oats.",
            "cooking_time": 10,
            "tags": [1],
            "ingredients": [{"id": 1, "amount": 50}],
        });

        let anonymous = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/recipes/")
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        ctx.register(&app, "ada").await;
        let cookie = ctx.login(&app, "ada").await;
        let no_image = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/recipes/")
                .cookie(cookie)
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(no_image.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(no_image).await["details"]["field"], "image");
    }

    #[actix_web::test]
    async fn created_recipe_renders_full_view() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;
        let cookie = ctx.login(&app, "ada").await;
        let id = ctx.create_recipe(&app, &cookie, "Porridge").await;

        let view: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/recipes/{id}/"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(view["name"], "Porridge");
        assert_eq!(view["author"]["username"], "ada");
        assert_eq!(view["tags"][0]["slug"], "breakfast");
        assert_eq!(view["ingredients"][0]["name"], "sugar");
        assert_eq!(view["ingredients"][0]["amount"], 100);
        assert_eq!(view["is_favorited"], false);
        let image = view["image"].as_str().expect("image");
        assert!(image.starts_with("/media/recipes/images/"), "{image}");
    }

    #[actix_web::test]
    async fn listing_filters_by_tag_and_favorites() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;
        let cookie = ctx.login(&app, "ada").await;
        let first = ctx.create_recipe(&app, &cookie, "Porridge").await;
        ctx.create_recipe(&app, &cookie, "Toast").await;

        let by_tag: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/recipes/?tags=dinner&tags=breakfast")
                .to_request(),
        )
        .await;
        assert_eq!(by_tag["count"], 2);
        assert_eq!(by_tag["results"][0]["name"], "Toast");

        let none: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/recipes/?tags=dinner")
                .to_request(),
        )
        .await;
        assert_eq!(none["count"], 0);

        let favorite = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/recipes/{first}/favorite/"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(favorite.status(), StatusCode::CREATED);

        let favorites: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/recipes/?is_favorited=1")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(favorites["count"], 1);
        assert_eq!(favorites["results"][0]["is_favorited"], true);

        let anonymous: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/recipes/?is_favorited=1")
                .to_request(),
        )
        .await;
        assert_eq!(anonymous["count"], 0);
    }

    #[actix_web::test]
    async fn only_the_author_may_edit() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;
        ctx.register(&app, "bob").await;
        let ada = ctx.login(&app, "ada").await;
        let bob = ctx.login(&app, "bob").await;
        let id = ctx.create_recipe(&app, &ada, "Porridge").await;
        let update = json!({
            "name": "Better porridge",
            "text": "Cook oats slowly.",
            "cooking_time": 15,
            "tags": [2],
            "ingredients": [{"id": 2, "amount": 80}],
        });

        let forbidden = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/recipes/{id}/"))
                .cookie(bob.clone())
                .set_json(&update)
                .to_request(),
        )
        .await;
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let partial = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/recipes/{id}/"))
                .cookie(bob.clone())
                .set_json(json!({"name": "Bob's porridge"}))
                .to_request(),
        )
        .await;
        assert_eq!(partial.status(), StatusCode::FORBIDDEN);

        let updated = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&format!("/api/recipes/{id}/"))
                .cookie(ada.clone())
                .set_json(&update)
                .to_request(),
        )
        .await;
        assert_eq!(updated.status(), StatusCode::OK);
        let body = body_of(updated).await;
        assert_eq!(body["name"], "Better porridge");
        assert_eq!(body["tags"][0]["slug"], "dinner");
        assert!(body["image"].as_str().is_some_and(|image| !image.is_empty()));

        let delete_forbidden = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/recipes/{id}/"))
                .cookie(bob)
                .to_request(),
        )
        .await;
        assert_eq!(delete_forbidden.status(), StatusCode::FORBIDDEN);

        let deleted = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/recipes/{id}/"))
                .cookie(ada)
                .to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn get_link_points_at_short_route() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;
        let cookie = ctx.login(&app, "ada").await;
        let id = ctx.create_recipe(&app, &cookie, "Porridge").await;

        let body: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/recipes/{id}/get-link/"))
                .insert_header(("Host", "food.example.org"))
                .to_request(),
        )
        .await;

        assert_eq!(body["short-link"], format!("http://food.example.org/s/{id}/"));
    }

    #[actix_web::test]
    async fn cart_download_sums_ingredients() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;
        let cookie = ctx.login(&app, "ada").await;
        for name in ["Porridge", "Toast"] {
            let id = ctx.create_recipe(&app, &cookie, name).await;
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri(&format!("/api/recipes/{id}/shopping_cart/"))
                    .cookie(cookie.clone())
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/recipes/download_shopping_cart/")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let disposition = res
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        assert_eq!(
            disposition.as_deref(),
            Some("attachment; filename=\"shopping_list.txt\"")
        );
        let text = actix_test::read_body(res).await;
        let text = std::str::from_utf8(&text).expect("utf-8 body");
        assert_eq!(text, "Shopping list\nsugar (g) — 200\n");
    }

    #[actix_web::test]
    async fn unreadable_session_is_an_internal_error() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app().route(
            "/corrupt-session",
            web::get().to(|session: actix_session::Session| async move {
                session
                    .insert(USER_ID_KEY, "not-a-number")
                    .map_err(|err| Error::internal(err.to_string()))?;
                Ok::<_, Error>(HttpResponse::Ok().finish())
            }),
        ))
        .await;
        let corrupt = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/corrupt-session")
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&corrupt).expect("session cookie");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/recipes/")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn image_must_be_a_data_url() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;
        let cookie = ctx.login(&app, "ada").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/recipes/")
                .cookie(cookie)
                .set_json(json!({
                    "name": "Porridge",
                    "text": "Cook oats.",
                    "cooking_time": 10,
                    "tags": [1],
                    "ingredients": [{"id": 1, "amount": 50}],
                    "image": PNG_DATA_URL.replace("data:image", "data:text"),
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(res).await["details"]["code"], "invalid_image");
    }
}
