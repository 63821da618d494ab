//! Read-only tag and ingredient catalogue.
//!
//! ```text
//! GET /api/tags/
//! GET /api/tags/{id}/
//! GET /api/ingredients/?name=sug
//! GET /api/ingredients/{id}/
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::repository_errors::map_reference_data_error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{IngredientResponse, TagResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ingredient_id_from_path, tag_id_from_path};

/// Case-insensitive name prefix filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IngredientSearch {
    #[param(example = "sug")]
    pub name: Option<String>,
}

/// Every tag, unpaginated.
#[utoipa::path(
    get,
    path = "/api/tags/",
    responses((status = 200, description = "Tags", body = [TagResponse])),
    tags = ["reference"],
    operation_id = "listTags",
    security([])
)]
#[get("/tags/")]
pub async fn list_tags(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<TagResponse>>> {
    let tags = state
        .reference_data
        .list_tags()
        .await
        .map_err(map_reference_data_error)?;
    Ok(web::Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/tags/{id}/",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Unknown tag", body = Error)
    ),
    tags = ["reference"],
    operation_id = "getTag",
    security([])
)]
#[get("/tags/{id}/")]
pub async fn tag_detail(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<TagResponse>> {
    let id = tag_id_from_path(path.into_inner())?;
    let tag = state
        .reference_data
        .find_tag(id)
        .await
        .map_err(map_reference_data_error)?
        .ok_or_else(|| Error::not_found(format!("tag {id} not found")))?;
    Ok(web::Json(tag.into()))
}

/// Ingredients, optionally narrowed by a name prefix.
#[utoipa::path(
    get,
    path = "/api/ingredients/",
    params(IngredientSearch),
    responses((status = 200, description = "Ingredients", body = [IngredientResponse])),
    tags = ["reference"],
    operation_id = "listIngredients",
    security([])
)]
#[get("/ingredients/")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    search: web::Query<IngredientSearch>,
) -> ApiResult<web::Json<Vec<IngredientResponse>>> {
    let prefix = search.into_inner().name.filter(|name| !name.is_empty());
    let ingredients = state
        .reference_data
        .search_ingredients(prefix)
        .await
        .map_err(map_reference_data_error)?;
    Ok(web::Json(
        ingredients.into_iter().map(IngredientResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}/",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Unknown ingredient", body = Error)
    ),
    tags = ["reference"],
    operation_id = "getIngredient",
    security([])
)]
#[get("/ingredients/{id}/")]
pub async fn ingredient_detail(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<IngredientResponse>> {
    let id = ingredient_id_from_path(path.into_inner())?;
    let ingredient = state
        .reference_data
        .find_ingredient(id)
        .await
        .map_err(map_reference_data_error)?
        .ok_or_else(|| Error::not_found(format!("ingredient {id} not found")))?;
    Ok(web::Json(ingredient.into()))
}
