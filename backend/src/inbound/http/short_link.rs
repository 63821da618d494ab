//! Short recipe links: `GET /s/{id}/` redirects to the recipe page.

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::links::recipe_path;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::recipe_id_from_path;

/// Redirect a short link to the canonical recipe page.
#[utoipa::path(
    get,
    path = "/s/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 302, description = "Redirect to the recipe page", headers(("Location" = String, description = "Recipe page"))),
        (status = 404, description = "Unknown recipe", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "followShortLink",
    security([])
)]
#[get("/s/{id}/")]
pub async fn follow_short_link(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = recipe_id_from_path(path.into_inner())?;
    let id = state.recipes_query.resolve_short_link(id).await?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, recipe_path(id)))
        .finish())
}
