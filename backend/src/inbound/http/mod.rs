//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod dto;
pub mod error;
pub mod health;
pub mod links;
pub mod paging;
pub mod recipes;
pub mod reference_data;
pub mod session;
pub mod short_link;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// Register every API route under `/api` plus the short-link redirect.
///
/// Fixed paths such as `/users/me/` are registered before their `{id}`
/// siblings so they are not captured as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| Error::invalid_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| Error::invalid_request(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| Error::not_found(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .service(auth::login)
            .service(auth::logout)
            .service(users::register)
            .service(users::list_users)
            .service(users::current_user)
            .service(users::set_password)
            .service(users::set_avatar)
            .service(users::clear_avatar)
            .service(users::subscriptions)
            .service(users::user_detail)
            .service(users::subscribe)
            .service(users::unsubscribe)
            .service(reference_data::list_tags)
            .service(reference_data::tag_detail)
            .service(reference_data::list_ingredients)
            .service(reference_data::ingredient_detail)
            .service(recipes::download_shopping_cart)
            .service(recipes::list_recipes)
            .service(recipes::create_recipe)
            .service(recipes::recipe_detail)
            .service(recipes::update_recipe)
            .service(recipes::delete_recipe)
            .service(recipes::recipe_link)
            .service(recipes::add_favorite)
            .service(recipes::remove_favorite)
            .service(recipes::add_to_cart)
            .service(recipes::remove_from_cart),
    )
    .service(short_link::follow_short_link);
}
