//! Users API handlers.
//!
//! ```text
//! POST   /api/users/ {"email":"cook@example.org","username":"cook",...}
//! GET    /api/users/?limit=6&page=2
//! GET    /api/users/me/
//! GET    /api/users/{id}/
//! POST   /api/users/set_password/
//! PUT    /api/users/me/avatar/
//! DELETE /api/users/me/avatar/
//! GET    /api/users/subscriptions/?recipes_limit=3
//! POST   /api/users/{id}/subscribe/
//! DELETE /api/users/{id}/subscribe/
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::Registration;
use crate::domain::{
    Email, Error, ImageUpload, NewPassword, PersonName, ToggleOp, UserId, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{
    RegisteredUserResponse, SubscriptionResponse, UserResponse, toggled_response,
};
use crate::inbound::http::paging::{PageEnvelope, PageParams, envelope};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    image_error, login_validation_error, missing_field_error, user_id_from_path,
    user_validation_error,
};

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "cook@example.org")]
    pub email: String,
    #[schema(example = "cook")]
    pub username: String,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Cook")]
    pub last_name: String,
    #[schema(example = "s3cret!!")]
    pub password: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::new(&value.email).map_err(user_validation_error)?,
            username: Username::new(value.username).map_err(user_validation_error)?,
            first_name: PersonName::new(value.first_name, "first_name")
                .map_err(user_validation_error)?,
            last_name: PersonName::new(value.last_name, "last_name")
                .map_err(user_validation_error)?,
            password: NewPassword::new(&value.password)
                .map_err(|err| login_validation_error(err, "password"))?,
        })
    }
}

/// Password change request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

/// Avatar upload body; `avatar` is a base64 image data URL.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AvatarRequest {
    #[schema(example = "data:image/png;base64,iVBORw0KGgo=")]
    pub avatar: Option<String>,
}

/// Avatar URL after an upload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AvatarResponse {
    #[schema(example = "/media/users/3f2a.png")]
    pub avatar: String,
}

/// Size of the recipe preview attached to each followed author.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipesLimitParams {
    pub recipes_limit: Option<u32>,
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/users/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisteredUserResponse),
        (status = 400, description = "Invalid or duplicate data", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users/")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let user = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(RegisteredUserResponse::from(user)))
}

/// List users, newest accounts last.
#[utoipa::path(
    get,
    path = "/api/users/",
    params(PageParams),
    responses(
        (status = 200, description = "Users", body = PageEnvelope<UserResponse>),
        (status = 400, description = "Invalid pagination", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users/")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<PageParams>,
    req: HttpRequest,
) -> ApiResult<web::Json<PageEnvelope<UserResponse>>> {
    let request = params.to_request()?;
    let page = state.users.list_users(session.user_id()?, request).await?;
    let body = envelope(page, request, &req, &state.links, |profile| {
        UserResponse::from_profile(profile, &state.links)
    })?;
    Ok(web::Json(body))
}

/// Profile of the logged-in user.
#[utoipa::path(
    get,
    path = "/api/users/me/",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me/")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let me = session.require_user_id()?;
    let profile = state.users.profile(Some(me), me).await?;
    Ok(web::Json(UserResponse::from_profile(profile, &state.links)))
}

/// Public profile of any user.
#[utoipa::path(
    get,
    path = "/api/users/{id}/",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{id}/")]
pub async fn user_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = user_id_from_path(path.into_inner())?;
    let profile = state.users.profile(session.user_id()?, id).await?;
    Ok(web::Json(UserResponse::from_profile(profile, &state.links)))
}

/// Change the password of the logged-in user.
#[utoipa::path(
    post,
    path = "/api/users/set_password/",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new one", body = Error),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["users"],
    operation_id = "setPassword"
)]
#[post("/users/set_password/")]
pub async fn set_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let SetPasswordRequest {
        new_password,
        current_password,
    } = payload.into_inner();
    let new_password = NewPassword::new(&new_password)
        .map_err(|err| login_validation_error(err, "new_password"))?;
    state
        .accounts
        .set_password(me, current_password, new_password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Upload or replace the avatar of the logged-in user.
#[utoipa::path(
    put,
    path = "/api/users/me/avatar/",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar stored", body = AvatarResponse),
        (status = 400, description = "Missing or malformed image", body = Error),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["users"],
    operation_id = "setAvatar"
)]
#[put("/users/me/avatar/")]
pub async fn set_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<web::Json<AvatarResponse>> {
    let me = session.require_user_id()?;
    let raw = payload
        .into_inner()
        .avatar
        .ok_or_else(|| missing_field_error("avatar"))?;
    let upload = ImageUpload::from_data_url(&raw).map_err(|err| image_error("avatar", err))?;
    let path = state.accounts.set_avatar(me, upload).await?;
    Ok(web::Json(AvatarResponse {
        avatar: state.links.media_url(&path),
    }))
}

/// Remove the avatar of the logged-in user.
#[utoipa::path(
    delete,
    path = "/api/users/me/avatar/",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["users"],
    operation_id = "clearAvatar"
)]
#[delete("/users/me/avatar/")]
pub async fn clear_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    state.accounts.clear_avatar(me).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Authors the logged-in user follows, with recipe previews.
#[utoipa::path(
    get,
    path = "/api/users/subscriptions/",
    params(PageParams, RecipesLimitParams),
    responses(
        (status = 200, description = "Followed authors", body = PageEnvelope<SubscriptionResponse>),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["users"],
    operation_id = "listSubscriptions"
)]
#[get("/users/subscriptions/")]
pub async fn subscriptions(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<PageParams>,
    limit: web::Query<RecipesLimitParams>,
    req: HttpRequest,
) -> ApiResult<web::Json<PageEnvelope<SubscriptionResponse>>> {
    let me = session.require_user_id()?;
    let request = params.to_request()?;
    let page = state
        .subscriptions_query
        .subscriptions(me, request, limit.recipes_limit)
        .await?;
    let body = envelope(page, request, &req, &state.links, |subscription| {
        SubscriptionResponse::new(subscription, &state.links)
    })?;
    Ok(web::Json(body))
}

async fn toggle_subscription(
    state: &HttpState,
    session: &SessionContext,
    op: ToggleOp,
    author: i64,
    recipes_limit: Option<u32>,
) -> ApiResult<HttpResponse> {
    let me: UserId = session.require_user_id()?;
    let author = user_id_from_path(author)?;
    let toggled = state
        .subscriptions
        .toggle(op, me, author, recipes_limit)
        .await?;
    Ok(toggled_response(toggled, |subscription| {
        SubscriptionResponse::new(subscription, &state.links)
    }))
}

/// Follow an author.
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe/",
    params(("id" = i64, Path, description = "Author id"), RecipesLimitParams),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Already subscribed or self-subscription", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown author", body = Error)
    ),
    tags = ["users"],
    operation_id = "subscribe"
)]
#[post("/users/{id}/subscribe/")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    limit: web::Query<RecipesLimitParams>,
) -> ApiResult<HttpResponse> {
    toggle_subscription(
        &state,
        &session,
        ToggleOp::Add,
        path.into_inner(),
        limit.recipes_limit,
    )
    .await
}

/// Stop following an author.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe/",
    params(("id" = i64, Path, description = "Author id")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not subscribed", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown author", body = Error)
    ),
    tags = ["users"],
    operation_id = "unsubscribe"
)]
#[delete("/users/{id}/subscribe/")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    toggle_subscription(&state, &session, ToggleOp::Remove, path.into_inner(), None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{PNG_DATA_URL, TEST_PASSWORD, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(json!({"email": "bad", "username": "cook", "first_name": "A", "last_name": "B", "password": "password1"}), "email")]
    #[case(json!({"email": "c@example.org", "username": "me", "first_name": "A", "last_name": "B", "password": "password1"}), "username")]
    #[case(json!({"email": "c@example.org", "username": "cook", "first_name": "", "last_name": "B", "password": "password1"}), "first_name")]
    #[case(json!({"email": "c@example.org", "username": "cook", "first_name": "A", "last_name": "B", "password": "short"}), "password")]
    #[actix_web::test]
    async fn registration_rejects_invalid_fields(#[case] body: Value, #[case] field: &str) {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/users/")
                .set_json(body)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn duplicate_email_is_rejected() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/users/")
                .set_json(json!({
                    "email": "ada@example.org",
                    "username": "other",
                    "first_name": "A",
                    "last_name": "B",
                    "password": TEST_PASSWORD,
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "email");
    }

    #[actix_web::test]
    async fn me_requires_a_session() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/users/me/").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn user_list_is_paginated() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        for name in ["ada", "bob", "cat"] {
            ctx.register(&app, name).await;
        }

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/users/?limit=2")
                .insert_header(("Host", "localhost"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["results"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["next"], "http://localhost/api/users/?limit=2&offset=2");
        assert_eq!(body["results"][0]["is_subscribed"], false);
    }

    #[actix_web::test]
    async fn unknown_user_is_not_found() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/users/99/").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn password_change_needs_current_password() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;
        let cookie = ctx.login(&app, "ada").await;

        let wrong = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/users/set_password/")
                .cookie(cookie.clone())
                .set_json(json!({"new_password": "another-pass", "current_password": "nope"}))
                .to_request(),
        )
        .await;
        assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);

        let ok = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/users/set_password/")
                .cookie(cookie)
                .set_json(json!({"new_password": "another-pass", "current_password": TEST_PASSWORD}))
                .to_request(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn avatar_upload_then_removal() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;
        let cookie = ctx.login(&app, "ada").await;

        let missing = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/api/users/me/avatar/")
                .cookie(cookie.clone())
                .set_json(json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let uploaded = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/api/users/me/avatar/")
                .cookie(cookie.clone())
                .set_json(json!({"avatar": PNG_DATA_URL}))
                .to_request(),
        )
        .await;
        assert_eq!(uploaded.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(uploaded).await;
        let avatar = body["avatar"].as_str().expect("avatar url");
        assert!(avatar.starts_with("/media/users/"), "{avatar}");
        assert!(avatar.ends_with(".png"), "{avatar}");

        let cleared = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri("/api/users/me/avatar/")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(cleared.status(), StatusCode::NO_CONTENT);

        let me: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/users/me/")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert!(me["avatar"].is_null());
    }

    #[actix_web::test]
    async fn subscribe_lifecycle() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        ctx.register(&app, "ada").await;
        let author = ctx.register(&app, "bob").await;
        let bob = ctx.login(&app, "bob").await;
        ctx.create_recipe(&app, &bob, "Porridge").await;
        ctx.create_recipe(&app, &bob, "Toast").await;
        let ada = ctx.login(&app, "ada").await;
        let uri = format!("/api/users/{author}/subscribe/?recipes_limit=1");

        let added = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&uri)
                .cookie(ada.clone())
                .to_request(),
        )
        .await;
        assert_eq!(added.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(added).await;
        assert_eq!(body["is_subscribed"], true);
        assert_eq!(body["recipes_count"], 2);
        assert_eq!(body["recipes"].as_array().map(Vec::len), Some(1));

        let again = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&uri)
                .cookie(ada.clone())
                .to_request(),
        )
        .await;
        assert_eq!(again.status(), StatusCode::BAD_REQUEST);

        let listed: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/users/subscriptions/")
                .cookie(ada.clone())
                .to_request(),
        )
        .await;
        assert_eq!(listed["count"], 1);
        assert_eq!(listed["results"][0]["username"], "bob");

        let removed = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/users/{author}/subscribe/"))
                .cookie(ada.clone())
                .to_request(),
        )
        .await;
        assert_eq!(removed.status(), StatusCode::NO_CONTENT);

        let missing = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/users/{author}/subscribe/"))
                .cookie(ada)
                .to_request(),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn self_subscription_is_rejected() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(ctx.app()).await;
        let me = ctx.register(&app, "ada").await;
        let cookie = ctx.login(&app, "ada").await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/users/{me}/subscribe/"))
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
