//! Test helpers for inbound HTTP components.
//!
//! [`TestContext`] wires the real domain services over the in-memory store
//! and a temporary media root, so handler tests exercise the full stack
//! without PostgreSQL.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::domain::{Ingredient, Tag};
use crate::inbound::http::configure;
use crate::inbound::http::links::PublicLinks;
use crate::inbound::http::state::{HttpState, Repositories};
use crate::outbound::media::FilesystemMediaStore;
use crate::outbound::memory::InMemoryStore;

/// Bare PNG signature; the media store does not decode images.
pub const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

/// Password used by [`TestContext::register`].
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by a response, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// In-memory application state plus the temporary media root backing it.
pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub state: web::Data<HttpState>,
    pub media_root: TempDir,
    key: Key,
}

impl TestContext {
    /// Fresh state seeded with two tags and two ingredients.
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let media_root = tempfile::tempdir().expect("media tempdir");
        let media = FilesystemMediaStore::open(media_root.path()).expect("media store");
        let ports = Repositories {
            users: store.clone(),
            subscriptions: store.clone(),
            recipes: store.clone(),
            relations: store.clone(),
            reference_data: store.clone(),
            media: Arc::new(media),
        }
        .into_ports();
        let ctx = Self {
            store,
            state: web::Data::new(HttpState::new(ports, PublicLinks::default())),
            media_root,
            key: Key::generate(),
        };
        ctx.seed_tag("Breakfast", "breakfast");
        ctx.seed_tag("Dinner", "dinner");
        ctx.seed_ingredient("sugar", "g");
        ctx.seed_ingredient("flour", "g");
        ctx
    }

    pub fn seed_tag(&self, name: &str, slug: &str) -> Tag {
        self.store.seed_tag(name, slug).expect("seed tag")
    }

    pub fn seed_ingredient(&self, name: &str, unit: &str) -> Ingredient {
        self.store
            .seed_ingredient(name, unit)
            .expect("seed ingredient")
    }

    /// Every route behind a session middleware sharing one key, so cookies
    /// survive across calls to the same service. The app owns clones of the
    /// state, so it does not borrow the context.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        App::new()
            .app_data(self.state.clone())
            .wrap(session)
            .configure(configure)
    }

    /// Register `<name>@example.org` with [`TEST_PASSWORD`], returning the id.
    pub async fn register<S, B>(&self, app: &S, name: &str) -> i64
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/users/")
                .set_json(json!({
                    "email": format!("{name}@example.org"),
                    "username": name,
                    "first_name": "Ada",
                    "last_name": "Cook",
                    "password": TEST_PASSWORD,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), 201, "registration of {name} failed");
        let body: Value = test::read_body_json(res).await;
        body["id"].as_i64().expect("registered id")
    }

    /// Log `<name>@example.org` in and return the session cookie.
    pub async fn login<S, B>(&self, app: &S, name: &str) -> Cookie<'static>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/auth/login/")
                .set_json(json!({
                    "email": format!("{name}@example.org"),
                    "password": TEST_PASSWORD,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), 204, "login of {name} failed");
        session_cookie(&res).expect("session cookie")
    }

    /// Publish a recipe tagged `breakfast` with 100 g of sugar.
    pub async fn create_recipe<S, B>(&self, app: &S, cookie: &Cookie<'static>, name: &str) -> i64
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/recipes/")
                .cookie(cookie.clone())
                .set_json(json!({
                    "name": name,
                    "text": "Stir and wait.",
                    "cooking_time": 10,
                    "image": PNG_DATA_URL,
                    "tags": [1],
                    "ingredients": [{"id": 1, "amount": 100}],
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), 201, "recipe creation failed");
        let body: Value = test::read_body_json(res).await;
        body["id"].as_i64().expect("recipe id")
    }
}
