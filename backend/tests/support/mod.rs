//! Shared harness for HTTP integration tests.
//!
//! [`Backend`] wires the real services over the in-memory store and a
//! temporary media root. Each request initialises a fresh app over the same
//! state and session key, so cookies and stored data persist across calls.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::http::header::HeaderMap;
use actix_web::web::Bytes;
use actix_web::{App, test, web};
use foodgram::Trace;
use foodgram::inbound::http::configure;
use foodgram::inbound::http::links::PublicLinks;
use foodgram::inbound::http::state::{HttpState, Repositories};
use foodgram::outbound::media::FilesystemMediaStore;
use foodgram::outbound::memory::InMemoryStore;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Minimal PNG signature accepted by the image decoder.
pub const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgo=";
pub const PASSWORD: &str = "correct-horse-battery";

/// Status, headers, cookies and body of one response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub cookies: Vec<Cookie<'static>>,
    pub body: Bytes,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("UTF-8 body")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn session_cookie(&self) -> Option<Cookie<'static>> {
        self.cookies
            .iter()
            .find(|cookie| cookie.name() == "session")
            .cloned()
    }
}

/// In-memory backend seeded with a `breakfast` tag, sugar and flour.
pub struct Backend {
    state: web::Data<HttpState>,
    key: Key,
    _media_root: TempDir,
}

impl Backend {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        store.seed_tag("Breakfast", "breakfast").expect("seed tag");
        store.seed_ingredient("sugar", "g").expect("seed sugar");
        store.seed_ingredient("flour", "g").expect("seed flour");
        let media_root = tempfile::tempdir().expect("media tempdir");
        let media = FilesystemMediaStore::open(media_root.path()).expect("media store");
        let ports = Repositories {
            users: store.clone(),
            subscriptions: store.clone(),
            recipes: store.clone(),
            relations: store.clone(),
            reference_data: store,
            media: Arc::new(media),
        }
        .into_ports();
        Self {
            state: web::Data::new(HttpState::new(ports, PublicLinks::default())),
            key: Key::generate(),
            _media_root: media_root,
        }
    }

    /// Dispatch one request through the full middleware stack.
    pub async fn send(&self, request: test::TestRequest) -> Reply {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        let app = test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(session)
                .wrap(Trace)
                .configure(configure),
        )
        .await;
        let res = test::call_service(&app, request.to_request()).await;
        let status = res.status();
        let headers = res.headers().clone();
        let cookies = res
            .response()
            .cookies()
            .map(Cookie::into_owned)
            .collect();
        let body = test::read_body(res).await;
        Reply {
            status,
            headers,
            cookies,
            body,
        }
    }

    /// Register and log in `<name>@example.org`, returning the id and cookie.
    pub async fn sign_up(&self, name: &str) -> (i64, Cookie<'static>) {
        let registered = self
            .send(test::TestRequest::post().uri("/api/users/").set_json(json!({
                "email": format!("{name}@example.org"),
                "username": name,
                "first_name": "Test",
                "last_name": "Cook",
                "password": PASSWORD,
            })))
            .await;
        assert_eq!(registered.status, StatusCode::CREATED, "register {name}");
        let id = registered.json()["id"].as_i64().expect("user id");

        let login = self
            .send(
                test::TestRequest::post()
                    .uri("/api/auth/login/")
                    .set_json(json!({
                        "email": format!("{name}@example.org"),
                        "password": PASSWORD,
                    })),
            )
            .await;
        assert_eq!(login.status, StatusCode::NO_CONTENT, "login {name}");
        (id, login.session_cookie().expect("session cookie"))
    }

    /// Publish a recipe with `grams` of sugar as the cookie's owner.
    pub async fn publish_recipe(&self, cookie: &Cookie<'static>, name: &str, grams: u32) -> i64 {
        let reply = self
            .send(
                test::TestRequest::post()
                    .uri("/api/recipes/")
                    .cookie(cookie.clone())
                    .set_json(json!({
                        "name": name,
                        "text": "Mix everything.",
                        "cooking_time": 15,
                        "image": PNG_DATA_URL,
                        "tags": [1],
                        "ingredients": [{"id": 1, "amount": grams}],
                    })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "publish {name}");
        reply.json()["id"].as_i64().expect("recipe id")
    }
}
