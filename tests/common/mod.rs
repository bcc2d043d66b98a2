#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use clubboard::db::Database;
use clubboard::jwt::JwtConfig;
use clubboard::{ServerConfig, create_app, password};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789";
pub const ACCESS_LIFETIME: Duration = Duration::from_secs(60 * 60 * 3);
pub const REFRESH_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// A fully wired app over an in-memory database, plus a codec built from the
/// same secret so tests can mint and inspect tokens directly.
pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

pub async fn setup() -> TestApp {
    let db = Database::open(":memory:").await.expect("open database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_SECRET.to_vec(),
        access_lifetime: ACCESS_LIFETIME,
        refresh_lifetime: REFRESH_LIFETIME,
        secure_cookies: false,
    };
    let app = create_app(&config).expect("create app");
    let jwt = Arc::new(
        JwtConfig::new(TEST_SECRET, ACCESS_LIFETIME, REFRESH_LIFETIME).expect("jwt config"),
    );

    TestApp { app, db, jwt }
}

impl TestApp {
    /// Insert a user directly, returning the row ID.
    pub async fn seed_user(&self, email: &str, name: &str, plain_password: &str) -> i64 {
        let hash = password::hash_password(plain_password).expect("hash password");
        self.db
            .users()
            .create(email, name, &hash)
            .await
            .expect("seed user")
    }

    /// Send a request through a clone of the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.expect("send request")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(req(axum::http::Method::GET, uri).body(Body::empty()).unwrap())
            .await
    }
}

pub fn req(method: axum::http::Method, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}

/// A request builder with the JSON content type preset.
pub fn json_req(method: axum::http::Method, uri: &str) -> axum::http::request::Builder {
    req(method, uri).header(header::CONTENT_TYPE, "application/json")
}

pub fn json_body(body: &serde_json::Value) -> Body {
    Body::from(serde_json::to_vec(body).expect("serialize body"))
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse body as JSON")
}

/// Extract the value of a named cookie from a response's Set-Cookie headers.
pub fn set_cookie<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    for value in response.headers().get_all(header::SET_COOKIE) {
        let value = value.to_str().ok()?;
        let pair = value.split(';').next()?.trim();
        if let Some((key, token)) = pair.split_once('=') {
            if key == name {
                return Some(token);
            }
        }
    }
    None
}

/// Full Set-Cookie header line for a named cookie.
pub fn set_cookie_line<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    for value in response.headers().get_all(header::SET_COOKIE) {
        let value = value.to_str().ok()?;
        if value.trim_start().starts_with(&format!("{}=", name)) {
            return Some(value);
        }
    }
    None
}
