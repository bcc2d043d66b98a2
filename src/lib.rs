pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod password;

use api::{create_api_router, create_auth_router};
use auth::{AuthState, resolve_identity};
use axum::{Json, Router, middleware, routing::get};
use db::Database;
use jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Shared secret for signing both token classes
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime (short: the per-request credential)
    pub access_lifetime: Duration,
    /// Refresh token lifetime (long: must exceed the access lifetime)
    pub refresh_lifetime: Duration,
    /// Whether to set Secure flag on cookies (true in production with HTTPS)
    pub secure_cookies: bool,
}

/// Create the application router with the given configuration.
/// Fails when the token lifetimes are misconfigured.
pub fn create_app(config: &ServerConfig) -> Result<Router, JwtError> {
    let jwt = Arc::new(JwtConfig::new(
        &config.jwt_secret,
        config.access_lifetime,
        config.refresh_lifetime,
    )?);

    let auth_state = AuthState {
        db: config.db.clone(),
        jwt: jwt.clone(),
    };

    let app = Router::new()
        .route("/health", get(health))
        .nest(
            "/auth",
            create_auth_router(config.db.clone(), jwt, config.secure_cookies),
        )
        .nest("/api", create_api_router(config.db.clone()))
        // The resolver runs on every request; routes decide via extractors
        // whether a missing identity matters.
        .layer(middleware::from_fn_with_state(auth_state, resolve_identity));

    Ok(app)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run the server on the given listener. This function blocks until the
/// server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config).map_err(std::io::Error::other)?;
    axum::serve(listener, app).await
}
