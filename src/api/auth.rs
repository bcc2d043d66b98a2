//! Auth endpoints: signup, login, refresh, logout, me.
//!
//! Thin orchestrators over the token codec and the user store. Login and
//! refresh are the only places that surface explicit auth error messages,
//! and both keep the wording generic so callers cannot probe which part of
//! a credential was wrong.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::error::{ApiError, ResultExt};
use crate::auth::{
    Identity, REFRESH_COOKIE_NAME, REFRESH_TOKEN_HEADER, clear_refresh_cookie, get_cookie,
    refresh_cookie,
};
use crate::db::{Database, User, UserRole};
use crate::jwt::JwtConfig;
use crate::password;

#[derive(Clone)]
pub struct AuthApiState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
}

pub fn router(state: AuthApiState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(state)
}

#[derive(Deserialize)]
struct SignupRequest {
    email: String,
    name: String,
    password: String,
}

#[derive(Serialize)]
struct UserInfo {
    email: String,
    name: String,
    role: UserRole,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    user_info: UserInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

async fn signup(
    State(state): State<AuthApiState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim();
    let name = payload.name.trim();

    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if name.is_empty() {
        return Err(ApiError::bad_request("Name cannot be empty"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }

    let hash = password::hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::internal("Failed to create account")
    })?;

    match state.db.users().create(email, name, &hash).await {
        Ok(_) => Ok(StatusCode::CREATED),
        Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
            Err(ApiError::conflict("Email is already registered"))
        }
        Err(e) => Err(ApiError::db_error("Failed to create user", e)),
    }
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AuthApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Unknown email and wrong password share one message on purpose.
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = state
        .db
        .users()
        .get_by_email(payload.email.trim())
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(invalid)?;

    if !password::verify_password(&payload.password, &user.password_hash) {
        return Err(invalid());
    }

    let access_token = issue_access(&state.jwt, &user.email)?;
    let refresh_token = state.jwt.issue_refresh_token(&user.email).map_err(|e| {
        error!(error = %e, "Failed to issue refresh token");
        ApiError::internal("Failed to issue token")
    })?;

    let cookie = refresh_cookie(
        &refresh_token,
        state.jwt.refresh_lifetime().as_secs(),
        state.secure_cookies,
    );

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            access_token,
            user_info: UserInfo::from(&user),
        }),
    ))
}

/// Exchange a refresh token for a new access token. Same validation as the
/// resolver's silent-renewal path, but as an explicit endpoint.
async fn refresh(
    State(state): State<AuthApiState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .or_else(|| {
            headers
                .get(REFRESH_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
        })
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Refresh token is required"))?;

    let claims = state
        .jwt
        .verify(refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    // The subject must still resolve to a live account.
    state
        .db
        .users()
        .get_by_email(&claims.sub)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let access_token = issue_access(&state.jwt, &claims.sub)?;

    Ok((StatusCode::OK, Json(RefreshResponse { access_token })))
}

/// Clear the refresh cookie. Tokens are stateless, so an already issued
/// access or refresh token stays valid until its natural expiry; logout only
/// removes the browser's copy.
async fn logout(State(state): State<AuthApiState>) -> impl IntoResponse {
    let cookie = clear_refresh_cookie(state.secure_cookies);
    (
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(serde_json::json!({ "message": "Logged out" })),
    )
}

/// Return the identity the resolver bound to this request. Calling this with
/// only a refresh credential exercises silent renewal end to end: the
/// response then carries a `New-Access-Token` header.
async fn me(Identity(user): Identity) -> impl IntoResponse {
    Json(UserInfo {
        email: user.email,
        name: user.name,
        role: user.role,
    })
}

fn issue_access(jwt: &JwtConfig, email: &str) -> Result<String, ApiError> {
    jwt.issue_access_token(email).map_err(|e| {
        error!(error = %e, "Failed to issue access token");
        ApiError::internal("Failed to issue token")
    })
}
