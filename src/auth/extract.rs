//! Extractors that turn the resolver's bound identity into handler arguments.
//!
//! The resolver never rejects a request; these extractors are the
//! authorization stage that does. A route opts into protection by taking
//! [`Identity`] (or [`AdminOnly`]); public routes take nothing.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::types::AuthenticatedUser;
use crate::db::UserRole;

/// Rejection for protected routes.
#[derive(Debug)]
pub enum AuthError {
    Unauthenticated,
    Forbidden,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient permissions"),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Requires an authenticated identity; rejects with 401 otherwise.
pub struct Identity(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Identity)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Requires an authenticated admin; 401 when unauthenticated, 403 otherwise.
pub struct AdminOnly(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Identity(user) = Identity::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(AuthError::Forbidden);
        }
        Ok(AdminOnly(user))
    }
}
