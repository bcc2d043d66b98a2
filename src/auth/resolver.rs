//! Per-request authentication resolver.
//!
//! Runs once for every inbound request, before any handler. It inspects the
//! bearer and refresh credentials, binds an [`AuthenticatedUser`] to the
//! request when one can be established, and mints a replacement access token
//! as a side effect when renewal fires. It never rejects a request itself:
//! an unauthenticated request passes through and the route's extractor
//! decides the consequence.
//!
//! Priority rules, in order:
//! 1. A valid access token wins; no renewal is attempted.
//! 2. An expired access token falls back to the refresh credential.
//! 3. A malformed access token is a hard rejection, even when a valid
//!    refresh credential is present alongside it.
//! 4. With no access token at all, a valid refresh credential authenticates
//!    and a fresh access token is returned in the `New-Access-Token` header.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};

use super::cookie::{NEW_ACCESS_TOKEN_HEADER, REFRESH_COOKIE_NAME, REFRESH_TOKEN_HEADER, get_cookie};
use super::types::AuthenticatedUser;
use crate::db::Database;
use crate::jwt::{JwtConfig, VerifyError};

/// State shared by the resolver across requests: the read-only token config
/// and the pooled database handle. No per-request data lives here.
#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

/// Middleware entry point. Layer this over every route that can be called
/// with credentials, protected or not.
pub async fn resolve_identity(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = bearer_token(request.headers()).map(str::to_owned);
    let renewal = renewal_token(request.headers()).map(str::to_owned);

    let mut minted: Option<String> = None;

    let identity = match bearer {
        Some(token) => match state.jwt.verify(&token) {
            Ok(claims) => lookup_principal(&state.db, &claims.sub).await,
            Err(VerifyError::Expired(claims)) => {
                // Stale but authentic. Renewal needs the dedicated refresh
                // credential; the expired token itself is discarded here.
                tracing::debug!(subject = %claims.sub, "access token expired");
                match renewal {
                    Some(refresh) => renew(&state, &refresh, &mut minted).await,
                    None => None,
                }
            }
            Err(VerifyError::Malformed) => {
                // A present-but-invalid bearer credential ends authentication
                // outright; a refresh credential sent alongside is ignored.
                tracing::warn!("rejected malformed or forged access token");
                None
            }
        },
        None => match renewal {
            Some(refresh) => renew(&state, &refresh, &mut minted).await,
            None => None,
        },
    };

    if let Some(user) = identity {
        tracing::debug!(subject = %user.email, "request authenticated");
        request.extensions_mut().insert(user);
    }

    let mut response = next.run(request).await;

    if let Some(token) = minted {
        if let Ok(value) = HeaderValue::from_str(&token) {
            response.headers_mut().insert(NEW_ACCESS_TOKEN_HEADER, value);
        }
    }

    response
}

/// Extract the token from an `Authorization: Bearer ...` header. The scheme
/// keyword is case-insensitive. Returns the (possibly empty) remainder so a
/// present-but-garbled header is still treated as present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, rest) = value.split_at_checked(6)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(rest.trim())
}

/// Extract the renewal credential: the `Refresh-Token` header when present,
/// otherwise the `refreshToken` cookie.
fn renewal_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(REFRESH_TOKEN_HEADER) {
        if let Ok(token) = value.to_str() {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token);
            }
        }
    }
    get_cookie(headers, REFRESH_COOKIE_NAME).filter(|t| !t.is_empty())
}

/// Verify a refresh credential and mint a fresh access token for its subject.
/// Every failure degrades to an unauthenticated request, never an error.
async fn renew(
    state: &AuthState,
    refresh_token: &str,
    minted: &mut Option<String>,
) -> Option<AuthenticatedUser> {
    let claims = match state.jwt.verify(refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "refresh credential rejected");
            return None;
        }
    };

    let user = lookup_principal(&state.db, &claims.sub).await?;

    match state.jwt.issue_access_token(&user.email) {
        Ok(token) => {
            tracing::info!(subject = %user.email, "silently renewed access token");
            *minted = Some(token);
            Some(user)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to issue renewed access token");
            None
        }
    }
}

/// Resolve a token subject to a live principal. A missing user (deleted
/// account) or a lookup error both degrade to no identity.
async fn lookup_principal(db: &Database, email: &str) -> Option<AuthenticatedUser> {
    match db.users().get_by_email(email).await {
        Ok(Some(user)) => Some(AuthenticatedUser {
            email: user.email,
            name: user.name,
            role: user.role,
        }),
        Ok(None) => {
            tracing::warn!(subject = %email, "token subject no longer exists");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed during authentication");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_case_insensitive() {
        for scheme in ["Bearer", "bearer", "BEARER", "bEaReR"] {
            let headers = headers_with(header::AUTHORIZATION, &format!("{} tok123", scheme));
            assert_eq!(bearer_token(&headers), Some("tok123"));
        }
    }

    #[test]
    fn test_bearer_token_absent_for_other_schemes() {
        let headers = headers_with(header::AUTHORIZATION, "Basic dXNlcjpwdw==");
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_bare_bearer_counts_as_present() {
        // "Bearer" with nothing after it is a present-but-empty credential,
        // which downstream verification rejects as malformed.
        let headers = headers_with(header::AUTHORIZATION, "Bearer ");
        assert_eq!(bearer_token(&headers), Some(""));
    }

    #[test]
    fn test_renewal_header_beats_cookie() {
        let mut headers = headers_with(header::COOKIE, "refreshToken=from-cookie");
        headers.insert(
            REFRESH_TOKEN_HEADER,
            HeaderValue::from_static("from-header"),
        );
        assert_eq!(renewal_token(&headers), Some("from-header"));
    }

    #[test]
    fn test_renewal_falls_back_to_cookie() {
        let headers = headers_with(header::COOKIE, "refreshToken=from-cookie");
        assert_eq!(renewal_token(&headers), Some("from-cookie"));
        assert_eq!(renewal_token(&HeaderMap::new()), None);
    }
}
