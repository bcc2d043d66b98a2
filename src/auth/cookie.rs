//! Refresh-token cookie parsing and building.
//!
//! The refresh token travels in an HTTP-only cookie scoped to `/auth` so that
//! browser scripts never see it and it is only sent to the auth endpoints.

use axum::http::{HeaderMap, header};

/// Cookie name for the refresh token (long-lived renewal credential).
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Header carrying the renewal credential for non-browser clients.
pub const REFRESH_TOKEN_HEADER: &str = "refresh-token";

/// Response header carrying a silently renewed access token.
pub const NEW_ACCESS_TOKEN_HEADER: &str = "new-access-token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Build the Set-Cookie value that installs a refresh token.
pub fn refresh_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/auth; Max-Age={}{}",
        REFRESH_COOKIE_NAME, token, max_age_secs, secure
    )
}

/// Build the Set-Cookie value that clears the refresh token. The already
/// issued token itself stays cryptographically valid until it expires;
/// clearing the cookie only removes it from the browser.
pub fn clear_refresh_cookie(secure: bool) -> String {
    refresh_cookie("", 0, secure)
}
