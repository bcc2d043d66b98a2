//! Stateless JWT authentication.
//!
//! Dual-token scheme: short-lived access tokens presented as bearer
//! credentials, and a long-lived refresh token carried in an HTTP-only cookie
//! (or `Refresh-Token` header) that the resolver uses to silently mint a
//! replacement access token. No session state is stored anywhere; possession
//! of a currently valid token is the session.

mod cookie;
mod extract;
mod resolver;
mod types;

pub use cookie::{
    NEW_ACCESS_TOKEN_HEADER, REFRESH_COOKIE_NAME, REFRESH_TOKEN_HEADER, clear_refresh_cookie,
    get_cookie, refresh_cookie,
};
pub use extract::{AdminOnly, AuthError, Identity};
pub use resolver::{AuthState, resolve_identity};
pub use types::AuthenticatedUser;
