//! Request-scoped identity types.

use crate::db::UserRole;

/// The identity the resolver bound to the current request. Built fresh from a
/// user lookup on every request and discarded when the request ends; it is
/// never cached or shared across requests.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}
