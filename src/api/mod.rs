mod auth;
mod boards;
mod comments;
mod error;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;

pub use auth::AuthApiState;

/// Create the `/api` router: boards and comments.
pub fn create_api_router(db: Database) -> Router {
    let boards_state = boards::BoardsState { db: db.clone() };
    let comments_state = comments::CommentsState { db };

    Router::new()
        .nest("/boards", boards::router(boards_state))
        .nest("/comments", comments::router(comments_state))
}

/// Create the `/auth` router: signup, login, refresh, logout, me.
pub fn create_auth_router(db: Database, jwt: Arc<JwtConfig>, secure_cookies: bool) -> Router {
    auth::router(AuthApiState {
        db,
        jwt,
        secure_cookies,
    })
}
