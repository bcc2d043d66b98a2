//! Comment API.
//!
//! Reading comments is public; writing requires an authenticated identity,
//! and only the writer (or an admin) may edit or delete a comment.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt};
use crate::auth::{AuthenticatedUser, Identity};
use crate::db::{Comment, Database, UserRole};

#[derive(Clone)]
pub struct CommentsState {
    pub db: Database,
}

pub fn router(state: CommentsState) -> Router {
    Router::new()
        .route("/", get(list_comments))
        .route("/", post(create_comment))
        .route("/{id}", patch(update_comment))
        .route("/{id}", delete(delete_comment))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    board_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentResponse {
    id: i64,
    board_id: i64,
    content: String,
    created_at: String,
    updated_at: String,
    writer_name: String,
    writer_email: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            board_id: comment.board_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            writer_name: comment.writer_name,
            writer_email: comment.writer_email,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentRequest {
    board_id: i64,
    content: String,
}

#[derive(Deserialize)]
struct UpdateCommentRequest {
    content: String,
}

async fn list_comments(
    State(state): State<CommentsState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state
        .db
        .comments()
        .list_by_board(query.board_id)
        .await
        .db_err("Failed to list comments")?;

    let response: Vec<CommentResponse> =
        comments.into_iter().map(CommentResponse::from).collect();
    Ok(Json(response))
}

async fn create_comment(
    State(state): State<CommentsState>,
    Identity(user): Identity,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Comment cannot be empty"));
    }

    state
        .db
        .boards()
        .get_by_id(payload.board_id)
        .await
        .db_err("Failed to get board")?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    // The identity carries the email; the store needs the row ID.
    let writer = state
        .db
        .users()
        .get_by_email(&user.email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let id = state
        .db
        .comments()
        .create(payload.board_id, writer.id, content)
        .await
        .db_err("Failed to create comment")?;

    let comment = state
        .db
        .comments()
        .get_by_id(id)
        .await
        .db_err("Failed to get comment")?
        .ok_or_else(|| ApiError::internal("Comment vanished after insert"))?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

async fn update_comment(
    State(state): State<CommentsState>,
    Identity(user): Identity,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Comment cannot be empty"));
    }

    let comment = fetch_owned(&state, id, &user).await?;

    state
        .db
        .comments()
        .update_content(comment.id, content)
        .await
        .db_err("Failed to update comment")?;

    let updated = state
        .db
        .comments()
        .get_by_id(comment.id)
        .await
        .db_err("Failed to get comment")?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(Json(CommentResponse::from(updated)))
}

async fn delete_comment(
    State(state): State<CommentsState>,
    Identity(user): Identity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = fetch_owned(&state, id, &user).await?;

    state
        .db
        .comments()
        .delete(comment.id)
        .await
        .db_err("Failed to delete comment")?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a comment and check the caller may modify it: the writer themselves
/// or an admin.
async fn fetch_owned(
    state: &CommentsState,
    id: i64,
    user: &AuthenticatedUser,
) -> Result<Comment, ApiError> {
    let comment = state
        .db
        .comments()
        .get_by_id(id)
        .await
        .db_err("Failed to get comment")?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    if comment.writer_email != user.email && user.role != UserRole::Admin {
        return Err(ApiError::forbidden("You can only modify your own comments"));
    }

    Ok(comment)
}
