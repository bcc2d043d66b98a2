//! Board API.
//!
//! Reads are public; creating a board requires an authenticated identity and
//! removing one requires an admin.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt};
use crate::auth::{AdminOnly, Identity};
use crate::db::{Board, Database};

#[derive(Clone)]
pub struct BoardsState {
    pub db: Database,
}

pub fn router(state: BoardsState) -> Router {
    Router::new()
        .route("/", get(list_boards))
        .route("/", post(create_board))
        .route("/{id}", get(get_board))
        .route("/{id}", delete(delete_board))
        .with_state(state)
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: i64,
    #[serde(default = "default_page_size")]
    size: i64,
}

fn default_page_size() -> i64 {
    10
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BoardResponse {
    id: i64,
    title: String,
    content: String,
    created_at: String,
}

impl From<Board> for BoardResponse {
    fn from(board: Board) -> Self {
        Self {
            id: board.id,
            title: board.title,
            content: board.content,
            created_at: board.created_at,
        }
    }
}

#[derive(Serialize)]
struct BoardListResponse {
    items: Vec<BoardResponse>,
    total: i64,
    page: i64,
    size: i64,
}

#[derive(Deserialize)]
struct CreateBoardRequest {
    title: String,
    #[serde(default)]
    content: String,
}

async fn list_boards(
    State(state): State<BoardsState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(0);
    let size = query.size.clamp(1, 100);

    let items = state
        .db
        .boards()
        .list_page(page, size)
        .await
        .db_err("Failed to list boards")?;
    let total = state
        .db
        .boards()
        .count()
        .await
        .db_err("Failed to count boards")?;

    Ok(Json(BoardListResponse {
        items: items.into_iter().map(BoardResponse::from).collect(),
        total,
        page,
        size,
    }))
}

async fn get_board(
    State(state): State<BoardsState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let board = state
        .db
        .boards()
        .get_by_id(id)
        .await
        .db_err("Failed to get board")?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    Ok(Json(BoardResponse::from(board)))
}

async fn create_board(
    State(state): State<BoardsState>,
    Identity(user): Identity,
    Json(payload): Json<CreateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }

    tracing::debug!(writer = %user.email, "creating board");

    let id = state
        .db
        .boards()
        .create(title, &payload.content)
        .await
        .db_err("Failed to create board")?;

    let board = state
        .db
        .boards()
        .get_by_id(id)
        .await
        .db_err("Failed to get board")?
        .ok_or_else(|| ApiError::internal("Board vanished after insert"))?;

    Ok((StatusCode::CREATED, Json(BoardResponse::from(board))))
}

/// Remove a board. Moderation action: admin only. Comments on the board are
/// removed with it by the foreign key cascade.
async fn delete_board(
    State(state): State<BoardsState>,
    AdminOnly(admin): AdminOnly,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .db
        .boards()
        .delete(id)
        .await
        .db_err("Failed to delete board")?;

    if !deleted {
        return Err(ApiError::not_found("Board not found"));
    }

    tracing::info!(board = id, admin = %admin.email, "board deleted");
    Ok(StatusCode::NO_CONTENT)
}
