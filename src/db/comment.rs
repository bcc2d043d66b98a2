use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct CommentStore {
    pool: SqlitePool,
}

/// A comment joined with its writer, the shape every read path wants.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub board_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub writer_email: String,
    pub writer_name: String,
}

const SELECT_COMMENT: &str = "SELECT c.id, c.board_id, c.user_id, c.content, c.created_at, c.updated_at,
            u.email AS writer_email, u.name AS writer_name
     FROM comments c JOIN users u ON u.id = c.user_id";

impl CommentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a comment on a board. Returns the comment ID.
    pub async fn create(
        &self,
        board_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO comments (board_id, user_id, content) VALUES (?, ?, ?)")
                .bind(board_id)
                .bind(user_id)
                .bind(content)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a comment by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>, sqlx::Error> {
        let row: Option<Comment> = sqlx::query_as(&format!("{} WHERE c.id = ?", SELECT_COMMENT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// List all comments on a board, oldest first.
    pub async fn list_by_board(&self, board_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
        let rows: Vec<Comment> = sqlx::query_as(&format!(
            "{} WHERE c.board_id = ? ORDER BY c.id ASC",
            SELECT_COMMENT
        ))
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Replace a comment's content and bump its update time.
    pub async fn update_content(&self, id: i64, content: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE comments SET content = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(content)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a comment by ID.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
