use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct BoardStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Board {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

impl BoardStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new board post. Returns the board ID.
    pub async fn create(&self, title: &str, content: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO boards (title, content) VALUES (?, ?)")
            .bind(title)
            .bind(content)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a board by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Board>, sqlx::Error> {
        let row: Option<Board> =
            sqlx::query_as("SELECT id, title, content, created_at FROM boards WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    /// List one page of boards, newest first.
    pub async fn list_page(&self, page: i64, size: i64) -> Result<Vec<Board>, sqlx::Error> {
        let rows: Vec<Board> = sqlx::query_as(
            "SELECT id, title, content, created_at FROM boards
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Total number of boards, for pagination metadata.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM boards")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Delete a board by ID. Comments go with it via the foreign key.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
