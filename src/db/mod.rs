mod board;
mod comment;
mod user;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use board::{Board, BoardStore};
pub use comment::{Comment, CommentStore};
pub use user::{User, UserRole, UserStore};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path.
    /// Use ":memory:" for an in-memory database.
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", path)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get the current schema version.
    async fn get_version(&self) -> Result<i32, sqlx::Error> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.map(|r| r.0).unwrap_or(0))
    }

    /// Set the schema version within a transaction.
    async fn set_version(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        version: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut **tx)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Run database migrations.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await?;

        let version = self.get_version().await?;

        if version < 1 {
            self.migrate_v1().await?;
        }

        Ok(())
    }

    /// Execute a list of queries in a transaction, then set the version.
    async fn run_migration(
        &self,
        version: i32,
        queries: &[&'static str],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for query in queries {
            sqlx::query(*query).execute(&mut *tx).await?;
        }
        Self::set_version(&mut tx, version).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn migrate_v1(&self) -> Result<(), sqlx::Error> {
        self.run_migration(
            1,
            &[
                // Users table
                "CREATE TABLE users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    name TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    role TEXT NOT NULL DEFAULT 'user',
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_users_email ON users(email)",
                // Boards table
                "CREATE TABLE boards (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL DEFAULT '',
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_boards_created_at ON boards(created_at)",
                // Comments table
                "CREATE TABLE comments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    content TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_comments_board_id ON comments(board_id)",
                "CREATE INDEX idx_comments_user_id ON comments(user_id)",
            ],
        )
        .await
    }

    /// Get the user store.
    pub fn users(&self) -> UserStore {
        UserStore::new(self.pool.clone())
    }

    /// Get the board store.
    pub fn boards(&self) -> BoardStore {
        BoardStore::new(self.pool.clone())
    }

    /// Get the comment store.
    pub fn comments(&self) -> CommentStore {
        CommentStore::new(self.pool.clone())
    }

    /// Get the underlying connection pool (for tests that need raw SQL access).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db
            .users()
            .create("alice@example.com", "Alice", "hash")
            .await
            .unwrap();

        let user = db
            .users()
            .get_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name, "Alice");
        assert_eq!(user.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_duplicate_email_fails() {
        let db = Database::open(":memory:").await.unwrap();

        db.users()
            .create("alice@example.com", "Alice", "hash")
            .await
            .unwrap();
        let result = db.users().create("alice@example.com", "Alys", "hash2").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = Database::open(":memory:").await.unwrap();

        let id = db
            .users()
            .create("alice@example.com", "Alice", "hash")
            .await
            .unwrap();
        assert!(db.users().delete(id).await.unwrap());

        assert!(
            db.users()
                .get_by_email("alice@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_board_pagination_newest_first() {
        let db = Database::open(":memory:").await.unwrap();

        for i in 0..5 {
            db.boards()
                .create(&format!("title {}", i), "content")
                .await
                .unwrap();
        }

        assert_eq!(db.boards().count().await.unwrap(), 5);

        let page = db.boards().list_page(0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        // Same-second timestamps fall back to id order, newest first.
        assert!(page[0].id > page[1].id);

        let beyond = db.boards().list_page(10, 2).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn test_comment_lifecycle() {
        let db = Database::open(":memory:").await.unwrap();

        let user_id = db
            .users()
            .create("alice@example.com", "Alice", "hash")
            .await
            .unwrap();
        let board_id = db.boards().create("title", "content").await.unwrap();

        let comment_id = db
            .comments()
            .create(board_id, user_id, "first!")
            .await
            .unwrap();

        let comments = db.comments().list_by_board(board_id).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "first!");
        assert_eq!(comments[0].writer_email, "alice@example.com");

        assert!(
            db.comments()
                .update_content(comment_id, "edited")
                .await
                .unwrap()
        );
        let comment = db.comments().get_by_id(comment_id).await.unwrap().unwrap();
        assert_eq!(comment.content, "edited");

        assert!(db.comments().delete(comment_id).await.unwrap());
        assert!(db.comments().get_by_id(comment_id).await.unwrap().is_none());
    }
}
