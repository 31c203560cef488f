//! Persistence with duplicate suppression.
//!
//! Posts are keyed by their `link`; the table carries a UNIQUE
//! constraint on it and saves use `ON CONFLICT(link) DO NOTHING`, so a
//! re-grab of the same vacancy is a silent no-op and two racing saves of
//! one link can never produce two rows. The policy is ignore, not
//! update: an existing row keeps its original fields and id.
//!
//! The store is the single resource shared by the scheduler's job and
//! the result listener; both go through the same pool.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, instrument};

use crate::error::GrabError;
use crate::models::Post;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS post (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name     TEXT NOT NULL,
    textpost TEXT NOT NULL,
    link     TEXT NOT NULL UNIQUE,
    created  TIMESTAMP NOT NULL
)";

/// Capability seam for post persistence. The scheduler and the result
/// listener only ever see this trait.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert the post unless its link is already present. On a real
    /// insert the generated id is written back; on conflict nothing
    /// changes, including the existing row.
    async fn save(&self, post: &mut Post) -> Result<(), GrabError>;

    /// Every stored post, ascending id order.
    async fn get_all(&self) -> Result<Vec<Post>, GrabError>;

    /// Look up one post by its store-assigned id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, GrabError>;

    /// Drop every row. Maintenance and tests only; the scheduled flow
    /// never calls this.
    async fn clear(&self) -> Result<(), GrabError>;
}

/// SQLite-backed store over a sqlx pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `database_url` and
    /// ensure the schema exists.
    #[instrument(level = "info")]
    pub async fn connect(database_url: &str) -> Result<Self, GrabError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // A single connection: sqlite serializes writers regardless, and
        // an in-memory database is only visible to the connection that
        // created it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

fn row_to_post(row: &SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("name"),
        link: row.get("link"),
        description: row.get("textpost"),
        created: row.get("created"),
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn save(&self, post: &mut Post) -> Result<(), GrabError> {
        // RETURNING yields no row when the conflict clause swallowed the
        // insert, which doubles as the duplicate signal.
        let inserted = sqlx::query(
            "INSERT INTO post (name, textpost, link, created) VALUES (?, ?, ?, ?)
             ON CONFLICT(link) DO NOTHING
             RETURNING id",
        )
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.link)
        .bind(post.created)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => post.id = row.get("id"),
            None => debug!(link = %post.link, "Duplicate link; save skipped"),
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Post>, GrabError> {
        let rows = sqlx::query("SELECT id, name, textpost, link, created FROM post ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, GrabError> {
        let row = sqlx::query("SELECT id, name, textpost, link, created FROM post WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_post))
    }

    async fn clear(&self) -> Result<(), GrabError> {
        sqlx::query("DELETE FROM post").execute(&self.pool).await?;
        Ok(())
    }
}
