//! SQLite metadata store.
//!
//! Every call runs inside its own transaction; the query helpers take the
//! connection of that transaction explicitly.

use crate::domain::video::{NewVideo, VideoRecord, VideoUpdate};
use crate::ports::repository::{RepositoryError, VideoRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

const COLUMNS: &str = "id, filename, path, duration, size, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct SqliteVideoRepository {
    pool: SqlitePool,
}

impl SqliteVideoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool on `database_url` and apply pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }

    async fn insert(conn: &mut SqliteConnection, video: NewVideo) -> Result<VideoRecord, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, VideoRecord>(&format!(
            "INSERT INTO video ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(video.filename)
        .bind(video.path)
        .bind(video.duration)
        .bind(video.size)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await
    }

    async fn select(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<VideoRecord>, sqlx::Error> {
        sqlx::query_as::<_, VideoRecord>(&format!("SELECT {COLUMNS} FROM video WHERE id = ?"))
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn apply(
        conn: &mut SqliteConnection,
        id: Uuid,
        changes: VideoUpdate,
    ) -> Result<Option<VideoRecord>, sqlx::Error> {
        sqlx::query_as::<_, VideoRecord>(&format!(
            "UPDATE video SET duration = ?, size = ?, path = COALESCE(?, path), updated_at = ? \
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(changes.duration)
        .bind(changes.size)
        .bind(changes.path)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    async fn select_all(conn: &mut SqliteConnection) -> Result<Vec<VideoRecord>, sqlx::Error> {
        sqlx::query_as::<_, VideoRecord>(&format!(
            "SELECT {COLUMNS} FROM video ORDER BY created_at ASC, rowid ASC"
        ))
        .fetch_all(conn)
        .await
    }
}

#[async_trait]
impl VideoRepository for SqliteVideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "video", db.operation = "insert"))]
    async fn create(&self, video: NewVideo) -> Result<VideoRecord, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let record = Self::insert(&mut tx, video).await?;
        tx.commit().await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "video", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> Result<Option<VideoRecord>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let record = Self::select(&mut tx, id).await?;
        tx.commit().await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "video", db.operation = "update"))]
    async fn update(
        &self,
        id: Uuid,
        changes: VideoUpdate,
    ) -> Result<Option<VideoRecord>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let record = Self::apply(&mut tx, id, changes).await?;
        tx.commit().await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "video", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<VideoRecord>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let records = Self::select_all(&mut tx).await?;
        tx.commit().await?;
        Ok(records)
    }
}
