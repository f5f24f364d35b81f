use crate::domain::{models::media::Media, ports::MediaRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteMediaRepo { pool: SqlitePool }
impl SqliteMediaRepo { pub fn new(pool: SqlitePool) -> Self { Self { pool } } }

#[async_trait]
impl MediaRepository for SqliteMediaRepo {
    async fn create(&self, media: &Media) -> Result<Media, AppError> {
        sqlx::query_as::<_, Media>(
            r#"INSERT INTO media (id, event_id, comment_id, user_id, guest_name, guest_email, media_type, url, caption, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"#
        )
            .bind(&media.id)
            .bind(&media.event_id)
            .bind(&media.comment_id)
            .bind(&media.user_id)
            .bind(&media.guest_name)
            .bind(&media.guest_email)
            .bind(&media.media_type)
            .bind(&media.url)
            .bind(&media.caption)
            .bind(media.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Media>, AppError> {
        sqlx::query_as::<_, Media>("SELECT * FROM media WHERE event_id = ? ORDER BY created_at DESC")
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
