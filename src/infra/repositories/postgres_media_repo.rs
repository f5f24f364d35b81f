use crate::domain::{models::media::Media, ports::MediaRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresMediaRepo { pool: PgPool }
impl PostgresMediaRepo { pub fn new(pool: PgPool) -> Self { Self { pool } } }

#[async_trait]
impl MediaRepository for PostgresMediaRepo {
    async fn create(&self, media: &Media) -> Result<Media, AppError> {
        sqlx::query_as::<_, Media>(
            r#"INSERT INTO media (id, event_id, comment_id, user_id, guest_name, guest_email, media_type, url, caption, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *"#
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
        sqlx::query_as::<_, Media>("SELECT * FROM media WHERE event_id = $1 ORDER BY created_at DESC")
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
