use crate::domain::{models::favorite::Favorite, ports::FavoriteRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteFavoriteRepo { pool: SqlitePool }
impl SqliteFavoriteRepo { pub fn new(pool: SqlitePool) -> Self { Self { pool } } }

#[async_trait]
impl FavoriteRepository for SqliteFavoriteRepo {
    async fn add(&self, favorite: &Favorite) -> Result<Favorite, AppError> {
        sqlx::query_as::<_, Favorite>(
            r#"INSERT INTO favorites (id, user_id, event_id, external_source, title, start_date, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(user_id, event_id, external_source) DO UPDATE SET
               title=excluded.title,
               start_date=excluded.start_date
               RETURNING *"#
        )
            .bind(&favorite.id)
            .bind(&favorite.user_id)
            .bind(&favorite.event_id)
            .bind(&favorite.external_source)
            .bind(&favorite.title)
            .bind(&favorite.start_date)
            .bind(favorite.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn remove(&self, user_id: &str, external_source: &str, event_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND external_source = ? AND event_id = ?")
            .bind(user_id)
            .bind(external_source)
            .bind(event_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Favorite not found".into()));
        }
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Favorite>, AppError> {
        sqlx::query_as::<_, Favorite>("SELECT * FROM favorites WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
