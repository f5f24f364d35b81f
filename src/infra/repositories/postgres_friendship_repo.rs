use crate::domain::{models::friendship::{Friendship, STATUS_ACCEPTED, STATUS_PENDING}, ports::FriendshipRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresFriendshipRepo { pool: PgPool }
impl PostgresFriendshipRepo { pub fn new(pool: PgPool) -> Self { Self { pool } } }

#[async_trait]
impl FriendshipRepository for PostgresFriendshipRepo {
    async fn create(&self, friendship: &Friendship) -> Result<Friendship, AppError> {
        sqlx::query_as::<_, Friendship>(
            r#"INSERT INTO friendships (id, requester_id, addressee_id, status, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6) RETURNING *"#
        )
            .bind(&friendship.id)
            .bind(&friendship.requester_id)
            .bind(&friendship.addressee_id)
            .bind(&friendship.status)
            .bind(friendship.created_at)
            .bind(friendship.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_between(&self, a: &str, b: &str) -> Result<Option<Friendship>, AppError> {
        sqlx::query_as::<_, Friendship>(
            r#"SELECT * FROM friendships
               WHERE (requester_id = $1 AND addressee_id = $2) OR (requester_id = $3 AND addressee_id = $4)"#
        )
            .bind(a)
            .bind(b)
            .bind(b)
            .bind(a)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn accept(&self, id: &str) -> Result<Friendship, AppError> {
        sqlx::query_as::<_, Friendship>("UPDATE friendships SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
            .bind(STATUS_ACCEPTED)
            .bind(Utc::now())
            .bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM friendships WHERE id = $1")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_accepted(&self, user_id: &str) -> Result<Vec<Friendship>, AppError> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships WHERE status = $1 AND (requester_id = $2 OR addressee_id = $3) ORDER BY updated_at DESC"
        )
            .bind(STATUS_ACCEPTED)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_incoming(&self, user_id: &str) -> Result<Vec<Friendship>, AppError> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships WHERE status = $1 AND addressee_id = $2 ORDER BY created_at DESC"
        )
            .bind(STATUS_PENDING)
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
