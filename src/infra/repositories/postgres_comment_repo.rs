use crate::domain::{models::comment::Comment, ports::CommentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresCommentRepo { pool: PgPool }
impl PostgresCommentRepo { pub fn new(pool: PgPool) -> Self { Self { pool } } }

#[async_trait]
impl CommentRepository for PostgresCommentRepo {
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError> {
        sqlx::query_as::<_, Comment>(
            r#"INSERT INTO comments (id, event_id, parent_id, user_id, guest_name, guest_email, content, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *"#
        )
            .bind(&comment.id)
            .bind(&comment.event_id)
            .bind(&comment.parent_id)
            .bind(&comment.user_id)
            .bind(&comment.guest_name)
            .bind(&comment.guest_email)
            .bind(&comment.content)
            .bind(comment.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Comment>, AppError> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Comment>, AppError> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE event_id = $1 ORDER BY created_at ASC")
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
