use crate::domain::{models::comment::Comment, ports::CommentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCommentRepo { pool: SqlitePool }
impl SqliteCommentRepo { pub fn new(pool: SqlitePool) -> Self { Self { pool } } }

#[async_trait]
impl CommentRepository for SqliteCommentRepo {
    async fn create(&self, comment: &Comment) -> Result<Comment, AppError> {
        sqlx::query_as::<_, Comment>(
            r#"INSERT INTO comments (id, event_id, parent_id, user_id, guest_name, guest_email, content, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"#
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
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Comment>, AppError> {
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE event_id = ? ORDER BY created_at ASC")
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
