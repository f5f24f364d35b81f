use crate::domain::{models::user::User, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::error;

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (
                id, email, password_hash, first_name, last_name, university, graduation_year, bio,
                profile_image_url, instagram_handle, twitter_handle, linkedin_url,
                events_hosted, events_attended, friend_count, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *"#,
        )
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.university)
            .bind(user.graduation_year)
            .bind(&user.bio)
            .bind(&user.profile_image_url)
            .bind(&user.instagram_handle)
            .bind(&user.twitter_handle)
            .bind(&user.linkedin_url)
            .bind(user.events_hosted)
            .bind(user.events_attended)
            .bind(user.friend_count)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_many(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM users WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY first_name ASC, last_name ASC");

        builder.build_query_as::<User>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_profile(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users SET
                first_name=?, last_name=?, university=?, graduation_year=?, bio=?,
                profile_image_url=?, instagram_handle=?, twitter_handle=?, linkedin_url=?, updated_at=?
               WHERE id=? RETURNING *"#,
        )
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.university)
            .bind(user.graduation_year)
            .bind(&user.bio)
            .bind(&user.profile_image_url)
            .bind(&user.instagram_handle)
            .bind(&user.twitter_handle)
            .bind(&user.linkedin_url)
            .bind(Utc::now())
            .bind(&user.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn adjust_counters(&self, id: &str, hosted: i32, attended: i32, friends: i32) -> Result<(), AppError> {
        sqlx::query(
            r#"UPDATE users SET
                events_hosted = MAX(events_hosted + ?, 0),
                events_attended = MAX(events_attended + ?, 0),
                friend_count = MAX(friend_count + ?, 0)
               WHERE id = ?"#,
        )
            .bind(hosted)
            .bind(attended)
            .bind(friends)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("SQLite counter update failed for user {}: {:?}", id, e);
                AppError::Database(e)
            })?;
        Ok(())
    }
}
