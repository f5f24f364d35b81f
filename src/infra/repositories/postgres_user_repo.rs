use crate::domain::{models::user::User, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (
                id, email, password_hash, first_name, last_name, university, graduation_year, bio,
                profile_image_url, instagram_handle, twitter_handle, linkedin_url,
                events_hosted, events_attended, friend_count, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
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
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_many(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ANY($1) ORDER BY first_name ASC, last_name ASC",
        )
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_profile(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users SET
                first_name=$1, last_name=$2, university=$3, graduation_year=$4, bio=$5,
                profile_image_url=$6, instagram_handle=$7, twitter_handle=$8, linkedin_url=$9, updated_at=$10
               WHERE id=$11 RETURNING *"#,
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
                events_hosted = GREATEST(events_hosted + $1, 0),
                events_attended = GREATEST(events_attended + $2, 0),
                friend_count = GREATEST(friend_count + $3, 0)
               WHERE id = $4"#,
        )
            .bind(hosted)
            .bind(attended)
            .bind(friends)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres counter update failed for user {}: {:?}", id, e);
                AppError::Database(e)
            })?;
        Ok(())
    }
}
