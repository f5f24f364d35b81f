use crate::domain::{
    models::rsvp::{attended_delta, Rsvp},
    ports::RsvpRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

pub struct SqliteRsvpRepo {
    pool: SqlitePool,
}

impl SqliteRsvpRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Writing first takes the database write lock, so RSVPs serialize until commit.
    async fn lock_event(tx: &mut Transaction<'_, Sqlite>, event_id: &str) -> Result<(), AppError> {
        let locked = sqlx::query("UPDATE events SET updated_at = updated_at WHERE id = ?")
            .bind(event_id)
            .execute(&mut **tx)
            .await
            .map_err(AppError::Database)?;
        if locked.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn ensure_room(tx: &mut Transaction<'_, Sqlite>, event_id: &str, capacity: Option<i32>) -> Result<(), AppError> {
        let Some(max) = capacity else {
            return Ok(());
        };
        let attending: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rsvps WHERE event_id = ? AND status = 'attending'")
            .bind(event_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(AppError::Database)?;
        if attending >= i64::from(max.max(0)) {
            return Err(AppError::Conflict("Event is full".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RsvpRepository for SqliteRsvpRepo {
    async fn upsert_for_user(&self, rsvp: &Rsvp, capacity: Option<i32>) -> Result<Rsvp, AppError> {
        let user_id = rsvp.user_id.as_deref()
            .ok_or_else(|| AppError::Validation("RSVP has no user".into()))?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        Self::lock_event(&mut tx, &rsvp.event_id).await?;

        let previous: Option<String> = sqlx::query_scalar("SELECT status FROM rsvps WHERE event_id = ? AND user_id = ?")
            .bind(&rsvp.event_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if attended_delta(previous.as_deref(), &rsvp.status) > 0 {
            Self::ensure_room(&mut tx, &rsvp.event_id, capacity).await?;
        }

        let saved = sqlx::query_as::<_, Rsvp>(
            r#"INSERT INTO rsvps (id, event_id, user_id, guest_name, guest_email, status, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(event_id, user_id) DO UPDATE SET
               status=excluded.status,
               updated_at=excluded.updated_at
               RETURNING *"#
        )
            .bind(&rsvp.id)
            .bind(&rsvp.event_id)
            .bind(&rsvp.user_id)
            .bind(&rsvp.guest_name)
            .bind(&rsvp.guest_email)
            .bind(&rsvp.status)
            .bind(rsvp.created_at)
            .bind(rsvp.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let delta = attended_delta(previous.as_deref(), &saved.status);
        if delta != 0 {
            sqlx::query("UPDATE users SET events_attended = MAX(events_attended + ?, 0) WHERE id = ?")
                .bind(delta)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }

    async fn create_guest(&self, rsvp: &Rsvp, capacity: Option<i32>) -> Result<Rsvp, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        Self::lock_event(&mut tx, &rsvp.event_id).await?;

        if rsvp.is_attending() {
            Self::ensure_room(&mut tx, &rsvp.event_id, capacity).await?;
        }

        let saved = sqlx::query_as::<_, Rsvp>(
            r#"INSERT INTO rsvps (id, event_id, user_id, guest_name, guest_email, status, created_at, updated_at)
               VALUES (?, ?, NULL, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&rsvp.id)
            .bind(&rsvp.event_id)
            .bind(&rsvp.guest_name)
            .bind(&rsvp.guest_email)
            .bind(&rsvp.status)
            .bind(rsvp.created_at)
            .bind(rsvp.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Rsvp>, AppError> {
        sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps WHERE event_id = ? ORDER BY created_at ASC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
