use crate::domain::{
    models::rsvp::{attended_delta, Rsvp},
    ports::RsvpRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

pub struct PostgresRsvpRepo {
    pool: PgPool,
}

impl PostgresRsvpRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Row lock on the event serializes RSVPs for it until commit.
    async fn lock_event(tx: &mut Transaction<'_, Postgres>, event_id: &str) -> Result<(), AppError> {
        let locked: Option<String> = sqlx::query_scalar("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(AppError::Database)?;
        if locked.is_none() {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn ensure_room(tx: &mut Transaction<'_, Postgres>, event_id: &str, capacity: Option<i32>) -> Result<(), AppError> {
        let Some(max) = capacity else {
            return Ok(());
        };
        let attending: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rsvps WHERE event_id = $1 AND status = 'attending'")
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
impl RsvpRepository for PostgresRsvpRepo {
    async fn upsert_for_user(&self, rsvp: &Rsvp, capacity: Option<i32>) -> Result<Rsvp, AppError> {
        let user_id = rsvp.user_id.as_deref()
            .ok_or_else(|| AppError::Validation("RSVP has no user".into()))?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        Self::lock_event(&mut tx, &rsvp.event_id).await?;

        let previous: Option<String> = sqlx::query_scalar("SELECT status FROM rsvps WHERE event_id = $1 AND user_id = $2")
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
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
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
            sqlx::query("UPDATE users SET events_attended = GREATEST(events_attended + $1, 0) WHERE id = $2")
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
               VALUES ($1, $2, NULL, $3, $4, $5, $6, $7)
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
        sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps WHERE event_id = $1 ORDER BY created_at ASC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
