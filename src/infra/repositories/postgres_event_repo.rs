use crate::domain::{
    models::event::{Event, LocationQuery},
    ports::EventRepository,
    services::geo::{bounding_box, filter_stored_events},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (
                id, title, description, category, start_date, end_date, location, latitude, longitude,
                host_id, price, max_attendees, is_public, image_url, external_id, external_source,
                ticket_url, min_price, max_price, payment_intent_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
            RETURNING *"#
        )
            .bind(&event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.category)
            .bind(event.start_date)
            .bind(event.end_date)
            .bind(&event.location)
            .bind(event.latitude)
            .bind(event.longitude)
            .bind(&event.host_id)
            .bind(event.price)
            .bind(event.max_attendees)
            .bind(event.is_public)
            .bind(&event.image_url)
            .bind(&event.external_id)
            .bind(&event.external_source)
            .bind(&event.ticket_url)
            .bind(event.min_price)
            .bind(event.max_price)
            .bind(&event.payment_intent_id)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_payment_intent(&self, intent_id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE payment_intent_id = $1")
            .bind(intent_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn search_by_location(&self, query: &LocationQuery) -> Result<Vec<Event>, AppError> {
        let category = query.category.map(|c| c.as_str());
        let bbox = bounding_box(query.lat, query.lng, query.radius_miles);
        let rows = sqlx::query_as::<_, Event>(
            r#"SELECT * FROM events
               WHERE is_public = TRUE AND external_source = 'user'
               AND ($1::TEXT IS NULL OR category = $1)
               AND ($2::TIMESTAMPTZ IS NULL OR start_date > $2)
               AND ($3::TIMESTAMPTZ IS NULL OR start_date >= $3)
               AND ($4::TIMESTAMPTZ IS NULL OR start_date <= $4)
               AND (latitude IS NULL OR longitude IS NULL
                    OR (latitude BETWEEN $5 AND $6 AND longitude BETWEEN $7 AND $8))
               ORDER BY start_date ASC"#,
        )
            .bind(category)
            .bind(query.upcoming_after)
            .bind(query.start_date)
            .bind(query.end_date)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lng)
            .bind(bbox.max_lng)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(filter_stored_events(rows, query))
    }

    async fn list_by_host(&self, host_id: &str) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE host_id = $1 ORDER BY start_date ASC")
            .bind(host_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            r#"UPDATE events SET
                title=$1, description=$2, category=$3, start_date=$4, end_date=$5, location=$6,
                latitude=$7, longitude=$8, price=$9, max_attendees=$10, is_public=$11, image_url=$12, updated_at=$13
               WHERE id=$14 RETURNING *"#
        )
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.category)
            .bind(event.start_date)
            .bind(event.end_date)
            .bind(&event.location)
            .bind(event.latitude)
            .bind(event.longitude)
            .bind(event.price)
            .bind(event.max_attendees)
            .bind(event.is_public)
            .bind(&event.image_url)
            .bind(event.updated_at)
            .bind(&event.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Attendees lose the event from their count before the RSVPs cascade away.
        sqlx::query(
            r#"UPDATE users SET events_attended = GREATEST(events_attended - 1, 0)
               WHERE id IN (SELECT user_id FROM rsvps WHERE event_id = $1 AND status = 'attending' AND user_id IS NOT NULL)"#
        )
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("DELETE FROM favorites WHERE event_id = $1 AND external_source = 'user'")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
