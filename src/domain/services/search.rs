//! Event search: merges provider results with stored events into one ranked list.

use std::collections::HashSet;
use std::sync::Arc;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::models::event::{LocationQuery, SearchEvent};
use crate::domain::models::favorite::Favorite;
use crate::domain::ports::{EventProvider, EventRepository, FavoriteRepository, ProviderQuery};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub events: Vec<SearchEvent>,
    /// True when one of the sources failed and its events are missing.
    pub partial: bool,
}

pub struct EventSearchService {
    provider: Arc<dyn EventProvider>,
    event_repo: Arc<dyn EventRepository>,
    favorite_repo: Arc<dyn FavoriteRepository>,
}

impl EventSearchService {
    pub fn new(
        provider: Arc<dyn EventProvider>,
        event_repo: Arc<dyn EventRepository>,
        favorite_repo: Arc<dyn FavoriteRepository>,
    ) -> Self {
        Self { provider, event_repo, favorite_repo }
    }

    pub async fn search(&self, query: &ProviderQuery, user_id: Option<&str>) -> Result<SearchOutcome, AppError> {
        let now = Utc::now();
        let location_query = LocationQuery {
            lat: query.lat,
            lng: query.lng,
            radius_miles: query.radius_miles,
            category: query.category,
            keyword: query.keyword.clone(),
            start_date: query.start_date,
            end_date: query.end_date,
            upcoming_after: Some(now),
        };

        let (provider_result, stored_result) = tokio::join!(
            self.provider.search(query),
            self.event_repo.search_by_location(&location_query),
        );

        let mut partial = false;

        let provider_events = provider_result.unwrap_or_else(|e| {
            warn!(source = self.provider.source_name(), "Provider search failed, continuing without it: {}", e);
            partial = true;
            Vec::new()
        });

        let stored_events: Vec<SearchEvent> = match stored_result {
            Ok(rows) => rows.into_iter().map(SearchEvent::from).collect(),
            Err(e) => {
                warn!("Stored event search failed, continuing without it: {:?}", e);
                partial = true;
                Vec::new()
            }
        };

        debug!(
            provider_count = provider_events.len(),
            stored_count = stored_events.len(),
            "Collected search candidates"
        );

        let mut candidates = provider_events;
        candidates.extend(stored_events);

        let favorites = match user_id {
            Some(uid) => Some(self.favorite_repo.list_by_user(uid).await?),
            None => None,
        };

        Ok(SearchOutcome {
            events: rank_events(candidates, favorites.as_deref(), now),
            partial,
        })
    }
}

/// Drops events that do not start strictly after `now` (or whose start does not
/// parse), marks favorites, and orders favorites first then by start time.
pub fn rank_events(candidates: Vec<SearchEvent>, favorites: Option<&[Favorite]>, now: DateTime<Utc>) -> Vec<SearchEvent> {
    let favorite_keys: Option<HashSet<(&str, &str)>> = favorites.map(|favs| {
        favs.iter()
            .map(|f| (f.event_id.as_str(), f.external_source.as_str()))
            .collect()
    });

    let mut upcoming: Vec<(DateTime<Utc>, SearchEvent)> = candidates.into_iter()
        .filter_map(|mut event| {
            let start = parse_timestamp(&event.start_date)?;
            if start <= now {
                return None;
            }
            if let Some(keys) = &favorite_keys {
                event.is_favorited = keys.contains(&(event.id.as_str(), event.external_source.as_str()));
            }
            Some((start, event))
        })
        .collect();

    // sort_by is stable, so equal keys keep their source order.
    upcoming.sort_by(|(a_start, a), (b_start, b)| {
        b.is_favorited.cmp(&a.is_favorited).then(a_start.cmp(b_start))
    });

    upcoming.into_iter().map(|(_, event)| event).collect()
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::event::{EventCategory, EventSource};
    use chrono::Duration;

    fn candidate(id: &str, start: String, source: EventSource) -> SearchEvent {
        SearchEvent {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            category: EventCategory::Concerts,
            start_date: start,
            end_date: None,
            location: String::new(),
            latitude: Some(39.1),
            longitude: Some(-84.5),
            host_id: None,
            price: 0.0,
            min_price: 0.0,
            max_price: 0.0,
            max_attendees: None,
            image_url: None,
            ticket_url: None,
            external_id: None,
            external_source: source,
            is_favorited: false,
        }
    }

    fn favorite(event_id: &str, source: &str) -> Favorite {
        Favorite::new("u1".into(), event_id.into(), source.into(), "t".into(), "d".into())
    }

    #[test]
    fn test_past_and_unparsable_events_are_dropped() {
        let now = Utc::now();
        let events = vec![
            candidate("past", (now - Duration::hours(1)).to_rfc3339(), EventSource::Ticketmaster),
            candidate("exactly-now", now.to_rfc3339(), EventSource::Ticketmaster),
            candidate("garbage", "next friday".into(), EventSource::Ticketmaster),
            candidate("empty", String::new(), EventSource::Ticketmaster),
            candidate("future", (now + Duration::hours(1)).to_rfc3339(), EventSource::User),
        ];

        let ranked = rank_events(events, None, now);
        let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["future"]);
    }

    #[test]
    fn test_favorites_first_then_by_start() {
        let now = Utc::now();
        let at = |h: i64| (now + Duration::hours(h)).to_rfc3339();
        let events = vec![
            candidate("c", at(3), EventSource::User),
            candidate("fav-late", at(10), EventSource::Ticketmaster),
            candidate("a", at(1), EventSource::Ticketmaster),
            candidate("fav-early", at(5), EventSource::User),
            candidate("b", at(2), EventSource::User),
        ];
        let favs = vec![favorite("fav-late", "ticketmaster"), favorite("fav-early", "user")];

        let ranked = rank_events(events, Some(&favs), now);
        let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["fav-early", "fav-late", "a", "b", "c"]);
        assert!(ranked[0].is_favorited && ranked[1].is_favorited);
        assert!(!ranked[2].is_favorited);
    }

    #[test]
    fn test_favorite_lookup_is_scoped_by_source() {
        let now = Utc::now();
        let start = (now + Duration::days(2)).to_rfc3339();
        let events = vec![candidate("G5v0Z9Yc", start, EventSource::Ticketmaster)];
        let favs = vec![favorite("G5v0Z9Yc", "user")];

        let ranked = rank_events(events, Some(&favs), now);
        assert_eq!(ranked.len(), 1);
        assert!(!ranked[0].is_favorited);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2030-05-01T20:00:00Z").is_some());
        assert!(parse_timestamp("2030-05-01T20:00:00-04:00").is_some());
        assert_eq!(
            parse_timestamp("2030-05-01T20:00:00"),
            parse_timestamp("2030-05-01T20:00:00Z"),
        );
        assert_eq!(
            parse_timestamp("2030-05-01"),
            parse_timestamp("2030-05-01T00:00:00Z"),
        );
        assert!(parse_timestamp("2030-13-01").is_none());
        assert!(parse_timestamp("TBA").is_none());
    }
}
