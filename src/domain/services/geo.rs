use crate::domain::models::event::{Event, LocationQuery};

const EARTH_RADIUS_MILES: f64 = 3958.8;

pub fn haversine_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
}

/// Lat/lng rectangle enclosing a search circle, used to prefilter in SQL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

pub fn bounding_box(lat: f64, lng: f64, radius_miles: f64) -> BoundingBox {
    let angular = radius_miles / EARTH_RADIUS_MILES;
    let d_lat = angular.to_degrees();
    let min_lat = lat - d_lat;
    let max_lat = lat + d_lat;

    // Near a pole or across the antimeridian the longitude span is the whole circle.
    let full = BoundingBox { min_lat: min_lat.max(-90.0), max_lat: max_lat.min(90.0), min_lng: -180.0, max_lng: 180.0 };
    if min_lat <= -90.0 || max_lat >= 90.0 {
        return full;
    }
    let ratio = angular.sin() / lat.to_radians().cos();
    if ratio >= 1.0 {
        return full;
    }
    let d_lng = ratio.asin().to_degrees();
    if lng - d_lng < -180.0 || lng + d_lng > 180.0 {
        return full;
    }

    BoundingBox { min_lat, max_lat, min_lng: lng - d_lng, max_lng: lng + d_lng }
}

/// Applies the non-SQL part of a location search to stored rows.
///
/// Events with coordinates must lie within the radius. Events without
/// coordinates are kept for list views.
pub fn filter_stored_events(events: Vec<Event>, query: &LocationQuery) -> Vec<Event> {
    let keyword = query.keyword.as_ref()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty());

    events.into_iter()
        .filter(|e| match (e.latitude, e.longitude) {
            (Some(lat), Some(lng)) => haversine_miles(query.lat, query.lng, lat, lng) <= query.radius_miles,
            _ => true,
        })
        .filter(|e| match &keyword {
            Some(k) => e.title.to_lowercase().contains(k) || e.description.to_lowercase().contains(k),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn event_at(title: &str, lat: Option<f64>, lng: Option<f64>) -> Event {
        let now = Utc::now();
        Event {
            id: title.to_string(),
            title: title.to_string(),
            description: "".to_string(),
            category: "social".to_string(),
            start_date: now + Duration::days(1),
            end_date: None,
            location: "".to_string(),
            latitude: lat,
            longitude: lng,
            host_id: None,
            price: 0.0,
            max_attendees: None,
            is_public: true,
            image_url: None,
            external_id: None,
            external_source: "user".to_string(),
            ticket_url: None,
            min_price: None,
            max_price: None,
            payment_intent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_haversine_cincinnati_to_columbus() {
        let d = haversine_miles(39.1031, -84.5120, 39.9612, -82.9988);
        assert!((d - 99.0).abs() < 3.0, "got {}", d);
    }

    #[test]
    fn test_bounding_box_contains_radius() {
        let bbox = bounding_box(39.10, -84.51, 50.0);
        assert!(bbox.min_lat < 39.10 && bbox.max_lat > 39.10);
        // Every point 50 miles out along the axes stays inside.
        assert!(haversine_miles(39.10, -84.51, bbox.max_lat, -84.51) >= 49.9);
        assert!(haversine_miles(39.10, -84.51, 39.10, bbox.max_lng) >= 49.9);
        // Columbus (~99 miles) is outside the box.
        assert!(-83.00 > bbox.max_lng || 39.96 > bbox.max_lat);
    }

    #[test]
    fn test_bounding_box_widens_near_pole_and_antimeridian() {
        let polar = bounding_box(89.5, 10.0, 100.0);
        assert_eq!((polar.min_lng, polar.max_lng, polar.max_lat), (-180.0, 180.0, 90.0));

        let dateline = bounding_box(0.0, 179.9, 50.0);
        assert_eq!((dateline.min_lng, dateline.max_lng), (-180.0, 180.0));
    }

    #[test]
    fn test_radius_filter_keeps_unplaced_events() {
        let query = LocationQuery { lat: 39.10, lng: -84.51, radius_miles: 50.0, ..Default::default() };
        let events = vec![
            event_at("near", Some(39.13), Some(-84.50)),
            event_at("columbus", Some(39.96), Some(-83.00)),
            event_at("nowhere", None, None),
        ];

        let kept: Vec<String> = filter_stored_events(events, &query).into_iter().map(|e| e.title).collect();
        assert_eq!(kept, vec!["near", "nowhere"]);
    }

    #[test]
    fn test_keyword_matches_title_or_description() {
        let query = LocationQuery {
            lat: 39.10, lng: -84.51, radius_miles: 50.0,
            keyword: Some("  TRIVIA ".into()),
            ..Default::default()
        };
        let mut described = event_at("pub night", None, None);
        described.description = "weekly trivia".into();
        let events = vec![event_at("Trivia Tuesday", None, None), described, event_at("yoga", None, None)];

        assert_eq!(filter_stored_events(events, &query).len(), 2);
    }
}
