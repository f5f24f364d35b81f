use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::event::{EventCategory, EventSource, SearchEvent};
use crate::domain::ports::{EventProvider, ProviderQuery};
use crate::error::AppError;

const MIN_IMAGE_WIDTH: u32 = 640;

// Discovery API response, only the fields we read.

#[derive(Debug, Deserialize)]
pub struct DiscoveryResponse {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedEvents>,
}

// Events stay raw here so one malformed entry cannot sink the whole page.
#[derive(Debug, Deserialize)]
pub struct EmbeddedEvents {
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TmEvent {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub info: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<TmImage>,
    pub dates: Option<TmDates>,
    #[serde(default)]
    pub price_ranges: Vec<TmPriceRange>,
    #[serde(default)]
    pub classifications: Vec<TmClassification>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<TmEventEmbedded>,
}

#[derive(Debug, Deserialize)]
pub struct TmImage {
    pub url: String,
    pub width: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TmDates {
    pub start: Option<TmStart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TmStart {
    pub local_date: Option<String>,
    pub local_time: Option<String>,
    pub date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TmPriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TmClassification {
    pub segment: Option<TmNamed>,
}

#[derive(Debug, Deserialize)]
pub struct TmNamed {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TmEventEmbedded {
    #[serde(default)]
    pub venues: Vec<TmVenue>,
}

#[derive(Debug, Deserialize)]
pub struct TmVenue {
    pub name: Option<String>,
    /// IANA zone, e.g. `America/New_York`.
    pub timezone: Option<String>,
    pub city: Option<TmNamed>,
    pub location: Option<TmLocation>,
}

#[derive(Debug, Deserialize)]
pub struct TmLocation {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

pub struct TicketmasterProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    page_size: u32,
}

impl TicketmasterProvider {
    pub fn new(api_key: Option<String>, base_url: String, page_size: u32) -> Self {
        if api_key.is_none() {
            info!("TICKETMASTER_API_KEY not set, external events disabled");
        }
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size,
        }
    }

    fn build_params(&self, api_key: &str, query: &ProviderQuery, classification: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apikey", api_key.to_string()),
            ("latlong", format!("{},{}", query.lat, query.lng)),
            ("radius", format!("{}", query.radius_miles.round().max(1.0) as i64)),
            ("unit", "miles".to_string()),
            ("size", self.page_size.to_string()),
            ("sort", "date,asc".to_string()),
        ];
        if let Some(class) = classification {
            params.push(("classificationName", class.to_string()));
        }
        if let Some(keyword) = query.keyword.as_ref().filter(|k| !k.trim().is_empty()) {
            params.push(("keyword", keyword.trim().to_string()));
        }
        if let Some(start) = query.start_date {
            params.push(("startDateTime", format_provider_datetime(start)));
        }
        if let Some(end) = query.end_date {
            params.push(("endDateTime", format_provider_datetime(end)));
        }
        params
    }
}

#[async_trait]
impl EventProvider for TicketmasterProvider {
    fn source_name(&self) -> &'static str {
        EventSource::Ticketmaster.as_str()
    }

    #[instrument(skip(self), fields(lat = query.lat, lng = query.lng))]
    async fn search(&self, query: &ProviderQuery) -> Result<Vec<SearchEvent>, AppError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };

        let classification = match query.category {
            Some(category) => match provider_classification(category) {
                Some(class) => Some(class),
                None => {
                    debug!(category = %category, "Category has no provider counterpart, skipping provider");
                    return Ok(Vec::new());
                }
            },
            None => None,
        };

        let url = format!("{}/events.json", self.base_url);
        let params = self.build_params(api_key, query, classification);

        let res = self.client.get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("Ticketmaster connection error: {}", e);
                AppError::ExternalService(format!("Ticketmaster connection error: {}", e))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            warn!("Ticketmaster body read failed: {}", e);
            AppError::ExternalService(format!("Ticketmaster body read failed: {}", e))
        })?;

        if !status.is_success() {
            warn!("Ticketmaster search failed. Status: {}", status);
            return Err(AppError::ExternalService(format!("Ticketmaster returned {}", status)));
        }

        let events = parse_discovery_body(&body)?;
        debug!(count = events.len(), "Ticketmaster events normalized");
        Ok(events)
    }
}

pub fn format_provider_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Decodes a discovery response body and normalizes every event that can be placed on a map.
pub fn parse_discovery_body(body: &str) -> Result<Vec<SearchEvent>, AppError> {
    let response: DiscoveryResponse = serde_json::from_str(body).map_err(|e| {
        warn!("Ticketmaster response did not match the expected schema: {}", e);
        AppError::ExternalService(format!("Malformed Ticketmaster response: {}", e))
    })?;

    let raw_events = response.embedded.map(|e| e.events).unwrap_or_default();
    Ok(raw_events.into_iter()
        .filter_map(|raw| match serde_json::from_value::<TmEvent>(raw) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping malformed Ticketmaster event: {}", e);
                None
            }
        })
        .map(normalize_event)
        .filter(|e| e.latitude.is_some() && e.longitude.is_some())
        .collect())
}

pub fn normalize_event(event: TmEvent) -> SearchEvent {
    let category = event.classifications.first()
        .and_then(|c| c.segment.as_ref())
        .map(|s| app_category(&s.name))
        .unwrap_or(EventCategory::Social);

    let (min_price, max_price) = price_bounds(&event.price_ranges);
    let image_url = pick_image(&event.images);
    let venue = event.embedded.as_ref().and_then(|e| e.venues.first());
    let venue_tz = venue
        .and_then(|v| v.timezone.as_deref())
        .and_then(|tz| tz.parse::<Tz>().ok());
    let start_date = event.dates.as_ref()
        .and_then(|d| d.start.as_ref())
        .map(|start| start_string(start, venue_tz))
        .unwrap_or_default();

    let (latitude, longitude) = venue
        .and_then(|v| v.location.as_ref())
        .map(|loc| (parse_coord(loc.latitude.as_deref()), parse_coord(loc.longitude.as_deref())))
        .unwrap_or((None, None));
    let location = venue.map(venue_label).unwrap_or_default();

    let description = event.info
        .or(event.description)
        .unwrap_or_default();

    SearchEvent {
        id: event.id.clone(),
        title: clean_title(&event.name),
        description,
        category,
        start_date,
        end_date: None,
        location,
        latitude,
        longitude,
        host_id: None,
        price: min_price,
        min_price,
        max_price,
        max_attendees: None,
        image_url,
        ticket_url: event.url,
        external_id: Some(event.id),
        external_source: EventSource::Ticketmaster,
        is_favorited: false,
    }
}

pub fn provider_classification(category: EventCategory) -> Option<&'static str> {
    match category {
        EventCategory::Concerts | EventCategory::Parties | EventCategory::Nightlife => Some("Music"),
        EventCategory::Sports => Some("Sports"),
        EventCategory::Social => Some("Arts & Theatre"),
        EventCategory::Study | EventCategory::Restaurants | EventCategory::Food => None,
    }
}

pub fn app_category(segment: &str) -> EventCategory {
    match segment {
        "Music" => EventCategory::Concerts,
        "Sports" => EventCategory::Sports,
        "Arts & Theatre" | "Film" => EventCategory::Social,
        _ => EventCategory::Social,
    }
}

fn price_bounds(ranges: &[TmPriceRange]) -> (f64, f64) {
    let min = ranges.iter().filter_map(|r| r.min).fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))));
    let max = ranges.iter().filter_map(|r| r.max).fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));
    (min.unwrap_or(0.0), max.unwrap_or(0.0))
}

fn pick_image(images: &[TmImage]) -> Option<String> {
    images.iter()
        .filter(|img| img.width.unwrap_or(0) >= MIN_IMAGE_WIDTH)
        .max_by_key(|img| img.width.unwrap_or(0))
        .or_else(|| images.first())
        .map(|img| img.url.clone())
}

/// Prefers the UTC `dateTime`. Venue-local date/time is converted with the
/// venue zone when known, otherwise it is left zone-less and later read as UTC.
fn start_string(start: &TmStart, venue_tz: Option<Tz>) -> String {
    if let Some(dt) = start.date_time.as_ref().filter(|s| !s.is_empty()) {
        return dt.clone();
    }
    let Some(date) = start.local_date.as_deref() else {
        return String::new();
    };
    let time = start.local_time.as_deref().unwrap_or("00:00:00");

    if let Some(tz) = venue_tz
        && let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        && let Ok(clock) = NaiveTime::parse_from_str(time, "%H:%M:%S")
        && let Some(local) = tz.from_local_datetime(&day.and_time(clock)).earliest()
    {
        return format_provider_datetime(local.with_timezone(&Utc));
    }
    format!("{}T{}", date, time)
}

fn parse_coord(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok()).filter(|v| v.is_finite())
}

fn venue_label(venue: &TmVenue) -> String {
    match (venue.name.as_deref(), venue.city.as_ref().map(|c| c.name.as_str())) {
        (Some(name), Some(city)) => format!("{}, {}", name, city),
        (Some(name), None) => name.to_string(),
        (None, Some(city)) => city.to_string(),
        (None, None) => String::new(),
    }
}

static PRESENTER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^.{1,60}?\s+presents:?\s+").expect("valid regex"));
static BOILERPLATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(an evening with|a night with|live:)\s+").expect("valid regex"));
static TRAILING_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+[-–|]\s+(live in concert|in concert|live|.*\btour\b.*)$").expect("valid regex"));
static TRAILING_NOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\((18\+|21\+|all ages|rescheduled|postponed|moved|new date|[^)]*tickets?[^)]*)\)\s*$").expect("valid regex")
});
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strips presenter and boilerplate prefixes and trailing tour/age suffixes.
pub fn clean_title(raw: &str) -> String {
    let mut title = raw.trim().to_string();

    for _ in 0..3 {
        let before = title.clone();
        title = PRESENTER_PREFIX.replace(&title, "").into_owned();
        title = BOILERPLATE_PREFIX.replace(&title, "").into_owned();
        title = TRAILING_NOTE.replace(&title, "").into_owned();
        title = TRAILING_SUFFIX.replace(&title, "").into_owned();
        if title == before {
            break;
        }
    }

    let title = WHITESPACE.replace_all(title.trim(), " ").into_owned();
    if title.is_empty() { raw.trim().to_string() } else { title }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_title_rules() {
        assert_eq!(clean_title("Live Nation Presents: Taylor Swift - The Eras Tour (18+)"), "Taylor Swift");
        assert_eq!(clean_title("An Evening With Sting"), "Sting");
        assert_eq!(clean_title("Cincinnati Bengals vs. Pittsburgh Steelers"), "Cincinnati Bengals vs. Pittsburgh Steelers");
        assert_eq!(clean_title("Jay-Z World Tour"), "Jay-Z World Tour");
        assert_eq!(clean_title("Hamilton (Rescheduled)"), "Hamilton");
        assert_eq!(clean_title("  Phoebe   Bridgers - Live in Concert "), "Phoebe Bridgers");
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(provider_classification(EventCategory::Concerts), Some("Music"));
        assert_eq!(provider_classification(EventCategory::Nightlife), Some("Music"));
        assert_eq!(provider_classification(EventCategory::Sports), Some("Sports"));
        assert_eq!(provider_classification(EventCategory::Study), None);
        assert_eq!(app_category("Music"), EventCategory::Concerts);
        assert_eq!(app_category("Film"), EventCategory::Social);
        assert_eq!(app_category("Undefined"), EventCategory::Social);
    }

    #[test]
    fn test_parse_body_normalizes_and_drops_unplaceable() {
        let body = r#"{
            "_embedded": { "events": [
                {
                    "id": "G5v0Z9YcKe",
                    "name": "Bogart's Presents: Local Band",
                    "url": "https://tm.example/e/1",
                    "images": [
                        {"url": "small.jpg", "width": 100},
                        {"url": "large.jpg", "width": 1024},
                        {"url": "medium.jpg", "width": 640}
                    ],
                    "dates": {"start": {"localDate": "2031-03-01", "localTime": "20:00:00"}},
                    "priceRanges": [{"min": 25.0, "max": 40.0}, {"min": 15.5, "max": 60.0}],
                    "classifications": [{"segment": {"name": "Music"}}],
                    "_embedded": {"venues": [{
                        "name": "Bogart's",
                        "city": {"name": "Cincinnati"},
                        "location": {"latitude": "39.1290", "longitude": "-84.5097"}
                    }]}
                },
                {
                    "id": "no-venue",
                    "name": "Mystery Show",
                    "dates": {"start": {"dateTime": "2031-03-02T01:00:00Z"}}
                }
            ]}
        }"#;

        let events = parse_discovery_body(body).unwrap();
        assert_eq!(events.len(), 1);

        let e = &events[0];
        assert_eq!(e.title, "Local Band");
        assert_eq!(e.image_url.as_deref(), Some("large.jpg"));
        assert_eq!(e.start_date, "2031-03-01T20:00:00");
        assert_eq!(e.min_price, 15.5);
        assert_eq!(e.max_price, 60.0);
        assert_eq!(e.category, EventCategory::Concerts);
        assert_eq!(e.location, "Bogart's, Cincinnati");
        assert_eq!(e.external_source, EventSource::Ticketmaster);
        assert_eq!(e.external_id.as_deref(), Some("G5v0Z9YcKe"));
        assert_eq!(e.ticket_url.as_deref(), Some("https://tm.example/e/1"));
    }

    #[test]
    fn test_small_images_fall_back_to_first_and_prices_default_to_zero() {
        let event = TmEvent {
            id: "x".into(),
            name: "Show".into(),
            url: None,
            info: None,
            description: None,
            images: vec![
                TmImage { url: "first.jpg".into(), width: Some(300) },
                TmImage { url: "second.jpg".into(), width: Some(500) },
            ],
            dates: None,
            price_ranges: vec![],
            classifications: vec![],
            embedded: None,
        };

        let e = normalize_event(event);
        assert_eq!(e.image_url.as_deref(), Some("first.jpg"));
        assert_eq!((e.min_price, e.max_price), (0.0, 0.0));
        assert_eq!(e.start_date, "");
        assert!(e.latitude.is_none());
    }

    #[test]
    fn test_missing_embedded_is_empty_and_garbage_is_error() {
        assert!(parse_discovery_body(r#"{"page": {"totalElements": 0}}"#).unwrap().is_empty());
        assert!(parse_discovery_body("<html>502</html>").is_err());
        assert!(parse_discovery_body(r#"{"_embedded": "nope"}"#).is_err());
    }

    #[test]
    fn test_malformed_event_is_skipped_not_fatal() {
        let body = r#"{"_embedded": {"events": [
            {"id": "bad", "name": "Broken Image", "images": [{"width": 300}]},
            {"name": 5},
            {
                "id": "good",
                "name": "Fine Show",
                "dates": {"start": {"dateTime": "2031-03-02T01:00:00Z"}},
                "_embedded": {"venues": [{"location": {"latitude": "39.1", "longitude": "-84.5"}}]}
            }
        ]}}"#;

        let events = parse_discovery_body(body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "good");
    }

    #[test]
    fn test_local_start_uses_venue_timezone() {
        let start = TmStart {
            local_date: Some("2031-07-04".into()),
            local_time: Some("20:00:00".into()),
            date_time: None,
        };
        // EDT is UTC-4 in July
        assert_eq!(start_string(&start, Some(chrono_tz::America::New_York)), "2031-07-05T00:00:00Z");
        assert_eq!(start_string(&start, None), "2031-07-04T20:00:00");

        let date_only = TmStart { local_date: Some("2031-01-10".into()), local_time: None, date_time: None };
        assert_eq!(start_string(&date_only, Some(chrono_tz::America::Chicago)), "2031-01-10T06:00:00Z");
    }
}
