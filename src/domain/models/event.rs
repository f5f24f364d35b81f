use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Parties,
    Study,
    Sports,
    Concerts,
    Social,
    Restaurants,
    Food,
    Nightlife,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Parties => "parties",
            EventCategory::Study => "study",
            EventCategory::Sports => "sports",
            EventCategory::Concerts => "concerts",
            EventCategory::Social => "social",
            EventCategory::Restaurants => "restaurants",
            EventCategory::Food => "food",
            EventCategory::Nightlife => "nightlife",
        }
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "parties" => Ok(EventCategory::Parties),
            "study" => Ok(EventCategory::Study),
            "sports" => Ok(EventCategory::Sports),
            "concerts" => Ok(EventCategory::Concerts),
            "social" => Ok(EventCategory::Social),
            "restaurants" => Ok(EventCategory::Restaurants),
            "food" => Ok(EventCategory::Food),
            "nightlife" => Ok(EventCategory::Nightlife),
            other => Err(format!("Unknown category '{}'", other)),
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an event came from. Anything other than `User` is read-only to the app.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Ticketmaster,
    Meetup,
    User,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Ticketmaster => "ticketmaster",
            EventSource::Meetup => "meetup",
            EventSource::User => "user",
        }
    }

    pub fn is_external(&self) -> bool {
        !matches!(self, EventSource::User)
    }
}

impl FromStr for EventSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticketmaster" => Ok(EventSource::Ticketmaster),
            "meetup" => Ok(EventSource::Meetup),
            "user" => Ok(EventSource::User),
            other => Err(format!("Unknown event source '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub host_id: Option<String>,
    pub price: f64,
    pub max_attendees: Option<i32>,
    pub is_public: bool,
    pub image_url: Option<String>,
    pub external_id: Option<String>,
    pub external_source: String,
    pub ticket_url: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(skip_serializing)]
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_hosted_by(&self, user_id: &str) -> bool {
        self.host_id.as_deref() == Some(user_id)
    }
}

/// A search candidate, either a stored event or one normalized from a provider.
///
/// `start_date` stays a string so that provider dates that do not parse are
/// carried through to the ranking step and dropped there.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub start_date: String,
    pub end_date: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub host_id: Option<String>,
    pub price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub max_attendees: Option<i32>,
    pub image_url: Option<String>,
    pub ticket_url: Option<String>,
    pub external_id: Option<String>,
    pub external_source: EventSource,
    #[serde(default)]
    pub is_favorited: bool,
}

impl From<Event> for SearchEvent {
    fn from(event: Event) -> Self {
        let category = event.category.parse().unwrap_or(EventCategory::Social);
        let external_source = event.external_source.parse().unwrap_or(EventSource::User);
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            category,
            start_date: event.start_date.to_rfc3339(),
            end_date: event.end_date.map(|d| d.to_rfc3339()),
            location: event.location,
            latitude: event.latitude,
            longitude: event.longitude,
            host_id: event.host_id,
            price: event.price,
            min_price: event.min_price.unwrap_or(event.price),
            max_price: event.max_price.unwrap_or(event.price),
            max_attendees: event.max_attendees,
            image_url: event.image_url,
            ticket_url: event.ticket_url,
            external_id: event.external_id,
            external_source,
            is_favorited: false,
        }
    }
}

/// Filters applied to stored events by `EventRepository::search_by_location`.
#[derive(Debug, Clone, Default)]
pub struct LocationQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_miles: f64,
    pub category: Option<EventCategory>,
    pub keyword: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Only events starting strictly after this instant are returned.
    pub upcoming_after: Option<DateTime<Utc>>,
}
