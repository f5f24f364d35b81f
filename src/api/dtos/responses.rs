use serde::Serialize;
use crate::domain::models::rsvp::Rsvp;
use crate::domain::models::user::PublicUser;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize, Default, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RsvpCounts {
    pub attending: usize,
    pub maybe: usize,
    pub not_attending: usize,
}

#[derive(Serialize)]
pub struct RsvpListResponse {
    pub rsvps: Vec<Rsvp>,
    pub counts: RsvpCounts,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestView {
    pub id: String,
    pub requester: PublicUser,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}
