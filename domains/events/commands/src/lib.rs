use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventCommand {
    pub name: String,
    pub description: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub category_id: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Full-replace payload for an existing event. Counters and the rating
/// average default to zero when the caller does not echo them back.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceEventCommand {
    #[serde(skip)]
    pub event_id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub category_id: String,
    #[serde(default)]
    pub attendees: u32,
    #[serde(default)]
    pub favorites: u32,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteEventCommand {
    pub event_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAttendanceCommand {
    pub event_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddFavoriteCommand {
    pub event_id: String,
}

/// Rating submission. `rating` stays raw JSON so the handler can apply the
/// integer-coercion rule (number or numeric string are accepted, anything
/// else is rejected); a client-sent `date` is carried but ignored, the
/// server assigns the stored instant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitRatingCommand {
    #[serde(skip)]
    pub event_id: String,
    pub rating: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}
