use events_models::{Category, Event};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Event with its category inlined (the `_expand=category` shape). A
/// dangling category reference serializes without the `category` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventWithCategory {
    #[serde(flatten)]
    pub event: Event,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl From<Event> for EventWithCategory {
    fn from(event: Event) -> Self {
        Self {
            event,
            category: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    pub attendees: u32,
}

/// Where an uploaded image landed, as a path the API host serves.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteResponse {
    pub favorites: u32,
}

/// One page of the list read plus the full filtered count. The count only
/// reaches the wire as `X-Total-Count` when the request asked for a slice.
#[derive(Debug, Clone)]
pub struct EventPage {
    pub events: Vec<EventWithCategory>,
    pub total: usize,
    pub sliced: bool,
}
