use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GetEventQuery {
    pub event_id: String,
    #[serde(default)]
    pub expand_category: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetCategoryQuery {
    pub category_id: String,
}

/// Filters for the event list read. All supplied filters compose with AND;
/// text matches are case-insensitive substring tests, date bounds are
/// inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilters {
    pub q: Option<String>,
    pub category_id: Option<String>,
    pub location: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

/// List read over the filtered set. `page` implies pagination (1-based,
/// limit defaulting to 10), a bare `limit` slices from the start, and
/// neither returns the whole filtered set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsQuery {
    #[serde(flatten)]
    pub filters: EventFilters,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub expand_category: bool,
}
