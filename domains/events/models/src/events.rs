use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use utoipa::ToSchema;

/// A listed event. `attendees`, `favorites` and `average_rating` are
/// server-maintained aggregates; `average_rating` caches the mean of the
/// event's ratings rounded to one decimal, 0.0 meaning "no ratings yet".
#[derive(
    Clone,
    Debug,
    PartialEq,
    Serialize,
    Deserialize,
    TypedBuilder,
    ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub date: DateTime<Utc>,
    pub category_id: String,
    #[builder(default)]
    pub attendees: u32,
    #[builder(default)]
    pub favorites: u32,
    #[builder(default)]
    pub average_rating: f64,
    #[builder(default)]
    pub image: Option<String>,
}
