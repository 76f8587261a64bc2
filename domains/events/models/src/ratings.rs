use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use utoipa::ToSchema;

/// One submitted rating. Append-only; `date` is the submission instant
/// assigned by the server.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    TypedBuilder,
    ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub event_id: String,
    pub rating: i32,
    pub date: DateTime<Utc>,
}
