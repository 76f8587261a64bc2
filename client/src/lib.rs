//! Data layer for piazza front ends: a typed API client, cached queries,
//! the list-page controller, and the local engagement flags file.

pub mod api;
pub mod error;
pub mod flags;
pub mod list_page;
pub mod queries;

pub use api::{EventsApi, EventsParams};
pub use error::{ClientError, ClientResult};
pub use flags::EngagementFlags;
pub use list_page::{EVENTS_PER_PAGE, Effect, ListPageController, Period};
pub use queries::{EventQueries, EventsQueryKey};
