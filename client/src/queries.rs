use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use events_models::Category;
use events_responses::EventWithCategory;
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::{
    api::{EventsApi, EventsParams},
    error::ClientResult,
};

const EVENTS_TTL: Duration = Duration::from_secs(5 * 60);
const CATEGORIES_TTL: Duration = Duration::from_secs(10 * 60);
const EVENTS_CAPACITY: u64 = 256;

/// Identity of one list read. Two reads with the same key are the same
/// query, so a page fetched ahead of time is served from cache when the
/// user lands on it, and a response that arrives after the filters moved
/// on lands under its own key without clobbering the current one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventsQueryKey {
    pub page: u64,
    pub limit: u64,
    pub q: Option<String>,
    pub category_id: Option<String>,
    pub location_like: Option<String>,
    pub date_gte: Option<DateTime<Utc>>,
    pub date_lte: Option<DateTime<Utc>>,
}

impl EventsQueryKey {
    fn params(&self) -> EventsParams {
        EventsParams {
            page: Some(self.page),
            limit: Some(self.limit),
            q: self.q.clone(),
            category_id: self.category_id.clone(),
            location_like: self.location_like.clone(),
            date_gte: self.date_gte,
            date_lte: self.date_lte,
        }
    }
}

/// Cached reads over [`EventsApi`]. Event pages stay fresh for five
/// minutes, the category list for ten; failures are returned to the
/// caller and never cached.
#[derive(Clone)]
pub struct EventQueries {
    api: Arc<EventsApi>,
    events: Cache<EventsQueryKey, Arc<Vec<EventWithCategory>>>,
    categories: Cache<(), Arc<Vec<Category>>>,
}

impl EventQueries {
    pub fn new(api: EventsApi) -> Self {
        Self {
            api: Arc::new(api),
            events: Cache::builder()
                .max_capacity(EVENTS_CAPACITY)
                .time_to_live(EVENTS_TTL)
                .build(),
            categories: Cache::builder()
                .max_capacity(1)
                .time_to_live(CATEGORIES_TTL)
                .build(),
        }
    }

    pub fn api(&self) -> &EventsApi {
        &self.api
    }

    #[instrument(skip(self))]
    pub async fn events_page(
        &self, key: &EventsQueryKey,
    ) -> ClientResult<Arc<Vec<EventWithCategory>>> {
        if let Some(cached) = self.events.get(key).await {
            debug!(page = key.page, "events page served from cache");
            return Ok(cached);
        }

        let events = Arc::new(self.api.events(&key.params()).await?);
        self.events.insert(key.clone(), events.clone()).await;
        Ok(events)
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> ClientResult<Arc<Vec<Category>>> {
        if let Some(cached) = self.categories.get(&()).await {
            debug!("categories served from cache");
            return Ok(cached);
        }

        let categories = Arc::new(self.api.categories().await?);
        self.categories.insert((), categories.clone()).await;
        Ok(categories)
    }

    /// Drops one page so the next read refetches it.
    pub async fn invalidate_page(&self, key: &EventsQueryKey) {
        self.events.invalidate(key).await;
    }

    /// Drops every cached page, for after a write that changes the list.
    pub fn invalidate_events(&self) {
        self.events.invalidate_all();
    }
}
