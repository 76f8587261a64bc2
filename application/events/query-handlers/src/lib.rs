use events_dao::{CategoryDao, EventDao};
use events_errors::{CategoryError, EventError};
use events_models::Category;
use events_queries::{GetCategoryQuery, GetEventQuery, ListEventsQuery};
use events_responses::{EventPage, EventWithCategory};
use json_store::{GenericDao, JsonStore};
use tracing::instrument;

/// Page size applied when `page` is given without an explicit limit.
const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Clone)]
pub struct GetEventQueryHandler {
    event_dao: EventDao,
    category_dao: CategoryDao,
}

impl GetEventQueryHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            event_dao: EventDao::new(store.clone()),
            category_dao: CategoryDao::new(store),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: GetEventQuery,
    ) -> Result<EventWithCategory, EventError> {
        let event = self.event_dao.find_by_id(query.event_id).await?;

        let category = if query.expand_category {
            self.category_dao.lookup(&event.category_id).await?
        } else {
            None
        };

        Ok(EventWithCategory { event, category })
    }
}

#[derive(Clone)]
pub struct ListEventsQueryHandler {
    event_dao: EventDao,
    category_dao: CategoryDao,
}

impl ListEventsQueryHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            event_dao: EventDao::new(store.clone()),
            category_dao: CategoryDao::new(store),
        }
    }

    /// Filtered list read. `page` turns on 1-based pagination with a
    /// default limit of 10; a bare `limit` slices from the start of the
    /// filtered set; with neither the whole set comes back. `total`
    /// always counts the filtered set before slicing.
    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: ListEventsQuery,
    ) -> Result<EventPage, EventError> {
        let events = self.event_dao.find_with_filters(&query.filters).await?;
        let total = events.len();

        let (events, sliced) = match (query.page, query.limit) {
            (Some(page), limit) => {
                let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
                let start =
                    page.max(1).saturating_sub(1).saturating_mul(limit);
                let page_items: Vec<_> = events
                    .into_iter()
                    .skip(start as usize)
                    .take(limit as usize)
                    .collect();
                (page_items, true)
            }
            (None, Some(limit)) => {
                let slice: Vec<_> =
                    events.into_iter().take(limit as usize).collect();
                (slice, true)
            }
            (None, None) => (events, false),
        };

        let events = if query.expand_category {
            let categories = self.category_dao.all().await?;
            events
                .into_iter()
                .map(|event| {
                    let category = categories
                        .iter()
                        .find(|c| c.id == event.category_id)
                        .cloned();
                    EventWithCategory { event, category }
                })
                .collect()
        } else {
            events.into_iter().map(EventWithCategory::from).collect()
        };

        Ok(EventPage {
            events,
            total,
            sliced,
        })
    }
}

#[derive(Clone)]
pub struct ListCategoriesQueryHandler {
    category_dao: CategoryDao,
}

impl ListCategoriesQueryHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            category_dao: CategoryDao::new(store),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<Vec<Category>, CategoryError> {
        Ok(self.category_dao.all().await?)
    }
}

#[derive(Clone)]
pub struct GetCategoryQueryHandler {
    category_dao: CategoryDao,
}

impl GetCategoryQueryHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            category_dao: CategoryDao::new(store),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: GetCategoryQuery,
    ) -> Result<Category, CategoryError> {
        self.category_dao.find_by_id(&query.category_id).await
    }
}
