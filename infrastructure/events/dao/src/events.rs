use std::collections::HashSet;

use async_trait::async_trait;
use events_commands::{CreateEventCommand, ReplaceEventCommand};
use events_errors::EventError;
use events_models::Event;
use events_queries::EventFilters;
use json_store::{Collection, GenericDao, JsonStore};
use tracing::instrument;

use crate::ids::next_epoch_id;

#[derive(Clone)]
pub struct EventDao {
    events: Collection<Event>,
}

impl EventDao {
    pub fn new(store: JsonStore) -> Self {
        Self {
            events: store.collection("events"),
        }
    }
}

#[async_trait]
impl GenericDao for EventDao {
    type CreateRequest = CreateEventCommand;
    type Error = EventError;
    type ID = String;
    type Model = Event;
    type UpdateRequest = ReplaceEventCommand;

    async fn find_by_id(&self, id: Self::ID) -> Result<Event, EventError> {
        self.events
            .find(|e| e.id == id)
            .await?
            .ok_or(EventError::NotFound { event_id: id })
    }

    async fn all(&self) -> Result<Vec<Event>, EventError> {
        Ok(self.events.all().await?)
    }

    async fn create(
        &self, req: CreateEventCommand,
    ) -> Result<Event, EventError> {
        let taken: HashSet<String> = self
            .events
            .all()
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect();

        let event = Event {
            id: next_epoch_id(&taken),
            name: req.name,
            description: req.description,
            location: req.location,
            date: req.date,
            category_id: req.category_id,
            attendees: 0,
            favorites: 0,
            average_rating: 0.0,
            image: req.image,
        };

        self.events.insert(&event).await?;
        Ok(event)
    }

    /// Full replace: every stored field except the id comes from the
    /// request.
    async fn update(
        &self, id: Self::ID, req: ReplaceEventCommand,
    ) -> Result<Event, EventError> {
        let event_id = id.clone();
        let replaced = self
            .events
            .update_where(
                |e| e.id == id,
                move |e| {
                    *e = Event {
                        id: e.id.clone(),
                        name: req.name,
                        description: req.description,
                        location: req.location,
                        date: req.date,
                        category_id: req.category_id,
                        attendees: req.attendees,
                        favorites: req.favorites,
                        average_rating: req.average_rating,
                        image: req.image,
                    };
                },
            )
            .await?;

        replaced.ok_or(EventError::NotFound { event_id })
    }

    async fn delete(&self, id: Self::ID) -> Result<(), EventError> {
        let removed = self.events.remove_where(|e| e.id == id).await?;
        if removed == 0 {
            return Err(EventError::NotFound { event_id: id });
        }
        Ok(())
    }
}

impl EventDao {
    /// Filtered scan in insertion order. Text filters are case-insensitive
    /// substring matches; date bounds are inclusive.
    #[instrument(skip(self))]
    pub async fn find_with_filters(
        &self, filters: &EventFilters,
    ) -> Result<Vec<Event>, EventError> {
        let q = filters.q.as_ref().map(|s| s.to_lowercase());
        let location = filters.location.as_ref().map(|s| s.to_lowercase());

        let events = self
            .events
            .filter(|e| {
                if let Some(q) = &q {
                    if !e.name.to_lowercase().contains(q)
                        && !e.description.to_lowercase().contains(q)
                    {
                        return false;
                    }
                }
                if let Some(category_id) = &filters.category_id {
                    if &e.category_id != category_id {
                        return false;
                    }
                }
                if let Some(location) = &location {
                    if !e.location.to_lowercase().contains(location) {
                        return false;
                    }
                }
                if let Some(from) = filters.date_from {
                    if e.date < from {
                        return false;
                    }
                }
                if let Some(to) = filters.date_to {
                    if e.date > to {
                        return false;
                    }
                }
                true
            })
            .await?;

        Ok(events)
    }

    /// Bumps the attendee counter and returns the count as it was before
    /// the increment. The response contract exposes the old value.
    #[instrument(skip(self))]
    pub async fn increment_attendees(
        &self, id: &str,
    ) -> Result<u32, EventError> {
        let updated = self
            .events
            .update_where(|e| e.id == id, |e| e.attendees += 1)
            .await?
            .ok_or_else(|| {
                EventError::NotFound {
                    event_id: id.to_string(),
                }
            })?;
        Ok(updated.attendees - 1)
    }

    /// Same pre-increment contract as [`Self::increment_attendees`], for
    /// the favorite counter.
    #[instrument(skip(self))]
    pub async fn increment_favorites(
        &self, id: &str,
    ) -> Result<u32, EventError> {
        let updated = self
            .events
            .update_where(|e| e.id == id, |e| e.favorites += 1)
            .await?
            .ok_or_else(|| {
                EventError::NotFound {
                    event_id: id.to_string(),
                }
            })?;
        Ok(updated.favorites - 1)
    }

    #[instrument(skip(self))]
    pub async fn set_average_rating(
        &self, id: &str, average: f64,
    ) -> Result<Event, EventError> {
        self.events
            .update_where(|e| e.id == id, |e| e.average_rating = average)
            .await?
            .ok_or_else(|| {
                EventError::NotFound {
                    event_id: id.to_string(),
                }
            })
    }
}
