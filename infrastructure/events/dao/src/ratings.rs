use std::collections::HashSet;

use chrono::Utc;
use events_errors::RatingError;
use events_models::Rating;
use json_store::{Collection, JsonStore, StoreError};
use tracing::instrument;

use crate::ids::next_epoch_id;

#[derive(Clone)]
pub struct RatingDao {
    ratings: Collection<Rating>,
}

impl RatingDao {
    pub fn new(store: JsonStore) -> Self {
        Self {
            ratings: store.collection("ratings"),
        }
    }

    /// Appends a rating with a server-assigned id and submission instant.
    /// Ratings are append-only; there is no update or delete per record.
    #[instrument(skip(self))]
    pub async fn create(
        &self, event_id: &str, rating: i32,
    ) -> Result<Rating, RatingError> {
        let taken: HashSet<String> = self
            .ratings
            .all()
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();

        let record = Rating {
            id: next_epoch_id(&taken),
            event_id: event_id.to_string(),
            rating,
            date: Utc::now(),
        };

        self.ratings.insert(&record).await?;
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn for_event(
        &self, event_id: &str,
    ) -> Result<Vec<Rating>, StoreError> {
        self.ratings.filter(|r| r.event_id == event_id).await
    }

    /// Drops every rating attached to the event; returns how many went.
    #[instrument(skip(self))]
    pub async fn remove_for_event(
        &self, event_id: &str,
    ) -> Result<usize, StoreError> {
        self.ratings.remove_where(|r| r.event_id == event_id).await
    }
}
