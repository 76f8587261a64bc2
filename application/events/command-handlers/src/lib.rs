use events_commands::{
    AddFavoriteCommand, CreateEventCommand, DeleteEventCommand,
    MarkAttendanceCommand, ReplaceEventCommand, SubmitRatingCommand,
};
use events_dao::{EventDao, RatingDao};
use events_errors::{EventError, RatingError};
use events_models::{Event, Rating};
use events_responses::{AttendanceResponse, FavoriteResponse};
use json_store::{GenericDao, JsonStore};
use tracing::instrument;

#[derive(Clone)]
pub struct CreateEventHandler {
    event_dao: EventDao,
}

impl CreateEventHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            event_dao: EventDao::new(store),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, command: CreateEventCommand,
    ) -> Result<Event, EventError> {
        self.event_dao.create(command).await
    }
}

#[derive(Clone)]
pub struct ReplaceEventHandler {
    event_dao: EventDao,
}

impl ReplaceEventHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            event_dao: EventDao::new(store),
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, command: ReplaceEventCommand,
    ) -> Result<Event, EventError> {
        self.event_dao.update(command.event_id.clone(), command).await
    }
}

#[derive(Clone)]
pub struct DeleteEventHandler {
    event_dao: EventDao,
    rating_dao: RatingDao,
}

impl DeleteEventHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            event_dao: EventDao::new(store.clone()),
            rating_dao: RatingDao::new(store),
        }
    }

    /// Removes the event together with every rating attached to it.
    #[instrument(skip(self))]
    pub async fn execute(
        &self, command: DeleteEventCommand,
    ) -> Result<(), EventError> {
        self.event_dao.delete(command.event_id.clone()).await?;

        let dropped =
            self.rating_dao.remove_for_event(&command.event_id).await?;
        if dropped > 0 {
            tracing::debug!(
                event_id = %command.event_id,
                ratings = dropped,
                "dropped ratings of deleted event"
            );
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct MarkAttendanceHandler {
    event_dao: EventDao,
}

impl MarkAttendanceHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            event_dao: EventDao::new(store),
        }
    }

    /// The response reports the attendee count as it stood before this
    /// attendance was recorded.
    #[instrument(skip(self))]
    pub async fn execute(
        &self, command: MarkAttendanceCommand,
    ) -> Result<AttendanceResponse, EventError> {
        let attendees =
            self.event_dao.increment_attendees(&command.event_id).await?;

        Ok(AttendanceResponse { attendees })
    }
}

#[derive(Clone)]
pub struct AddFavoriteHandler {
    event_dao: EventDao,
}

impl AddFavoriteHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            event_dao: EventDao::new(store),
        }
    }

    /// Same pre-increment response contract as attendance marking.
    #[instrument(skip(self))]
    pub async fn execute(
        &self, command: AddFavoriteCommand,
    ) -> Result<FavoriteResponse, EventError> {
        let favorites =
            self.event_dao.increment_favorites(&command.event_id).await?;

        Ok(FavoriteResponse { favorites })
    }
}

#[derive(Clone)]
pub struct SubmitRatingHandler {
    event_dao: EventDao,
    rating_dao: RatingDao,
}

impl SubmitRatingHandler {
    pub fn new(store: JsonStore) -> Self {
        Self {
            event_dao: EventDao::new(store.clone()),
            rating_dao: RatingDao::new(store),
        }
    }

    /// Appends one rating and refreshes the event's cached average,
    /// rounded to one decimal. Nothing is persisted when the event is
    /// missing or the submitted rating does not read as a number.
    #[instrument(skip(self))]
    pub async fn execute(
        &self, command: SubmitRatingCommand,
    ) -> Result<Rating, RatingError> {
        let value =
            coerce_rating(&command.rating).ok_or(RatingError::InvalidRating)?;

        self.event_dao.find_by_id(command.event_id.clone()).await?;

        let rating = self.rating_dao.create(&command.event_id, value).await?;

        let ratings = self.rating_dao.for_event(&command.event_id).await?;
        let average = if ratings.is_empty() {
            0.0
        } else {
            let sum: i64 = ratings.iter().map(|r| i64::from(r.rating)).sum();
            let mean = sum as f64 / ratings.len() as f64;
            (mean * 10.0).round() / 10.0
        };
        self.event_dao
            .set_average_rating(&command.event_id, average)
            .await?;

        Ok(rating)
    }
}

/// Integer coercion for submitted ratings: a JSON number or a numeric
/// string is accepted, any fraction is truncated toward zero.
fn coerce_rating(value: &serde_json::Value) -> Option<i32> {
    let number = match value {
        serde_json::Value::Number(number) => number.as_f64()?,
        serde_json::Value::String(raw) => raw.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() {
        return None;
    }
    let truncated = number.trunc();
    if truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
        return None;
    }

    Some(truncated as i32)
}
