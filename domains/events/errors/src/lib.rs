use common_errors::AppError;
use json_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Event not found: {event_id}")]
    NotFound { event_id: String },
}

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Category not found: {category_id}")]
    NotFound { category_id: String },
}

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: String },
    #[error("Rating must be a number")]
    InvalidRating,
}

impl From<EventError> for RatingError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Store(store_err) => Self::Store(store_err),
            EventError::NotFound { event_id } => {
                Self::EventNotFound { event_id }
            }
        }
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound { .. } => {
                AppError::not_found("Event not found")
            }
            EventError::Store(store_err) => {
                AppError::internal_server_error(&format!(
                    "Store error: {store_err}"
                ))
            }
        }
    }
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound { .. } => {
                AppError::not_found("Category not found")
            }
            CategoryError::Store(store_err) => {
                AppError::internal_server_error(&format!(
                    "Store error: {store_err}"
                ))
            }
        }
    }
}

impl From<RatingError> for AppError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::EventNotFound { .. } => {
                AppError::not_found("Event not found")
            }
            RatingError::InvalidRating => {
                AppError::bad_request("Rating must be a number")
            }
            RatingError::Store(store_err) => {
                AppError::internal_server_error(&format!(
                    "Store error: {store_err}"
                ))
            }
        }
    }
}
