pub mod upload;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{delete, get, post, put},
};
use chrono::{DateTime, Utc};
use common_errors::AppError;
use events_command_handlers::{
    AddFavoriteHandler, CreateEventHandler, DeleteEventHandler,
    MarkAttendanceHandler, ReplaceEventHandler, SubmitRatingHandler,
};
use events_commands::{
    AddFavoriteCommand, CreateEventCommand, DeleteEventCommand,
    MarkAttendanceCommand, ReplaceEventCommand, SubmitRatingCommand,
};
use events_models::{Category, Event, Rating};
use events_queries::{
    EventFilters, GetCategoryQuery, GetEventQuery, ListEventsQuery,
};
use events_query_handlers::{
    GetCategoryQueryHandler, GetEventQueryHandler,
    ListCategoriesQueryHandler, ListEventsQueryHandler,
};
use events_responses::{
    AttendanceResponse, EventWithCategory, FavoriteResponse,
};
use json_store::JsonStore;
use serde::Deserialize;
use tower_http::services::ServeDir;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::upload::{UploadService, upload_image};

#[derive(Clone)]
pub struct EventServices {
    pub create_event: CreateEventHandler,
    pub replace_event: ReplaceEventHandler,
    pub delete_event: DeleteEventHandler,
    pub mark_attendance: MarkAttendanceHandler,
    pub add_favorite: AddFavoriteHandler,
    pub submit_rating: SubmitRatingHandler,

    pub get_event: GetEventQueryHandler,
    pub list_events: ListEventsQueryHandler,
    pub list_categories: ListCategoriesQueryHandler,
    pub get_category: GetCategoryQueryHandler,
}

impl EventServices {
    pub fn new(store: JsonStore) -> Self {
        Self {
            create_event: CreateEventHandler::new(store.clone()),
            replace_event: ReplaceEventHandler::new(store.clone()),
            delete_event: DeleteEventHandler::new(store.clone()),
            mark_attendance: MarkAttendanceHandler::new(store.clone()),
            add_favorite: AddFavoriteHandler::new(store.clone()),
            submit_rating: SubmitRatingHandler::new(store.clone()),
            get_event: GetEventQueryHandler::new(store.clone()),
            list_events: ListEventsQueryHandler::new(store.clone()),
            list_categories: ListCategoriesQueryHandler::new(store.clone()),
            get_category: GetCategoryQueryHandler::new(store),
        }
    }
}

pub struct EventHandlers;

impl EventHandlers {
    pub fn routes() -> Router<EventServices> {
        Router::new()
            .route("/", get(list_events))
            .route("/", post(create_event))
            .route("/{id}", get(get_event))
            .route("/{id}", put(replace_event))
            .route("/{id}", delete(delete_event))
            .route("/{id}/attendees", post(mark_attendance))
            .route("/{id}/favorites", post(add_favorite))
            .route("/{id}/ratings", post(submit_rating))
    }
}

/// The full API surface: event CRUD and engagement actions under
/// `/events`, the category catalog, image upload and the static uploads
/// directory.
pub fn api_router(
    store: JsonStore, uploads_dir: impl Into<std::path::PathBuf>,
) -> Router {
    let uploads_dir = uploads_dir.into();
    let services = EventServices::new(store);
    let uploads = UploadService::new(uploads_dir.clone());

    Router::new()
        .nest("/events", EventHandlers::routes())
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category))
        .with_state(services)
        .route("/upload", post(upload_image).with_state(uploads))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
}

/// Raw list-read parameters. `_page` and `_limit` travel as strings and
/// parse leniently: a non-numeric `_page` reads as page 1, a non-numeric
/// `_limit` is dropped.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct EventsListParams {
    pub q: Option<String>,
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,
    pub location_like: Option<String>,
    pub date_gte: Option<DateTime<Utc>>,
    pub date_lte: Option<DateTime<Utc>>,
    #[serde(rename = "_page")]
    pub page: Option<String>,
    #[serde(rename = "_limit")]
    pub limit: Option<String>,
    #[serde(rename = "_expand")]
    pub expand: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ExpandParams {
    #[serde(rename = "_expand")]
    pub expand: Option<String>,
}

fn expands_category(expand: Option<&str>) -> bool {
    expand == Some("category")
}

impl From<EventsListParams> for ListEventsQuery {
    fn from(params: EventsListParams) -> Self {
        let page = params
            .page
            .as_deref()
            .map(|raw| raw.trim().parse::<u64>().unwrap_or(1));
        let limit = params
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok());

        ListEventsQuery {
            filters: EventFilters {
                q: params.q,
                category_id: params.category_id,
                location: params.location_like,
                date_from: params.date_gte,
                date_to: params.date_lte,
            },
            page,
            limit,
            expand_category: expands_category(params.expand.as_deref()),
        }
    }
}

#[utoipa::path(
    get,
    path = "/events",
    params(EventsListParams),
    responses(
        (status = 200, description = "The filtered events, optionally one page of them", body = Vec<EventWithCategory>),
        (status = 400, description = "Malformed filter values", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn list_events(
    State(services): State<EventServices>,
    Query(params): Query<EventsListParams>,
) -> Result<(HeaderMap, Json<Vec<EventWithCategory>>), AppError> {
    let page = services.list_events.execute(params.into()).await?;

    let mut headers = HeaderMap::new();
    if page.sliced {
        headers.insert("x-total-count", HeaderValue::from(page.total));
    }

    Ok((headers, Json(page.events)))
}

#[utoipa::path(
    get,
    path = "/events/{id}",
    params(
        ("id" = String, Path, description = "Event ID"),
        ExpandParams
    ),
    responses(
        (status = 200, description = "Event found", body = EventWithCategory),
        (status = 404, description = "Event not found", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn get_event(
    State(services): State<EventServices>, Path(id): Path<String>,
    Query(params): Query<ExpandParams>,
) -> Result<Json<EventWithCategory>, AppError> {
    let query = GetEventQuery {
        event_id: id,
        expand_category: expands_category(params.expand.as_deref()),
    };
    let event = services.get_event.execute(query).await?;
    Ok(Json(event))
}

#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventCommand,
    responses(
        (status = 201, description = "Event created with zeroed counters", body = Event),
        (status = 400, description = "Invalid request data", body = common_errors::ApiErrorResponse),
        (status = 422, description = "Validation error", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn create_event(
    State(services): State<EventServices>,
    Json(command): Json<CreateEventCommand>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = services.create_event.execute(command).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    put,
    path = "/events/{id}",
    request_body = ReplaceEventCommand,
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event replaced", body = Event),
        (status = 404, description = "Event not found", body = common_errors::ApiErrorResponse),
        (status = 400, description = "Invalid request data", body = common_errors::ApiErrorResponse),
        (status = 422, description = "Validation error", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn replace_event(
    State(services): State<EventServices>, Path(id): Path<String>,
    Json(mut command): Json<ReplaceEventCommand>,
) -> Result<Json<Event>, AppError> {
    command.event_id = id;
    let event = services.replace_event.execute(command).await?;
    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/events/{id}",
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event and its ratings deleted"),
        (status = 404, description = "Event not found", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn delete_event(
    State(services): State<EventServices>, Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let command = DeleteEventCommand { event_id: id };
    services.delete_event.execute(command).await?;
    Ok(Json(serde_json::json!({})))
}

#[utoipa::path(
    post,
    path = "/events/{id}/attendees",
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Attendance recorded; the count reads as it stood before", body = AttendanceResponse),
        (status = 404, description = "Event not found", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn mark_attendance(
    State(services): State<EventServices>, Path(id): Path<String>,
) -> Result<Json<AttendanceResponse>, AppError> {
    let command = MarkAttendanceCommand { event_id: id };
    let response = services.mark_attendance.execute(command).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/events/{id}/favorites",
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Favorite recorded; the count reads as it stood before", body = FavoriteResponse),
        (status = 404, description = "Event not found", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn add_favorite(
    State(services): State<EventServices>, Path(id): Path<String>,
) -> Result<Json<FavoriteResponse>, AppError> {
    let command = AddFavoriteCommand { event_id: id };
    let response = services.add_favorite.execute(command).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/events/{id}/ratings",
    request_body = SubmitRatingCommand,
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 201, description = "Rating stored and the event average refreshed", body = Rating),
        (status = 400, description = "Rating is not a number", body = common_errors::ApiErrorResponse),
        (status = 404, description = "Event not found", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn submit_rating(
    State(services): State<EventServices>, Path(id): Path<String>,
    Json(mut command): Json<SubmitRatingCommand>,
) -> Result<(StatusCode, Json<Rating>), AppError> {
    command.event_id = id;
    let rating = services.submit_rating.execute(command).await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "Every category in catalog order", body = Vec<Category>),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "categories"
)]
#[instrument(skip_all)]
pub async fn list_categories(
    State(services): State<EventServices>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = services.list_categories.execute().await?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, description = "Category not found", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "categories"
)]
#[instrument(skip_all)]
pub async fn get_category(
    State(services): State<EventServices>, Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    let query = GetCategoryQuery { category_id: id };
    let category = services.get_category.execute(query).await?;
    Ok(Json(category))
}
