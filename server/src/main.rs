use std::net::SocketAddr;

use axum::{
    Router, http::StatusCode, response::IntoResponse, routing::get,
};
use events_models::Event;
use json_store::{JsonStore, StoreConfig, connect_json_store};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Opening the event store...");

    let store_config = StoreConfig::new(
        std::env::var("PIAZZA_DB").unwrap_or_else(|_| "db.json".into()),
    );
    connect_json_store(&store_config).await?;
    info!("JSON store ready");

    let uploads_dir = std::env::var("PIAZZA_UPLOADS_DIR")
        .unwrap_or_else(|_| "uploads".into());
    tokio::fs::create_dir_all(&uploads_dir).await?;
    info!(uploads.dir = %uploads_dir, "Uploads directory ready");

    let store = JsonStore::from_global();

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(events_http::api_router(store, uploads_dir));

    let app = app
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/docs"))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PIAZZA_PORT")
        .unwrap_or_else(|_| "8081".to_string())
        .parse()
        .unwrap_or(8081);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("🚀 Piazza server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        events_http::list_events,
        events_http::get_event,
        events_http::create_event,
        events_http::replace_event,
        events_http::delete_event,
        events_http::mark_attendance,
        events_http::add_favorite,
        events_http::submit_rating,
        events_http::list_categories,
        events_http::get_category,
        events_http::upload::upload_image
    ),
    components(
        schemas(
            events_models::Event,
            events_models::Category,
            events_models::Rating,
            events_responses::EventWithCategory,
            events_responses::AttendanceResponse,
            events_responses::FavoriteResponse,
            events_responses::UploadResponse,
            events_http::EventsListParams,
            events_commands::CreateEventCommand,
            events_commands::ReplaceEventCommand,
            events_commands::SubmitRatingCommand,
            common_errors::ApiErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "events", description = "Event catalog and engagement endpoints"),
        (name = "categories", description = "Category catalog endpoints"),
        (name = "uploads", description = "Event image upload endpoints")
    ),
    info(
        title = "Piazza API",
        description = "Local events catalog API",
        version = "1.0.0"
    )
)]
struct ApiDoc;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check successful with store status", body = String)
    ),
    tag = "health"
)]
async fn health_check() -> impl IntoResponse {
    let store = JsonStore::from_global();
    match store.collection::<Event>("events").all().await {
        Ok(events) => (
            StatusCode::OK,
            format!("OK - {} events in the catalog", events.len()),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Store read failed: {err}"),
        ),
    }
}
