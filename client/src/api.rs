use std::{ffi::OsStr, path::Path};

use chrono::{DateTime, Utc};
use events_commands::{CreateEventCommand, ReplaceEventCommand};
use events_models::{Category, Event, Rating};
use events_responses::{
    AttendanceResponse, EventWithCategory, FavoriteResponse, UploadResponse,
};
use reqwest::{
    Response,
    multipart::{Form, Part},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use tracing::instrument;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Page size the list read falls back to when the caller does not pick one.
pub const DEFAULT_LIMIT: u64 = 12;

/// What the catalog shows when an event has no image of its own.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-event.jpg";

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "avif"];

/// Optional filters and paging for the list read. Every field left `None`
/// stays off the wire except `page`/`limit`, which fall back to defaults
/// so the server always answers one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EventsParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub q: Option<String>,
    pub category_id: Option<String>,
    pub location_like: Option<String>,
    pub date_gte: Option<DateTime<Utc>>,
    pub date_lte: Option<DateTime<Utc>>,
}

/// Typed wrapper over the HTTP API: one method per endpoint, decoding into
/// the shared domain types. List reads always ask for category expansion,
/// the way the original catalog client did.
#[derive(Clone)]
pub struct EventsApi {
    http: reqwest::Client,
    base: Url,
}

impl EventsApi {
    /// Parses the base URL; a missing trailing slash is added so endpoint
    /// paths join under it rather than replacing its last segment.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base(&self) -> &Url { &self.base }

    #[instrument(skip(self))]
    pub async fn events(
        &self, params: &EventsParams,
    ) -> ClientResult<Vec<EventWithCategory>> {
        let mut query: Vec<(&str, String)> = vec![
            ("_page", params.page.unwrap_or(1).to_string()),
            ("_limit", params.limit.unwrap_or(DEFAULT_LIMIT).to_string()),
            ("_expand", "category".to_string()),
        ];
        if let Some(q) = &params.q {
            query.push(("q", q.clone()));
        }
        if let Some(category_id) = &params.category_id {
            query.push(("categoryId", category_id.clone()));
        }
        if let Some(location) = &params.location_like {
            query.push(("location_like", location.clone()));
        }
        if let Some(gte) = params.date_gte {
            query.push(("date_gte", gte.to_rfc3339()));
        }
        if let Some(lte) = params.date_lte {
            query.push(("date_lte", lte.to_rfc3339()));
        }

        let response = self
            .http
            .get(self.base.join("events")?)
            .query(&query)
            .send()
            .await?;
        self.decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn event(&self, id: &str) -> ClientResult<EventWithCategory> {
        let response = self
            .http
            .get(self.base.join(&format!("events/{id}"))?)
            .query(&[("_expand", "category")])
            .send()
            .await?;
        self.decode(response).await
    }

    #[instrument(skip_all)]
    pub async fn create_event(
        &self, command: &CreateEventCommand,
    ) -> ClientResult<Event> {
        let response = self
            .http
            .post(self.base.join("events")?)
            .json(command)
            .send()
            .await?;
        self.decode(response).await
    }

    #[instrument(skip(self, command))]
    pub async fn replace_event(
        &self, id: &str, command: &ReplaceEventCommand,
    ) -> ClientResult<Event> {
        let response = self
            .http
            .put(self.base.join(&format!("events/{id}"))?)
            .json(command)
            .send()
            .await?;
        self.decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn delete_event(&self, id: &str) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.base.join(&format!("events/{id}"))?)
            .send()
            .await?;
        let _: serde_json::Value = self.decode(response).await?;
        Ok(())
    }

    /// The response carries the attendee count as it stood before this
    /// call; the stored counter is one higher.
    #[instrument(skip(self))]
    pub async fn mark_attendance(
        &self, id: &str,
    ) -> ClientResult<AttendanceResponse> {
        let response = self
            .http
            .post(self.base.join(&format!("events/{id}/attendees"))?)
            .send()
            .await?;
        self.decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn add_favorite(
        &self, id: &str,
    ) -> ClientResult<FavoriteResponse> {
        let response = self
            .http
            .post(self.base.join(&format!("events/{id}/favorites"))?)
            .send()
            .await?;
        self.decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn submit_rating(
        &self, id: &str, rating: i32,
    ) -> ClientResult<Rating> {
        let response = self
            .http
            .post(self.base.join(&format!("events/{id}/ratings"))?)
            .json(&json!({ "rating": rating }))
            .send()
            .await?;
        self.decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        let response =
            self.http.get(self.base.join("categories")?).send().await?;
        self.decode(response).await
    }

    /// Image-type and size limits are enforced here, before any bytes go
    /// out, the way the original upload form did.
    #[instrument(skip(self, bytes))]
    pub async fn upload_image(
        &self, filename: &str, bytes: Vec<u8>,
    ) -> ClientResult<UploadResponse> {
        if !is_image_filename(filename) {
            return Err(ClientError::InvalidUpload(
                "file must be an image".to_string(),
            ));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ClientError::InvalidUpload(
                "image must be smaller than 5 MB".to_string(),
            ));
        }

        let part = Part::bytes(bytes).file_name(filename.to_owned());
        let form = Form::new().part("image", part);
        let response = self
            .http
            .post(self.base.join("upload")?)
            .multipart(form)
            .send()
            .await?;
        self.decode(response).await
    }

    /// Absolute `http(s)` URLs pass through, server-relative paths join
    /// the API base, and a missing image falls back to the placeholder.
    pub fn resolve_image_url(&self, image: Option<&str>) -> String {
        match image {
            None | Some("") => PLACEHOLDER_IMAGE.to_string(),
            Some(path) if path.starts_with("http") => path.to_string(),
            Some(path) => self
                .base
                .join(path)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| format!("{}{}", self.base, path)),
        }
    }

    async fn decode<T: DeserializeOwned>(
        &self, response: Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(ClientError::Status { status, message });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// The server's only error shape.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

fn is_image_filename(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> EventsApi {
        EventsApi::new("http://localhost:8081").unwrap()
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let api = EventsApi::new("http://localhost:8081/api").unwrap();
        assert_eq!(api.base().path(), "/api/");
    }

    #[test]
    fn test_resolve_image_url_placeholder() {
        assert_eq!(api().resolve_image_url(None), PLACEHOLDER_IMAGE);
        assert_eq!(api().resolve_image_url(Some("")), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_resolve_image_url_absolute_passthrough() {
        let url = "https://cdn.example.com/poster.png";
        assert_eq!(api().resolve_image_url(Some(url)), url);
    }

    #[test]
    fn test_resolve_image_url_joins_relative_path() {
        assert_eq!(
            api().resolve_image_url(Some("/uploads/123.png")),
            "http://localhost:8081/uploads/123.png"
        );
    }

    #[test]
    fn test_image_filename_check() {
        assert!(is_image_filename("poster.png"));
        assert!(is_image_filename("poster.JPEG"));
        assert!(!is_image_filename("notes.txt"));
        assert!(!is_image_filename("no-extension"));
    }
}
