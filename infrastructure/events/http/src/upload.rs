use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use axum::extract::{
    State,
    multipart::{Multipart, MultipartError},
};
use chrono::Utc;
use common_errors::AppError;
use events_responses::UploadResponse;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("upload I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile => {
                AppError::bad_request("No file uploaded")
            }
            UploadError::Multipart(_) => {
                AppError::bad_request("Malformed upload request")
            }
            UploadError::Io(io_err) => {
                AppError::internal_server_error(&format!(
                    "Upload failed: {io_err}"
                ))
            }
        }
    }
}

/// Writes uploaded images into the directory the server also serves under
/// `/uploads`.
#[derive(Clone)]
pub struct UploadService {
    dir: PathBuf,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    /// Stores the first `image` field of the request under an
    /// epoch-millis name that keeps the original file extension.
    async fn store_image(
        &self, mut multipart: Multipart,
    ) -> Result<UploadResponse, UploadError> {
        while let Some(field) = multipart.next_field().await? {
            if field.name() != Some("image") {
                continue;
            }

            let original = field.file_name().unwrap_or_default().to_owned();
            let bytes = field.bytes().await?;
            let filename = stored_filename(&original);
            tokio::fs::write(self.dir.join(&filename), &bytes).await?;

            info!(
                upload.file = %filename,
                upload.bytes = bytes.len(),
                "stored uploaded image"
            );
            return Ok(UploadResponse {
                url: format!("/uploads/{filename}"),
            });
        }

        Err(UploadError::MissingFile)
    }
}

fn stored_filename(original: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    match Path::new(original).extension().and_then(OsStr::to_str) {
        Some(ext) => format!("{millis}.{ext}"),
        None => millis.to_string(),
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "No file uploaded", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "uploads"
)]
#[instrument(skip_all)]
pub async fn upload_image(
    State(service): State<UploadService>, multipart: Multipart,
) -> Result<axum::Json<UploadResponse>, AppError> {
    let response = service.store_image(multipart).await?;
    Ok(axum::Json(response))
}
