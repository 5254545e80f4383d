//! Clip API handlers.
//!
//! `POST /api/v1/clips` takes the upload form, stores the video, runs the clip
//! pipeline and answers with a `status`-tagged JSON payload. Failures are
//! rendered as a single message and an HTTP status derived from the error.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use mp4trim_core::{
    clip::{ClipError, ClipReport, ClipRequest, OutputSpec, Quality},
    StorageLayout,
};

use crate::metrics::{CLIPS_TOTAL, CLIP_DURATION, UPLOAD_BYTES_TOTAL};
use crate::state::AppState;

/// The only MIME type accepted for uploads.
const ACCEPTED_MIME: &str = "video/mp4";

// ============================================================================
// Request/Response types
// ============================================================================

/// Result of a clip request.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClipResponse {
    Success(ClipSuccess),
    Failure(ClipFailure),
}

#[derive(Debug, Serialize)]
pub struct ClipSuccess {
    pub request_id: String,
    #[serde(flatten)]
    pub report: ClipReport,
    /// Where the clip can be downloaded.
    pub clip_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Stored name of the source, usable as `keep_video` in a later request.
    pub source_name: String,
}

#[derive(Debug, Serialize)]
pub struct ClipFailure {
    pub request_id: String,
    pub code: String,
    pub message: String,
}

/// Parsed upload form.
#[derive(Debug, Default)]
struct ClipForm {
    uploaded: Option<PathBuf>,
    keep_video: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    quality: Quality,
}

/// A request failure together with the status it is reported with.
#[derive(Debug)]
struct Rejection {
    status: StatusCode,
    error: ClipError,
}

impl Rejection {
    fn too_large(max_bytes: u64) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            error: ClipError::invalid_input(format!(
                "Video exceeds the {} MB upload limit",
                max_bytes / (1024 * 1024)
            )),
        }
    }

    fn from_multipart(err: MultipartError, max_bytes: u64) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::too_large(max_bytes)
        } else {
            ClipError::upload_transport(err.body_text()).into()
        }
    }
}

impl From<ClipError> for Rejection {
    fn from(error: ClipError) -> Self {
        Self {
            status: status_for(&error),
            error,
        }
    }
}

/// HTTP status for a clip error.
pub fn status_for(err: &ClipError) -> StatusCode {
    match err {
        ClipError::ToolUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ClipError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        ClipError::InvalidRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ClipError::UnresolvedSource { .. } => StatusCode::NOT_FOUND,
        ClipError::MetadataUnavailable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ClipError::EncodeFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        ClipError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ClipError::UploadTransport { .. } => StatusCode::BAD_REQUEST,
        ClipError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/clips
///
/// Multipart fields: `video`, `start_time`, `end_time`, `width`, `height`,
/// `quality`, `keep_video`.
pub async fn create_clip(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<ClipResponse>) {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("clip_request", request_id = %request_id);

    async move {
        let started = Instant::now();

        match run_clip_request(&state, multipart).await {
            Ok((report, source_name)) => {
                CLIPS_TOTAL.with_label_values(&["success"]).inc();
                CLIP_DURATION.observe(started.elapsed().as_secs_f64());

                let layout = state.layout();
                let clip_url = media_url(layout, &report.output_path).unwrap_or_default();
                let thumbnail_url = report
                    .thumbnail_path
                    .as_deref()
                    .and_then(|p| media_url(layout, p));

                (
                    StatusCode::OK,
                    Json(ClipResponse::Success(ClipSuccess {
                        request_id,
                        report,
                        clip_url,
                        thumbnail_url,
                        source_name,
                    })),
                )
            }
            Err(rejection) => {
                let err = &rejection.error;
                CLIPS_TOTAL.with_label_values(&[err.code()]).inc();

                if rejection.status.is_server_error() {
                    error!(code = err.code(), status = %rejection.status, error = %err, "Clip request failed");
                } else {
                    warn!(code = err.code(), status = %rejection.status, error = %err, "Clip request rejected");
                }

                (
                    rejection.status,
                    Json(ClipResponse::Failure(ClipFailure {
                        request_id,
                        code: err.code().to_string(),
                        message: err.to_string(),
                    })),
                )
            }
        }
    }
    .instrument(span)
    .await
}

async fn run_clip_request(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(ClipReport, String), Rejection> {
    if state.config().retention.sweep_on_request {
        state.sweep().await;
    }

    let multipart = multipart.map_err(|e| {
        ClipError::invalid_input(format!("Expected a multipart/form-data request: {}", e))
    })?;

    let form = read_form(state, multipart).await?;

    let source_path = match (&form.uploaded, &form.keep_video) {
        (Some(path), _) => path.clone(),
        (None, Some(name)) => state.layout().resolve_upload(name)?,
        (None, None) => return Err(ClipError::invalid_input("No video was uploaded").into()),
    };

    let source_name = source_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let request = ClipRequest {
        source_path,
        start_time: form.start_time.unwrap_or_default(),
        end_time: form.end_time.unwrap_or_else(|| "0".to_string()),
        output: OutputSpec {
            width: form.width,
            height: form.height,
            quality: form.quality,
        },
    };

    let report = state.clips().process(request).await?;
    Ok((report, source_name))
}

async fn read_form(state: &AppState, mut multipart: Multipart) -> Result<ClipForm, Rejection> {
    let max_bytes = state.config().upload.max_bytes;
    let mut form = ClipForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                discard_upload(form.uploaded.take()).await;
                return Err(Rejection::from_multipart(e, max_bytes));
            }
        };

        let name = field.name().unwrap_or("").to_string();
        let result = match name.as_str() {
            "video" => match store_upload(state.layout(), field, max_bytes).await {
                Ok(Some(path)) => {
                    discard_upload(form.uploaded.replace(path)).await;
                    Ok(())
                }
                Ok(None) => Ok(()),
                Err(rejection) => Err(rejection),
            },
            "start_time" => read_text(field, max_bytes)
                .await
                .map(|text| form.start_time = Some(text)),
            "end_time" => read_text(field, max_bytes)
                .await
                .map(|text| form.end_time = Some(text)),
            "width" => read_text(field, max_bytes)
                .await
                .map(|text| form.width = parse_dimension(&text)),
            "height" => read_text(field, max_bytes)
                .await
                .map(|text| form.height = parse_dimension(&text)),
            "quality" => read_text(field, max_bytes)
                .await
                .map(|text| form.quality = Quality::from_name(&text)),
            "keep_video" => read_text(field, max_bytes).await.map(|text| {
                let text = text.trim();
                form.keep_video = (!text.is_empty()).then(|| text.to_string());
            }),
            _ => Ok(()),
        };

        if let Err(rejection) = result {
            discard_upload(form.uploaded.take()).await;
            return Err(rejection);
        }
    }

    Ok(form)
}

/// Streams the `video` field into the uploads directory.
///
/// Returns `None` when the browser submitted the form without choosing a file.
async fn store_upload(
    layout: &StorageLayout,
    mut field: Field<'_>,
    max_bytes: u64,
) -> Result<Option<PathBuf>, Rejection> {
    let file_name = field.file_name().unwrap_or("").to_string();
    if file_name.is_empty() {
        return Ok(None);
    }

    let content_type = field.content_type().unwrap_or("").to_string();
    if content_type != ACCEPTED_MIME {
        return Err(ClipError::invalid_input(format!(
            "Only MP4 videos are accepted (got {})",
            if content_type.is_empty() {
                "no content type"
            } else {
                content_type.as_str()
            }
        ))
        .into());
    }

    let path = layout.allocate_upload_path(&file_name).await?;
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(ClipError::from)?;
    let mut written: u64 = 0;

    let outcome: Result<(), Rejection> = async {
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| Rejection::from_multipart(e, max_bytes))?
        {
            written += chunk.len() as u64;
            if written > max_bytes {
                return Err(Rejection::too_large(max_bytes));
            }
            file.write_all(&chunk).await.map_err(ClipError::from)?;
        }
        file.flush().await.map_err(ClipError::from)?;
        Ok(())
    }
    .await;

    if let Err(rejection) = outcome {
        discard_upload(Some(path)).await;
        return Err(rejection);
    }

    if written == 0 {
        discard_upload(Some(path)).await;
        return Err(ClipError::invalid_input("The uploaded video is empty").into());
    }

    UPLOAD_BYTES_TOTAL.inc_by(written);
    info!(file = %path.display(), bytes = written, "Stored upload");
    Ok(Some(path))
}

async fn read_text(field: Field<'_>, max_bytes: u64) -> Result<String, Rejection> {
    field
        .text()
        .await
        .map_err(|e| Rejection::from_multipart(e, max_bytes))
}

async fn discard_upload(path: Option<PathBuf>) {
    if let Some(path) = path {
        let _ = tokio::fs::remove_file(&path).await;
    }
}

/// Positive integer or nothing; empty and non-numeric values are absent.
fn parse_dimension(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

fn media_url(layout: &StorageLayout, file: &Path) -> Option<String> {
    layout.public_path(file).map(|p| format!("/media/{}", p))
}
