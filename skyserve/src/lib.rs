//! Authoritative night-sky analysis server.
//!
//! The client runs its own pre-upload gate check for responsiveness, but
//! this server re-runs the identical `skygate` pipeline on the submitted
//! bytes and its verdict is the one that counts. Rejections carry the full
//! numeric diagnostics so they are auditable rather than a bare boolean.

pub mod analysis;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use skygate::{gate_image_bytes, Constellation, GateError, LuminanceStats, Star};
use starmap::{PixmapSurface, RenderError, RenderOptions, Scene};
use thiserror::Error;
use tracing::info;

/// Maximum accepted upload size.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared server state: an optional font for rendered text.
#[derive(Clone, Default)]
pub struct AppState {
    font: Option<Arc<Vec<u8>>>,
}

impl AppState {
    pub fn new(font: Option<Vec<u8>>) -> Self {
        Self {
            font: font.map(Arc::new),
        }
    }
}

/// Request failures surfaced as structured JSON errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no image provided")]
    MissingImage,
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("only image uploads are accepted")]
    NotAnImage,
    #[error("file size must be less than 10MB")]
    PayloadTooLarge,
    #[error("could not validate image: {0}")]
    CouldNotValidate(#[from] GateError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::NotAnImage => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            // Distinct from a policy rejection: validation never happened
            ApiError::CouldNotValidate(_) => StatusCode::BAD_REQUEST,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}

/// Health check payload for the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthInfo {
    pub status: String,
    pub service: String,
    pub timestamp: u64,
}

/// Policy rejection: validation succeeded, thresholds did not hold.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionResponse {
    pub admitted: bool,
    pub metrics: LuminanceStats,
    pub error: String,
}

/// Scene description for the render endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub stars: Vec<Star>,
    #[serde(default)]
    pub constellations: Vec<Constellation>,
    #[serde(default)]
    pub star_labels: Vec<String>,
    #[serde(default)]
    pub options: RenderOptions,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/validate-image", post(validate_image))
        .route("/api/analyze-image", post(analyze_image))
        .route("/api/render", post(render_scene))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .with_state(state)
}

async fn health() -> Json<HealthInfo> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Json(HealthInfo {
        status: "ok".to_string(),
        service: "skyserve".to_string(),
        timestamp,
    })
}

/// Pull the `image` field out of a multipart submission, enforcing the
/// content-type and size pre-checks the upload form also applies.
async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        if let Some(content_type) = field.content_type() {
            if !content_type.starts_with("image/") {
                return Err(ApiError::NotAnImage);
            }
        }
        let bytes = field.bytes().await?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }
        return Ok(bytes);
    }
    Err(ApiError::MissingImage)
}

/// Authoritative gate re-check on the submitted bytes.
async fn validate_image(mut multipart: Multipart) -> Result<Response, ApiError> {
    let bytes = read_image_field(&mut multipart).await?;
    let decision = gate_image_bytes(&bytes)?;

    if decision.admitted {
        info!(bytes = bytes.len(), "image admitted");
        Ok((StatusCode::OK, Json(decision)).into_response())
    } else {
        info!(bytes = bytes.len(), ?decision.metrics, "image rejected by policy");
        Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(RejectionResponse {
                admitted: false,
                metrics: decision.metrics,
                error: "not a night-sky image".to_string(),
            }),
        )
            .into_response())
    }
}

/// Gate, then hand the payload to the analysis generator.
async fn analyze_image(mut multipart: Multipart) -> Result<Response, ApiError> {
    let bytes = read_image_field(&mut multipart).await?;
    let decision = gate_image_bytes(&bytes)?;

    if !decision.admitted {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(RejectionResponse {
                admitted: false,
                metrics: decision.metrics,
                error: "not a night-sky image".to_string(),
            }),
        )
            .into_response());
    }

    let analysis = analysis::generate(bytes.len());
    info!(stars = analysis.star_count, "analysis generated");
    Ok((StatusCode::OK, Json(analysis)).into_response())
}

/// Render a star field scene to PNG.
///
/// The layout pass runs synchronously and the PNG is fully encoded before
/// the response is built, so the exported snapshot is always complete.
async fn render_scene(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, ApiError> {
    let mut surface = PixmapSurface::new(request.options.width, request.options.height)?;
    if let Some(font) = &state.font {
        surface.set_font(font.as_ref().clone())?;
    }

    let scene = Scene::layout(
        &request.stars,
        &request.constellations,
        &request.star_labels,
        request.options,
        &mut rand::rng(),
    );
    scene.render(&mut surface);
    let png = surface.encode_png()?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
