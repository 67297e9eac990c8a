//! Analysis HTTP routes.
//!
//! Provides endpoints for:
//! - Submitting a landmark stream for analysis
//! - Looking up a stored summary by output file name
//! - Downloading every stored summary as CSV

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::analysis::AnalysisError;
use crate::landmarks::LandmarkFrame;
use crate::server::metrics::record_analysis;
use crate::server::state::{GuardedPipeline, ServerState};
use crate::server::ServerConfig;
use crate::store::export_csv;

/// Video containers accepted as analysis inputs.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["mp4", "avi", "mov"];

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalysisRequestBody {
    #[serde(default)]
    pub subject_label: String,
    /// Name of the uploaded video, used only for its extension
    #[serde(default)]
    pub input_filename: String,
    pub fps: f64,
    pub frames: Vec<LandmarkFrame>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Lowercased extension of `filename` when it is an accepted video type.
fn allowed_extension(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// Status code and metrics outcome for a failed run.
fn classify_error(err: &AnalysisError) -> (StatusCode, &'static str) {
    match err {
        AnalysisError::NoDetection { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "no_detection"),
        AnalysisError::InvalidFrameRate(_) | AnalysisError::Landmarks(_) => {
            (StatusCode::BAD_REQUEST, "invalid_input")
        }
        AnalysisError::Collaborator { .. } | AnalysisError::Store(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "error")
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /analyses - Analyze a landmark stream and store its summary
async fn post_analysis(
    State(pipeline): State<GuardedPipeline>,
    State(config): State<ServerConfig>,
    Json(body): Json<AnalysisRequestBody>,
) -> Response {
    let subject_label = body.subject_label.trim().to_string();
    if subject_label.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Player name is required");
    }
    if body.input_filename.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No selected file");
    }
    let Some(extension) = allowed_extension(&body.input_filename) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid file type, allowed types: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        );
    };
    if body.frames.len() > config.max_frames_per_request {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "Too many frames: {} (max {})",
                body.frames.len(),
                config.max_frames_per_request
            ),
        );
    }

    let input_id = format!("{}.{}", Uuid::new_v4().simple(), extension);
    let frame_count = body.frames.len();
    debug!(
        "Analyzing {} frames of {:?} as {}",
        frame_count, body.input_filename, input_id
    );

    let start = Instant::now();
    let fps = body.fps;
    let frames = body.frames;
    let run = tokio::task::spawn_blocking(move || {
        pipeline.run_batch(&frames, fps, &input_id, &subject_label)
    })
    .await;

    match run {
        Ok(Ok(report)) => {
            record_analysis("success", frame_count, start.elapsed());
            (StatusCode::CREATED, Json(report)).into_response()
        }
        Ok(Err(err)) => {
            let (status, outcome) = classify_error(&err);
            record_analysis(outcome, frame_count, start.elapsed());
            if status.is_server_error() {
                error!("Analysis failed: {:#}", anyhow::Error::new(err));
                error_response(status, "Analysis failed")
            } else {
                warn!("Analysis rejected: {}", err);
                error_response(status, err.to_string())
            }
        }
        Err(join_error) => {
            record_analysis("error", frame_count, start.elapsed());
            error!("Analysis task failed: {}", join_error);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Analysis failed")
        }
    }
}

/// GET /analyses/{output_id} - Look up a stored summary
async fn get_analysis(
    State(pipeline): State<GuardedPipeline>,
    Path(output_id): Path<String>,
) -> Response {
    match pipeline.lookup_summary(&output_id) {
        Ok(Some(summary)) => Json(summary).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "No results found for this video"),
        Err(e) => {
            error!("Failed to look up {}: {:#}", output_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read results")
        }
    }
}

/// GET /results/download - Every stored summary as a CSV attachment
async fn download_results(State(pipeline): State<GuardedPipeline>) -> Response {
    let mut csv = Vec::new();
    match export_csv(pipeline.store().as_ref(), &mut csv) {
        Ok(0) => error_response(StatusCode::NOT_FOUND, "No results available"),
        Ok(_) => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"results.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to export results: {:#}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read results")
        }
    }
}

pub fn analysis_routes() -> Router<ServerState> {
    Router::new()
        .route("/analyses", post(post_analysis))
        .route("/analyses/{output_id}", get(get_analysis))
        .route("/results/download", get(download_results))
}
