use crate::landmarks::LandmarkError;
use thiserror::Error;

/// Errors that end an analysis run. Nothing is persisted when one occurs.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No valid landmarks detected in {frames} frames")]
    NoDetection { frames: usize },

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f64),

    #[error(transparent)]
    Landmarks(#[from] LandmarkError),

    #[error("{stage} failed: {source}")]
    Collaborator {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}
