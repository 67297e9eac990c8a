//! Biomechanical analysis of landmark streams.

pub mod accumulator;
pub mod cycles;
mod error;
pub mod geometry;
mod models;
mod pipeline;
pub mod video;

pub use accumulator::{FrameAccumulator, FrameMeasurement, DEFAULT_FREEZE_THRESHOLD_DEG};
pub use error::AnalysisError;
pub use models::{summary_timestamp, AnalysisReport, AnalysisSummary, JointFreezeTimes};
pub use pipeline::{output_id_for, AnalysisPipeline, AnalysisSettings};
pub use video::{AnnotationSink, FrameAnnotation, FrameSource, PoseEstimator, PoseSession, VideoMetadata};
