//! Rowing stroke analysis
//!
//! Turns per-frame body landmarks into joint angles, pelvis orientation and
//! stroke-cycle timing, and keeps one summary per analysed video.

pub mod analysis;
pub mod config;
pub mod landmarks;
pub mod server;
pub mod sqlite_persistence;
pub mod store;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisError, AnalysisPipeline, AnalysisReport, AnalysisSettings, AnalysisSummary};
pub use landmarks::{BodySide, LandmarkFrame};
pub use server::{run_server, RequestsLoggingLevel};
pub use store::{open_store, ResultStore, StoreBackend};
