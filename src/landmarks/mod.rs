//! Pose-estimator landmark model and stream readers.

pub mod models;
pub mod reader;

pub use models::*;
pub use reader::read_jsonl;
