//! Run results.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Per-video result as persisted by a [`crate::store::ResultStore`].
///
/// Metrics use `0.0` as the "no data" sentinel: a run without detectable
/// cycles reports a stroke cycle time of `0.0`, just like a run whose knee
/// angle could never be measured reports a knee angle of `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub timestamp: DateTime<Utc>,
    pub input_id: String,
    pub output_id: String,
    pub subject_label: String,
    pub stroke_cycle_time: f64,
    pub pelvis_angle: f64,
    pub knee_angle: f64,
    pub ankle_angle: f64,
}

/// Current time at the precision the stores persist.
pub fn summary_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Seconds each joint spent below the freeze threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JointFreezeTimes {
    pub hip: f64,
    pub knee: f64,
    pub ankle: f64,
}

/// Everything a finished run produced. Only `summary` is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub summary: AnalysisSummary,
    pub frames_total: usize,
    pub frames_detected: usize,
    pub cycle_durations: Vec<f64>,
    pub mean_hip_angle: Option<f64>,
    pub mean_torso_angle: Option<f64>,
    pub freeze_times: JointFreezeTimes,
}
