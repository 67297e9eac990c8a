//! Running per-metric state for one analysis run.

use super::cycles::{cycle_durations, mean_cycle_duration};
use super::error::AnalysisError;
use super::geometry::{joint_angles, pelvis_orientation, torso_angle, JointAngleSet};
use super::models::{summary_timestamp, AnalysisReport, AnalysisSummary, JointFreezeTimes};
use crate::landmarks::{BodySide, LandmarkFrame};
use tracing::debug;

/// Default angle, in degrees, under which a joint counts as frozen.
pub const DEFAULT_FREEZE_THRESHOLD_DEG: f64 = 5.0;

/// Geometry extracted from one detected frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMeasurement {
    pub angles: JointAngleSet,
    pub pelvis_angle: Option<f64>,
    pub torso_angle: Option<f64>,
    pub wrist_y: Option<f64>,
}

impl FrameMeasurement {
    /// `None` for a frame without a detection.
    pub fn measure(frame: &LandmarkFrame, side: BodySide) -> Option<Self> {
        if !frame.is_detected() {
            return None;
        }
        Some(Self {
            angles: joint_angles(frame, side),
            pelvis_angle: pelvis_orientation(frame),
            torso_angle: torso_angle(frame, side),
            wrist_y: frame.get(side.wrist()).map(|wrist| wrist.y),
        })
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Collects frame measurements in arrival order and turns them into a report.
///
/// Frames without a detection advance the frame counter only; they never
/// contribute to an average.
#[derive(Debug)]
pub struct FrameAccumulator {
    side: BodySide,
    freeze_threshold_deg: f64,
    frames_total: usize,
    frames_detected: usize,
    pelvis_angles: Vec<f64>,
    hip_angles: Vec<f64>,
    knee_angles: Vec<f64>,
    ankle_angles: Vec<f64>,
    torso_angles: Vec<f64>,
    wrist_series: Vec<f64>,
    frozen_frames: [usize; 3],
}

impl FrameAccumulator {
    pub fn new(side: BodySide, freeze_threshold_deg: f64) -> Self {
        Self {
            side,
            freeze_threshold_deg,
            frames_total: 0,
            frames_detected: 0,
            pelvis_angles: Vec::new(),
            hip_angles: Vec::new(),
            knee_angles: Vec::new(),
            ankle_angles: Vec::new(),
            torso_angles: Vec::new(),
            wrist_series: Vec::new(),
            frozen_frames: [0; 3],
        }
    }

    pub fn side(&self) -> BodySide {
        self.side
    }

    pub fn frames_total(&self) -> usize {
        self.frames_total
    }

    pub fn frames_detected(&self) -> usize {
        self.frames_detected
    }

    pub fn observe(&mut self, frame: &LandmarkFrame) {
        let measurement = FrameMeasurement::measure(frame, self.side);
        self.observe_measurement(measurement);
    }

    /// Applies a measurement computed ahead of time. Calls must follow frame order.
    pub fn observe_measurement(&mut self, measurement: Option<FrameMeasurement>) {
        self.frames_total += 1;
        let Some(measurement) = measurement else {
            return;
        };
        self.frames_detected += 1;

        if let Some(pelvis) = measurement.pelvis_angle {
            self.pelvis_angles.push(pelvis);
        }
        if let Some(wrist_y) = measurement.wrist_y {
            self.wrist_series.push(wrist_y);
        }
        if let Some(torso) = measurement.torso_angle {
            self.torso_angles.push(torso);
        }

        let joints = [
            (measurement.angles.hip, &mut self.hip_angles),
            (measurement.angles.knee, &mut self.knee_angles),
            (measurement.angles.ankle, &mut self.ankle_angles),
        ];
        for (slot, (angle, values)) in joints.into_iter().enumerate() {
            if let Some(angle) = angle {
                values.push(angle);
                if angle < self.freeze_threshold_deg {
                    self.frozen_frames[slot] += 1;
                }
            }
        }
    }

    /// Builds the run report. Fails if no frame ever had a detection.
    pub fn finalize(
        self,
        fps: f64,
        input_id: &str,
        output_id: &str,
        subject_label: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        if self.frames_detected == 0 {
            return Err(AnalysisError::NoDetection {
                frames: self.frames_total,
            });
        }
        if !(fps.is_finite() && fps > 0.0) {
            return Err(AnalysisError::InvalidFrameRate(fps));
        }

        let stroke_cycle_time = mean_cycle_duration(&self.wrist_series, fps);
        if stroke_cycle_time.is_none() {
            debug!(
                "Fewer than two catch events in {} wrist samples, reporting no cycle time",
                self.wrist_series.len()
            );
        }
        let pelvis_angle = mean(&self.pelvis_angles);
        let knee_angle = mean(&self.knee_angles);
        let ankle_angle = mean(&self.ankle_angles);

        let summary = AnalysisSummary {
            timestamp: summary_timestamp(),
            input_id: input_id.to_string(),
            output_id: output_id.to_string(),
            subject_label: subject_label.to_string(),
            stroke_cycle_time: stroke_cycle_time.unwrap_or(0.0),
            pelvis_angle: pelvis_angle.unwrap_or(0.0),
            knee_angle: knee_angle.unwrap_or(0.0),
            ankle_angle: ankle_angle.unwrap_or(0.0),
        };

        let [hip_frozen, knee_frozen, ankle_frozen] = self.frozen_frames;
        Ok(AnalysisReport {
            summary,
            frames_total: self.frames_total,
            frames_detected: self.frames_detected,
            cycle_durations: cycle_durations(&self.wrist_series, fps),
            mean_hip_angle: mean(&self.hip_angles),
            mean_torso_angle: mean(&self.torso_angles),
            freeze_times: JointFreezeTimes {
                hip: hip_frozen as f64 / fps,
                knee: knee_frozen as f64 / fps,
                ankle: ankle_frozen as f64 / fps,
            },
        })
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new(BodySide::default(), DEFAULT_FREEZE_THRESHOLD_DEG)
    }
}
