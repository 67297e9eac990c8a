//! Orchestrates one analysis run from frames to a persisted summary.

use super::accumulator::{FrameAccumulator, FrameMeasurement, DEFAULT_FREEZE_THRESHOLD_DEG};
use super::error::AnalysisError;
use super::models::{AnalysisReport, AnalysisSummary};
use super::video::{AnnotationSink, FrameAnnotation, FrameSource, PoseEstimator, PoseSession};
use crate::landmarks::{BodySide, LandmarkFrame};
use crate::store::ResultStore;
use anyhow::Result;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

const ANNOTATED_SUFFIX: &str = "_annotated.avi";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    pub side: BodySide,
    pub freeze_threshold_deg: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            side: BodySide::default(),
            freeze_threshold_deg: DEFAULT_FREEZE_THRESHOLD_DEG,
        }
    }
}

/// Output identifier for an input: its stem followed by `_annotated.avi`.
pub fn output_id_for(input_id: &str) -> String {
    let stem = Path::new(input_id)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(input_id);
    format!("{}{}", stem, ANNOTATED_SUFFIX)
}

fn validate_fps(fps: f64) -> Result<(), AnalysisError> {
    if fps.is_finite() && fps > 0.0 {
        Ok(())
    } else {
        Err(AnalysisError::InvalidFrameRate(fps))
    }
}

fn collaborator(stage: &'static str) -> impl FnOnce(anyhow::Error) -> AnalysisError {
    move |source| AnalysisError::Collaborator { stage, source }
}

/// Runs analyses against a shared result store. Each run owns its own
/// accumulator, so a pipeline can serve concurrent runs.
#[derive(Clone)]
pub struct AnalysisPipeline {
    store: Arc<dyn ResultStore>,
    settings: AnalysisSettings,
}

impl AnalysisPipeline {
    pub fn new(store: Arc<dyn ResultStore>, settings: AnalysisSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    fn new_accumulator(&self) -> FrameAccumulator {
        FrameAccumulator::new(self.settings.side, self.settings.freeze_threshold_deg)
    }

    /// Consumes `frames` in order, then persists and returns the run report.
    ///
    /// `fps` is checked before the first frame is pulled. Nothing is stored
    /// when the run fails.
    pub fn run_analysis<I>(
        &self,
        frames: I,
        fps: f64,
        input_id: &str,
        subject_label: &str,
    ) -> Result<AnalysisReport, AnalysisError>
    where
        I: IntoIterator<Item = LandmarkFrame>,
    {
        validate_fps(fps)?;
        let mut accumulator = self.new_accumulator();
        for (frame_index, frame) in frames.into_iter().enumerate() {
            frame.validate(frame_index)?;
            accumulator.observe(&frame);
        }
        self.complete(accumulator, fps, input_id, subject_label)
    }

    /// Same as [`Self::run_analysis`] for frames already in memory. Geometry
    /// is computed in parallel; observation still follows frame order.
    pub fn run_batch(
        &self,
        frames: &[LandmarkFrame],
        fps: f64,
        input_id: &str,
        subject_label: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        validate_fps(fps)?;
        for (frame_index, frame) in frames.iter().enumerate() {
            frame.validate(frame_index)?;
        }

        let side = self.settings.side;
        let measurements: Vec<Option<FrameMeasurement>> = frames
            .par_iter()
            .map(|frame| FrameMeasurement::measure(frame, side))
            .collect();

        let mut accumulator = self.new_accumulator();
        for measurement in measurements {
            accumulator.observe_measurement(measurement);
        }
        self.complete(accumulator, fps, input_id, subject_label)
    }

    /// Decodes, estimates and annotates a whole video.
    ///
    /// The estimator session lives for this call only and is dropped on every
    /// exit path. Frames reach `sink` in decode order.
    pub fn run_video_analysis<S, E, K>(
        &self,
        source: &mut S,
        estimator: &mut E,
        sink: &mut K,
        input_id: &str,
        subject_label: &str,
    ) -> Result<AnalysisReport, AnalysisError>
    where
        S: FrameSource,
        E: PoseEstimator<S::Frame>,
        K: AnnotationSink<S::Frame>,
    {
        let metadata = source.metadata();
        validate_fps(metadata.fps)?;
        info!(
            "Analyzing {} ({}x{} at {} fps)",
            input_id, metadata.width, metadata.height, metadata.fps
        );

        let side = self.settings.side;
        let mut accumulator = self.new_accumulator();
        {
            let mut session = estimator
                .start_session()
                .map_err(collaborator("pose estimator"))?;
            let mut frame_index = 0;
            while let Some(image) = source.next_frame().map_err(collaborator("frame source"))? {
                let landmarks = session
                    .estimate(&image)
                    .map_err(collaborator("pose estimator"))?;
                landmarks.validate(frame_index)?;

                let measurement = FrameMeasurement::measure(&landmarks, side);
                let annotation =
                    FrameAnnotation::new(frame_index, side, landmarks, measurement.as_ref());
                sink.write_frame(image, &annotation)
                    .map_err(collaborator("annotation sink"))?;
                accumulator.observe_measurement(measurement);
                frame_index += 1;
            }
        }
        sink.finish().map_err(collaborator("annotation sink"))?;

        self.complete(accumulator, metadata.fps, input_id, subject_label)
    }

    pub fn lookup_summary(&self, output_id: &str) -> Result<Option<AnalysisSummary>> {
        self.store.find_by_output_id(output_id)
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    fn complete(
        &self,
        accumulator: FrameAccumulator,
        fps: f64,
        input_id: &str,
        subject_label: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        let output_id = output_id_for(input_id);
        let report = accumulator.finalize(fps, input_id, &output_id, subject_label)?;
        if report.cycle_durations.is_empty() {
            warn!("No stroke cycles found in {}, stroke cycle time stored as 0", input_id);
        }
        self.store.append(&report.summary)?;

        let summary = &report.summary;
        info!(
            "Analysis {} done: {}/{} frames detected, cycle {:.3}s, pelvis {:.2}, knee {:.2}, ankle {:.2}",
            summary.output_id,
            report.frames_detected,
            report.frames_total,
            summary.stroke_cycle_time,
            summary.pelvis_angle,
            summary.knee_angle,
            summary.ankle_angle
        );
        Ok(report)
    }
}
