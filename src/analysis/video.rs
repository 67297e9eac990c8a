//! Collaborators driven by a video run: frame decoding, pose estimation and
//! annotated-frame output. The analysis core only sees these traits.

use super::geometry::JointAngleSet;
use super::accumulator::FrameMeasurement;
use crate::landmarks::{BodyLandmark, BodySide, LandmarkFrame};
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

/// Sequential pull source of decoded frames.
pub trait FrameSource {
    type Frame;

    fn metadata(&self) -> VideoMetadata;

    /// `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>>;
}

/// Estimator state for one run. Released when dropped.
pub trait PoseSession<F> {
    fn estimate(&mut self, frame: &F) -> Result<LandmarkFrame>;
}

pub trait PoseEstimator<F> {
    type Session: PoseSession<F>;

    /// Acquires a session scoped to a single run.
    fn start_session(&mut self) -> Result<Self::Session>;
}

/// What a renderer needs to draw on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnnotation {
    pub frame_index: usize,
    pub landmarks: LandmarkFrame,
    pub pelvis_angle: Option<f64>,
    pub angles: JointAngleSet,
    /// Limb segments of the analysed side; empty without a detection.
    pub connections: Vec<(BodyLandmark, BodyLandmark)>,
}

impl FrameAnnotation {
    pub fn new(
        frame_index: usize,
        side: BodySide,
        landmarks: LandmarkFrame,
        measurement: Option<&FrameMeasurement>,
    ) -> Self {
        let connections = match measurement {
            Some(_) => side.skeleton_connections().to_vec(),
            None => Vec::new(),
        };
        Self {
            frame_index,
            landmarks,
            pelvis_angle: measurement.and_then(|m| m.pelvis_angle),
            angles: measurement.map(|m| m.angles).unwrap_or_default(),
            connections,
        }
    }
}

/// Receives every frame, in arrival order, with its annotation.
pub trait AnnotationSink<F> {
    fn write_frame(&mut self, frame: F, annotation: &FrameAnnotation) -> Result<()>;

    /// Called once after the last frame of a successful run.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
