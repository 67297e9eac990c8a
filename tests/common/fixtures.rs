//! Synthetic landmark streams

use super::constants::*;
use serde_json::{json, Value};
use stroke_analysis::landmarks::{BodyLandmark, LANDMARK_COUNT};

/// A right-side rowing pose with a 90 degree knee and the wrist at `wrist_y`,
/// as the JSON array the API accepts.
pub fn rowing_pose(wrist_y: f64) -> Value {
    let mut landmarks = vec![(0.5, 0.5); LANDMARK_COUNT];
    let points = [
        (BodyLandmark::Nose, (0.5, 0.1)),
        (BodyLandmark::RightShoulder, (0.5, 0.3)),
        (BodyLandmark::LeftHip, (0.45, 0.6)),
        (BodyLandmark::RightHip, (0.55, 0.6)),
        (BodyLandmark::RightKnee, (0.75, 0.6)),
        (BodyLandmark::RightAnkle, (0.75, 0.8)),
        (BodyLandmark::RightFootIndex, (0.8, 0.8)),
        (BodyLandmark::RightWrist, (0.6, wrist_y)),
    ];
    for (landmark, point) in points {
        landmarks[landmark.index()] = point;
    }
    Value::Array(
        landmarks
            .into_iter()
            .map(|(x, y)| json!({ "x": x, "y": y, "visibility": 0.99 }))
            .collect(),
    )
}

/// Frames whose wrist height bottoms out at every STROKE_CATCH_FRAMES entry.
pub fn stroke_session() -> Vec<Value> {
    (0..STROKE_SESSION_FRAMES)
        .map(|i| {
            let distance = STROKE_CATCH_FRAMES
                .iter()
                .map(|&m| i.abs_diff(m))
                .min()
                .unwrap_or(0);
            rowing_pose(0.2 + 0.01 * distance as f64)
        })
        .collect()
}
