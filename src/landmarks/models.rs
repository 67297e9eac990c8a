//! Landmark types shared with the pose estimator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of landmark slots produced per detection.
pub const LANDMARK_COUNT: usize = 33;

/// Landmark slots in the order the pose estimator emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    const ALL: [BodyLandmark; LANDMARK_COUNT] = [
        BodyLandmark::Nose,
        BodyLandmark::LeftEyeInner,
        BodyLandmark::LeftEye,
        BodyLandmark::LeftEyeOuter,
        BodyLandmark::RightEyeInner,
        BodyLandmark::RightEye,
        BodyLandmark::RightEyeOuter,
        BodyLandmark::LeftEar,
        BodyLandmark::RightEar,
        BodyLandmark::MouthLeft,
        BodyLandmark::MouthRight,
        BodyLandmark::LeftShoulder,
        BodyLandmark::RightShoulder,
        BodyLandmark::LeftElbow,
        BodyLandmark::RightElbow,
        BodyLandmark::LeftWrist,
        BodyLandmark::RightWrist,
        BodyLandmark::LeftPinky,
        BodyLandmark::RightPinky,
        BodyLandmark::LeftIndex,
        BodyLandmark::RightIndex,
        BodyLandmark::LeftThumb,
        BodyLandmark::RightThumb,
        BodyLandmark::LeftHip,
        BodyLandmark::RightHip,
        BodyLandmark::LeftKnee,
        BodyLandmark::RightKnee,
        BodyLandmark::LeftAnkle,
        BodyLandmark::RightAnkle,
        BodyLandmark::LeftHeel,
        BodyLandmark::RightHeel,
        BodyLandmark::LeftFootIndex,
        BodyLandmark::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Which side of the body joint angles are measured on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BodySide {
    Left,
    #[default]
    Right,
}

impl BodySide {
    pub fn shoulder(self) -> BodyLandmark {
        match self {
            BodySide::Left => BodyLandmark::LeftShoulder,
            BodySide::Right => BodyLandmark::RightShoulder,
        }
    }

    pub fn hip(self) -> BodyLandmark {
        match self {
            BodySide::Left => BodyLandmark::LeftHip,
            BodySide::Right => BodyLandmark::RightHip,
        }
    }

    pub fn knee(self) -> BodyLandmark {
        match self {
            BodySide::Left => BodyLandmark::LeftKnee,
            BodySide::Right => BodyLandmark::RightKnee,
        }
    }

    pub fn ankle(self) -> BodyLandmark {
        match self {
            BodySide::Left => BodyLandmark::LeftAnkle,
            BodySide::Right => BodyLandmark::RightAnkle,
        }
    }

    pub fn toe(self) -> BodyLandmark {
        match self {
            BodySide::Left => BodyLandmark::LeftFootIndex,
            BodySide::Right => BodyLandmark::RightFootIndex,
        }
    }

    pub fn wrist(self) -> BodyLandmark {
        match self {
            BodySide::Left => BodyLandmark::LeftWrist,
            BodySide::Right => BodyLandmark::RightWrist,
        }
    }

    /// Shoulder-hip, hip-knee and knee-ankle segments, as drawn on annotated frames.
    pub fn skeleton_connections(self) -> [(BodyLandmark, BodyLandmark); 3] {
        [
            (self.shoulder(), self.hip()),
            (self.hip(), self.knee()),
            (self.knee(), self.ankle()),
        ]
    }
}

impl std::fmt::Display for BodySide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BodySide::Left => write!(f, "left"),
            BodySide::Right => write!(f, "right"),
        }
    }
}

/// One tracked body point. Coordinates are normalized image-plane values or
/// pixels; a run must not mix the two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: 1.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LandmarkError {
    #[error("Frame {frame_index} has {actual} landmarks, expected {expected}")]
    MalformedFrame {
        frame_index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Landmarks for a single video frame, or nothing when the estimator failed.
///
/// Serialized as a JSON array of landmarks, `null` standing for no detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<Landmark>>", into = "Option<Vec<Landmark>>")]
pub enum LandmarkFrame {
    Detected(Vec<Landmark>),
    NoDetection,
}

impl From<Option<Vec<Landmark>>> for LandmarkFrame {
    fn from(value: Option<Vec<Landmark>>) -> Self {
        match value {
            Some(landmarks) => LandmarkFrame::Detected(landmarks),
            None => LandmarkFrame::NoDetection,
        }
    }
}

impl From<LandmarkFrame> for Option<Vec<Landmark>> {
    fn from(value: LandmarkFrame) -> Self {
        match value {
            LandmarkFrame::Detected(landmarks) => Some(landmarks),
            LandmarkFrame::NoDetection => None,
        }
    }
}

impl LandmarkFrame {
    pub fn is_detected(&self) -> bool {
        matches!(self, LandmarkFrame::Detected(_))
    }

    pub fn landmarks(&self) -> Option<&[Landmark]> {
        match self {
            LandmarkFrame::Detected(landmarks) => Some(landmarks),
            LandmarkFrame::NoDetection => None,
        }
    }

    /// Landmark in the given slot. `None` for no-detection frames.
    pub fn get(&self, landmark: BodyLandmark) -> Option<&Landmark> {
        self.landmarks()?.get(landmark.index())
    }

    /// Checks the estimator contract: a detection carries every landmark slot.
    pub fn validate(&self, frame_index: usize) -> Result<(), LandmarkError> {
        match self {
            LandmarkFrame::Detected(landmarks) if landmarks.len() != LANDMARK_COUNT => {
                Err(LandmarkError::MalformedFrame {
                    frame_index,
                    expected: LANDMARK_COUNT,
                    actual: landmarks.len(),
                })
            }
            _ => Ok(()),
        }
    }
}
