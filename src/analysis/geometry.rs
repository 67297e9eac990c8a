//! Per-frame joint geometry.
//!
//! Every function here is pure and works on the image plane only (`x`, `y`).
//! Degenerate input, such as coincident landmarks or non-finite coordinates,
//! yields `None` rather than an error.

use crate::landmarks::{BodyLandmark, BodySide, Landmark, LandmarkFrame};
use serde::Serialize;

/// Unit vector from `from` towards `to`, `None` when the points coincide.
///
/// Components are rescaled before normalizing so neither huge nor tiny
/// coordinates overflow or underflow.
fn direction(from: &Landmark, to: &Landmark) -> Option<(f64, f64)> {
    let (mut dx, mut dy) = (to.x - from.x, to.y - from.y);
    if !(dx.is_finite() && dy.is_finite()) {
        dx = to.x / 2.0 - from.x / 2.0;
        dy = to.y / 2.0 - from.y / 2.0;
    }
    let scale = dx.abs().max(dy.abs());
    if scale == 0.0 {
        return None;
    }
    let (sx, sy) = (dx / scale, dy / scale);
    let norm = sx.hypot(sy);
    Some((sx / norm, sy / norm))
}

/// Angle in degrees at vertex `b` between the rays `b->a` and `b->c`.
///
/// Always in `[0, 180]`; `None` when either ray has zero length.
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark) -> Option<f64> {
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return None;
    }
    let (ux, uy) = direction(b, a)?;
    let (vx, vy) = direction(b, c)?;
    let dot = ux * vx + uy * vy;
    let cross = ux * vy - uy * vx;
    Some(cross.abs().atan2(dot).to_degrees().clamp(0.0, 180.0))
}

/// Hip, knee and ankle angles for one frame. `None` marks an undefined joint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JointAngleSet {
    pub hip: Option<f64>,
    pub knee: Option<f64>,
    pub ankle: Option<f64>,
}

fn angle_between(
    frame: &LandmarkFrame,
    a: BodyLandmark,
    b: BodyLandmark,
    c: BodyLandmark,
) -> Option<f64> {
    angle_at(frame.get(a)?, frame.get(b)?, frame.get(c)?)
}

/// Joint angles on the requested side. Each joint is computed independently.
pub fn joint_angles(frame: &LandmarkFrame, side: BodySide) -> JointAngleSet {
    JointAngleSet {
        hip: angle_between(frame, side.shoulder(), side.hip(), side.knee()),
        knee: angle_between(frame, side.hip(), side.knee(), side.ankle()),
        ankle: angle_between(frame, side.knee(), side.ankle(), side.toe()),
    }
}

/// Tilt of the left-hip to right-hip line against the horizontal axis,
/// in degrees within `(-180, 180]`.
pub fn pelvis_orientation(frame: &LandmarkFrame) -> Option<f64> {
    let left = frame.get(BodyLandmark::LeftHip)?;
    let right = frame.get(BodyLandmark::RightHip)?;
    if !(left.is_finite() && right.is_finite()) {
        return None;
    }
    let dx = right.x - left.x;
    let dy = right.y - left.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    let degrees = dy.atan2(dx).to_degrees();
    // atan2 can return exactly -180 for a negative-zero dy
    if degrees <= -180.0 {
        Some(180.0)
    } else {
        Some(degrees)
    }
}

/// Torso lean: angle at the shoulder between the nose and the pelvis center.
pub fn torso_angle(frame: &LandmarkFrame, side: BodySide) -> Option<f64> {
    let nose = frame.get(BodyLandmark::Nose)?;
    let shoulder = frame.get(side.shoulder())?;
    let left_hip = frame.get(BodyLandmark::LeftHip)?;
    let right_hip = frame.get(BodyLandmark::RightHip)?;
    let pelvis_center = Landmark::new((left_hip.x + right_hip.x) / 2.0, (left_hip.y + right_hip.y) / 2.0);
    angle_at(nose, shoulder, &pelvis_center)
}
