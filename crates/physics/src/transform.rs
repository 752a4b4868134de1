//! Orientation utilities for physics objects
//!
//! Conversions between quaternions and the look-at / Euler forms agents use
//! to reason about headings and tilt.

use glam::{EulerRot, Mat3, Quat, Vec3};

/// Rotation whose `+Z` points along `forward` and whose `+Y` is as close to
/// `up` as possible. Degenerate inputs yield the identity or a rotation that
/// ignores `up`.
#[must_use]
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(forward) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };
    let right = match up.cross(forward).try_normalize() {
        Some(right) => right,
        // up parallel to forward: fall back to the shortest arc from +Z
        None => return Quat::from_rotation_arc(Vec3::Z, forward),
    };
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

/// The representative of `q` with a non-negative scalar part, i.e. the
/// shortest-arc form of the same rotation.
#[must_use]
pub fn canonical(q: Quat) -> Quat {
    if q.w < 0.0 {
        -q
    } else {
        q
    }
}

/// Euler angles in degrees as `(pitch about X, yaw about Y, roll about Z)`,
/// each wrapped to `[-180, 180]`. Rotations compose yaw, then pitch, then roll.
#[must_use]
pub fn euler_degrees(q: Quat) -> Vec3 {
    let (yaw, pitch, roll) = q.to_euler(EulerRot::YXZ);
    Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
}

/// Inverse of [`euler_degrees`].
#[must_use]
pub fn from_euler_degrees(pitch: f32, yaw: f32, roll: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw.to_radians(), pitch.to_radians(), roll.to_radians())
}
