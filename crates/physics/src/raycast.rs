//! Ray queries against bodies and static geometry.
//!
//! All functions take a normalized `direction` and return the distance along
//! it to the first entry point, skipping shapes that already contain the
//! origin.

use crate::types::{Plane, RigidBody, StaticBox, Vec3};

/// Ray against a sphere body.
pub fn ray_sphere(origin: Vec3, direction: Vec3, body: &RigidBody) -> Option<(f32, Vec3)> {
    let offset = origin - body.state.position;
    let c = offset.length_squared() - body.radius * body.radius;
    if c <= 0.0 {
        return None;
    }
    let b = offset.dot(direction);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    let point = origin + direction * t;
    Some((t, (point - body.state.position) / body.radius))
}

/// Ray against the open side of a plane.
pub fn ray_plane(origin: Vec3, direction: Vec3, plane: &Plane) -> Option<(f32, Vec3)> {
    let distance = origin.dot(plane.normal) - plane.d;
    let denom = direction.dot(plane.normal);
    if distance < 0.0 || denom >= 0.0 {
        return None;
    }
    Some((-distance / denom, plane.normal))
}

/// Slab test against an axis-aligned box.
pub fn ray_box(origin: Vec3, direction: Vec3, box_body: &StaticBox) -> Option<(f32, Vec3)> {
    if box_body.contains(origin) {
        return None;
    }
    let min = box_body.center - box_body.half_extents;
    let max = box_body.center + box_body.half_extents;

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let mut t0 = (min[axis] - o) / d;
        let mut t1 = (max[axis] - o) / d;
        let mut face = -1.0;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            face = 1.0;
        }
        if t0 > t_enter {
            t_enter = t0;
            normal = Vec3::ZERO;
            normal[axis] = face;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 {
        return None;
    }
    Some((t_enter, normal))
}
