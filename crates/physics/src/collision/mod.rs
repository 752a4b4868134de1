//! # Collision Detection and Response
//!
//! This module handles collision detection between dynamic spheres and the
//! static level geometry, and computes the response using impulse-based
//! methods.

mod sphere_box;
mod sphere_plane;
mod sphere_sphere;

pub use sphere_box::*;
pub use sphere_plane::*;
pub use sphere_sphere::*;

use crate::types::{Material, Vec3};

/// Share of the penetration depth removed per step.
const POSITION_CORRECTION_PERCENT: f32 = 0.8;
/// Penetration tolerated before positions are corrected.
const POSITION_CORRECTION_SLOP: f32 = 0.005;

/// Contact information for collision response
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Contact point in world space
    pub point: Vec3,
    /// Contact normal, pointing towards the body being pushed out
    pub normal: Vec3,
    /// Penetration depth
    pub depth: f32,
    /// Combined friction coefficient
    pub friction: f32,
    /// Combined restitution coefficient
    pub restitution: f32,
}

impl Contact {
    /// Create a new contact with material properties
    pub fn new(point: Vec3, normal: Vec3, depth: f32, mat_a: &Material, mat_b: &Material) -> Self {
        Self {
            point,
            normal,
            depth,
            friction: combine_friction(mat_a.friction, mat_b.friction),
            restitution: combine_restitution(mat_a.restitution, mat_b.restitution),
        }
    }
}

/// Combine friction coefficients using geometric mean
fn combine_friction(f1: f32, f2: f32) -> f32 {
    (f1 * f2).sqrt()
}

/// Combine restitution coefficients, the bouncier material wins
fn combine_restitution(r1: f32, r2: f32) -> f32 {
    r1.max(r2)
}

/// Depth left to push out after the slop allowance.
fn correction_depth(depth: f32) -> f32 {
    (depth - POSITION_CORRECTION_SLOP).max(0.0) * POSITION_CORRECTION_PERCENT
}
