//! # Physics Integration
//!
//! This module handles the numerical integration of physics bodies,
//! including position updates, velocity calculations, and force application.

use crate::types::{ForceMode, Quat, RigidBody, Vec3};

/// Smallest angular speed worth integrating.
const MIN_ANGULAR_SPEED: f32 = 1e-6;

/// Queue a linear force on a body. Continuous modes accumulate until the next
/// integration, instant modes change the velocity right away.
pub fn apply_linear(body: &mut RigidBody, force: Vec3, mode: ForceMode) {
    match mode {
        ForceMode::Force => body.linear_accel += force / body.mass,
        ForceMode::Acceleration => body.linear_accel += force,
        ForceMode::Impulse => body.state.linear_velocity += force / body.mass,
        ForceMode::VelocityChange => body.state.linear_velocity += force,
    }
}

/// Angular counterpart of [`apply_linear`], using the sphere's inertia.
pub fn apply_angular(body: &mut RigidBody, torque: Vec3, mode: ForceMode) {
    let inertia = body.inertia().max(f32::EPSILON);
    match mode {
        ForceMode::Force => body.angular_accel += torque / inertia,
        ForceMode::Acceleration => body.angular_accel += torque,
        ForceMode::Impulse => body.state.angular_velocity += torque / inertia,
        ForceMode::VelocityChange => body.state.angular_velocity += torque,
    }
}

/// Semi-implicit Euler step for every body, then clear the accumulators.
pub fn integrate_bodies(bodies: &mut [RigidBody], gravity: Vec3, dt: f32) {
    for body in bodies.iter_mut() {
        let mut acceleration = body.linear_accel;
        if body.use_gravity {
            acceleration += gravity;
        }

        let state = &mut body.state;
        state.linear_velocity += acceleration * dt;
        state.linear_velocity *= (1.0 - body.linear_damping * dt).max(0.0);
        state.position += state.linear_velocity * dt;

        state.angular_velocity += body.angular_accel * dt;
        state.angular_velocity *= (1.0 - body.angular_damping * dt).max(0.0);
        if state.angular_velocity.length() > MIN_ANGULAR_SPEED {
            let delta = Quat::from_scaled_axis(state.angular_velocity * dt);
            state.rotation = (delta * state.rotation).normalize();
        }

        body.linear_accel = Vec3::ZERO;
        body.angular_accel = Vec3::ZERO;
    }
}
