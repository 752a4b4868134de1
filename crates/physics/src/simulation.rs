//! # Physics Simulation Core
//!
//! This module provides the main simulation structure and its step loop. It
//! coordinates integration, collision detection, joint drives and contact
//! bookkeeping, and implements [`PhysicsWorld`] on top of them.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::collision::{
    detect_sphere_box_collision, detect_sphere_plane_collision, detect_sphere_sphere_collision,
    resolve_sphere_sphere_collision, resolve_static_contact, Contact,
};
use crate::error::PhysicsError;
use crate::integrator::{apply_angular, apply_linear, integrate_bodies};
use crate::joint::{solve_drive_joint, DriveJoint};
use crate::raycast::{ray_box, ray_plane, ray_sphere};
use crate::types::{
    BodyId, BodyState, Collider, ForceMode, JointId, PhysParams, Plane, RigidBody, StaticBox, Vec3,
};
use crate::world::{ContactEvent, ContactPhase, JointLimits, JointTarget, PhysicsWorld, RayHit};

type ContactKey = (BodyId, Collider);

/// Main physics simulation container
pub struct PhysicsSim {
    pub bodies: Vec<RigidBody>,
    pub planes: Vec<Plane>,
    pub boxes: Vec<StaticBox>,
    pub joints: Vec<DriveJoint>,
    pub params: PhysParams,
    /// Contacts touching at the end of the previous step, with point and normal.
    active_contacts: BTreeMap<ContactKey, (Vec3, Vec3)>,
    pending_events: Vec<ContactEvent>,
}

impl PhysicsSim {
    /// Create a new empty simulation
    #[must_use]
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            planes: Vec::new(),
            boxes: Vec::new(),
            joints: Vec::new(),
            params: PhysParams::default(),
            active_contacts: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }

    /// Create simulation with single sphere (for testing)
    #[must_use]
    pub fn new_single_sphere(initial_height: f32) -> Self {
        let mut sim = Self::new();
        sim.add_sphere(Vec3::new(0.0, initial_height, 0.0), Vec3::ZERO, 0.5);
        sim
    }

    /// Execute one physics step
    pub fn step(&mut self, dt: f32) {
        self.params.dt = dt;

        // 1. Joint drives feed velocities before integration
        self.solve_joints(dt);

        // 2. Apply forces and integrate positions
        integrate_bodies(&mut self.bodies, self.params.gravity, dt);

        // 3. Detect and resolve collisions
        let touching = self.detect_and_resolve_collisions();

        // 4. Turn the touching set into begin/stay/end notifications
        self.update_contacts(touching);
    }

    /// Run simulation for multiple steps and return the state of the first body
    pub fn run(&mut self, dt: f32, steps: usize) -> Result<BodyState, PhysicsError> {
        if self.bodies.is_empty() {
            return Err(PhysicsError::NoBodies);
        }
        for _ in 0..steps {
            self.step(dt);
        }
        Ok(self.bodies[0].state)
    }

    fn solve_joints(&mut self, dt: f32) {
        for joint in &self.joints {
            let (a, b) = (joint.body_a, joint.body_b);
            if a == b || a >= self.bodies.len() || b >= self.bodies.len() {
                trace!(a, b, "skipping joint with invalid bodies");
                continue;
            }
            let (body_a, body_b) = pair_mut(&mut self.bodies, a, b);
            solve_drive_joint(joint, body_a, body_b, dt);
        }
    }

    fn detect_and_resolve_collisions(&mut self) -> BTreeMap<ContactKey, (Vec3, Vec3)> {
        let mut touching = BTreeMap::new();

        // Sphere-sphere pairs, skipping bodies linked by a joint
        for j in 1..self.bodies.len() {
            for i in 0..j {
                if self.jointed(i, j) {
                    continue;
                }
                let (a, b) = pair_mut(&mut self.bodies, i, j);
                if let Some(contact) = detect_sphere_sphere_collision(a, b) {
                    resolve_sphere_sphere_collision(a, b, &contact);
                    touching.insert((i, Collider::Body(j)), (contact.point, -contact.normal));
                    touching.insert((j, Collider::Body(i)), (contact.point, contact.normal));
                }
            }
        }

        for (id, body) in self.bodies.iter_mut().enumerate() {
            for (index, plane) in self.planes.iter().enumerate() {
                if let Some(contact) = detect_sphere_plane_collision(body, plane) {
                    resolve_static(body, &contact, &mut touching, (id, Collider::Plane(index)));
                }
            }
            for (index, box_body) in self.boxes.iter().enumerate() {
                if let Some(contact) = detect_sphere_box_collision(body, box_body) {
                    resolve_static(body, &contact, &mut touching, (id, Collider::Box(index)));
                }
            }
        }

        touching
    }

    fn jointed(&self, i: usize, j: usize) -> bool {
        self.joints
            .iter()
            .any(|joint| (joint.body_a == i && joint.body_b == j) || (joint.body_a == j && joint.body_b == i))
    }

    fn update_contacts(&mut self, touching: BTreeMap<ContactKey, (Vec3, Vec3)>) {
        for (&(body, other), &(point, normal)) in &self.active_contacts {
            if !touching.contains_key(&(body, other)) {
                self.pending_events.push(ContactEvent {
                    body,
                    other,
                    phase: ContactPhase::End,
                    point,
                    normal,
                });
            }
        }
        for (&(body, other), &(point, normal)) in &touching {
            let phase = if self.active_contacts.contains_key(&(body, other)) {
                ContactPhase::Stay
            } else {
                ContactPhase::Begin
            };
            self.pending_events.push(ContactEvent {
                body,
                other,
                phase,
                point,
                normal,
            });
        }
        self.active_contacts = touching;
    }

    fn body_ref(&self, id: BodyId) -> Result<&RigidBody, PhysicsError> {
        self.bodies.get(id).ok_or(PhysicsError::UnknownBody(id))
    }

    fn body_mut(&mut self, id: BodyId) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies.get_mut(id).ok_or(PhysicsError::UnknownBody(id))
    }
}

impl Default for PhysicsSim {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_static(
    body: &mut RigidBody,
    contact: &Contact,
    touching: &mut BTreeMap<ContactKey, (Vec3, Vec3)>,
    key: ContactKey,
) {
    resolve_static_contact(body, contact);
    touching.insert(key, (contact.point, contact.normal));
}

/// Two distinct mutable elements of a slice.
fn pair_mut(bodies: &mut [RigidBody], a: usize, b: usize) -> (&mut RigidBody, &mut RigidBody) {
    if a < b {
        let (head, tail) = bodies.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(a);
        (&mut tail[0], &mut head[b])
    }
}

fn ensure_finite(v: Vec3, what: &'static str) -> Result<(), PhysicsError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(PhysicsError::NonFinite(what))
    }
}

impl PhysicsWorld for PhysicsSim {
    fn body(&self, id: BodyId) -> Result<BodyState, PhysicsError> {
        self.body_ref(id).map(|body| body.state)
    }

    fn set_body_state(&mut self, id: BodyId, state: BodyState) -> Result<(), PhysicsError> {
        if !state.is_finite() {
            return Err(PhysicsError::NonFinite("body state"));
        }
        let body = self.body_mut(id)?;
        body.state = BodyState {
            rotation: state.rotation.normalize(),
            ..state
        };
        body.linear_accel = Vec3::ZERO;
        body.angular_accel = Vec3::ZERO;
        // a teleported body starts its contacts afresh
        self.active_contacts.retain(|&(body, _), _| body != id);
        debug!(body = id, position = ?state.position, "body teleported");
        Ok(())
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        let mut best: Option<RayHit> = None;
        let mut consider = |hit: Option<(f32, Vec3)>, collider: Collider| {
            if let Some((distance, normal)) = hit {
                if distance <= max_distance && best.map_or(true, |b| distance < b.distance) {
                    best = Some(RayHit {
                        distance,
                        point: origin + direction * distance,
                        normal,
                        collider,
                    });
                }
            }
        };

        for (id, body) in self.bodies.iter().enumerate() {
            consider(ray_sphere(origin, direction, body), Collider::Body(id));
        }
        for (index, plane) in self.planes.iter().enumerate() {
            consider(ray_plane(origin, direction, plane), Collider::Plane(index));
        }
        for (index, box_body) in self.boxes.iter().enumerate() {
            consider(ray_box(origin, direction, box_body), Collider::Box(index));
        }
        best
    }

    fn apply_force(&mut self, id: BodyId, force: Vec3, mode: ForceMode) -> Result<(), PhysicsError> {
        ensure_finite(force, "force")?;
        apply_linear(self.body_mut(id)?, force, mode);
        Ok(())
    }

    fn apply_torque(&mut self, id: BodyId, torque: Vec3, mode: ForceMode) -> Result<(), PhysicsError> {
        ensure_finite(torque, "torque")?;
        apply_angular(self.body_mut(id)?, torque, mode);
        Ok(())
    }

    fn joint_limits(&self, joint: JointId) -> Result<JointLimits, PhysicsError> {
        self.joints
            .get(joint)
            .map(|j| j.limits)
            .ok_or(PhysicsError::UnknownJoint(joint))
    }

    fn set_joint_target(&mut self, joint: JointId, target: JointTarget) -> Result<(), PhysicsError> {
        ensure_finite(target.position, "joint target")?;
        let drive = self.joints.get_mut(joint).ok_or(PhysicsError::UnknownJoint(joint))?;
        drive.target = drive.clamp_target(target);
        Ok(())
    }

    fn gravity(&self) -> Vec3 {
        self.params.gravity
    }

    fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raycast_returns_nearest_hit() {
        let mut sim = PhysicsSim::new();
        sim.add_sphere(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, 0.5);
        sim.add_sphere(Vec3::new(0.0, 0.0, 6.0), Vec3::ZERO, 0.5);
        let hit = sim.raycast(Vec3::ZERO, Vec3::Z, 10.0).unwrap();
        assert_eq!(hit.collider, Collider::Body(0));
        assert!((hit.distance - 2.5).abs() < 1e-5);
    }

    #[test]
    fn raycast_respects_max_distance() {
        let mut sim = PhysicsSim::new();
        sim.add_sphere(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO, 0.5);
        assert!(sim.raycast(Vec3::ZERO, Vec3::Z, 10.0).is_none());
    }

    #[test]
    fn unknown_body_is_an_error() {
        let mut sim = PhysicsSim::new();
        assert_eq!(sim.body(3), Err(PhysicsError::UnknownBody(3)));
        assert_eq!(
            sim.apply_force(3, Vec3::X, ForceMode::Force),
            Err(PhysicsError::UnknownBody(3))
        );
    }

    #[test]
    fn run_without_bodies_fails() {
        let mut sim = PhysicsSim::new();
        assert_eq!(sim.run(0.01, 1), Err(PhysicsError::NoBodies));
    }
}
