//! # Physics World Interface
//!
//! The control loop never talks to [`crate::PhysicsSim`] directly. It only
//! needs the queries and effects listed on [`PhysicsWorld`], so any engine
//! (or a test double) can stand in for the bundled simulator.

use crate::error::PhysicsError;
use crate::types::{BodyId, BodyState, Collider, ForceMode, JointId, Quat, Vec3};

/// Nearest intersection reported by [`PhysicsWorld::raycast`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub collider: Collider,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContactPhase {
    Begin,
    Stay,
    End,
}

/// Collision notification for one body.
///
/// `normal` points away from `other`, towards `body`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactEvent {
    pub body: BodyId,
    pub other: Collider,
    pub phase: ContactPhase,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Travel limits of a drive joint. Angles are in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointLimits {
    pub linear: f32,
    pub angular_x: f32,
    pub angular_y: f32,
}

/// Pose the joint drive pulls the connected body towards, in the joint frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointTarget {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for JointTarget {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Everything an agent may ask of, or do to, the simulated world.
pub trait PhysicsWorld {
    /// Current kinematic state of a body.
    fn body(&self, id: BodyId) -> Result<BodyState, PhysicsError>;

    /// Teleport a body, overwriting its pose and velocities.
    fn set_body_state(&mut self, id: BodyId, state: BodyState) -> Result<(), PhysicsError>;

    /// Nearest hit along a ray within `max_distance`.
    ///
    /// Colliders that contain the ray origin are ignored, so a body can cast
    /// from its own center.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    fn apply_force(&mut self, id: BodyId, force: Vec3, mode: ForceMode) -> Result<(), PhysicsError>;

    /// Apply a world-space torque.
    fn apply_torque(&mut self, id: BodyId, torque: Vec3, mode: ForceMode) -> Result<(), PhysicsError>;

    fn joint_limits(&self, joint: JointId) -> Result<JointLimits, PhysicsError>;

    fn set_joint_target(&mut self, joint: JointId, target: JointTarget) -> Result<(), PhysicsError>;

    fn gravity(&self) -> Vec3;

    /// Take every contact notification raised since the previous call.
    fn drain_contacts(&mut self) -> Vec<ContactEvent>;
}
