#![allow(dead_code)]

use physics::{
    BodyId, BodyState, ContactEvent, ForceMode, JointId, JointLimits, JointTarget, PhysicsError, PhysicsWorld,
    RayHit, Vec3,
};

/// A world that never moves on its own and records every mutation.
#[derive(Default)]
pub struct RecordingWorld {
    pub bodies: Vec<BodyState>,
    pub forces: Vec<(BodyId, Vec3, ForceMode)>,
    pub torques: Vec<(BodyId, Vec3, ForceMode)>,
    pub joint_targets: Vec<(JointId, JointTarget)>,
    pub pending_contacts: Vec<ContactEvent>,
    pub mutations: usize,
}

impl RecordingWorld {
    pub fn with_bodies(count: usize) -> Self {
        Self {
            bodies: vec![BodyState::default(); count],
            ..Self::default()
        }
    }

    pub fn place(&mut self, id: BodyId, position: Vec3) {
        self.bodies[id] = BodyState::at(position);
    }
}

impl PhysicsWorld for RecordingWorld {
    fn body(&self, id: BodyId) -> Result<BodyState, PhysicsError> {
        self.bodies.get(id).copied().ok_or(PhysicsError::UnknownBody(id))
    }

    fn set_body_state(&mut self, id: BodyId, state: BodyState) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(id).ok_or(PhysicsError::UnknownBody(id))?;
        *body = state;
        self.mutations += 1;
        Ok(())
    }

    fn raycast(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<RayHit> {
        None
    }

    fn apply_force(&mut self, id: BodyId, force: Vec3, mode: ForceMode) -> Result<(), PhysicsError> {
        self.body(id)?;
        self.forces.push((id, force, mode));
        self.mutations += 1;
        Ok(())
    }

    fn apply_torque(&mut self, id: BodyId, torque: Vec3, mode: ForceMode) -> Result<(), PhysicsError> {
        self.body(id)?;
        self.torques.push((id, torque, mode));
        self.mutations += 1;
        Ok(())
    }

    fn joint_limits(&self, joint: JointId) -> Result<JointLimits, PhysicsError> {
        Err(PhysicsError::UnknownJoint(joint))
    }

    fn set_joint_target(&mut self, joint: JointId, _target: JointTarget) -> Result<(), PhysicsError> {
        Err(PhysicsError::UnknownJoint(joint))
    }

    fn gravity(&self) -> Vec3 {
        Vec3::new(0.0, -9.81, 0.0)
    }

    fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.pending_contacts)
    }
}
