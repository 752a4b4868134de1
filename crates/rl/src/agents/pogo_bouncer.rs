//! One-legged hopper: a body sphere with a foot sphere on a driven leg joint.
//!
//! Three actions: leg extension, then leg swing about the body's X and Y
//! axes. The episode ends when the body drops too low or touches terrain.

use fastrand::Rng;
use glam::Vec2;
use physics::transform::{euler_degrees, from_euler_degrees};
use physics::{
    BodyId, BodyState, ContactEvent, ContactPhase, DriveJointDef, JointId, JointLimits, JointTarget,
    Material, PhysicsError, PhysicsSim, PhysicsWorld, Quat, Vec3,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::{SmoothnessNorm, SmoothnessPenalty};
use crate::env::Agent;
use crate::episode::{Episode, EpisodeEnd, Terminal};
use crate::error::{ensure_finite, ConfigError};
use crate::observation::ObservationBuilder;
use crate::policy::OperatorInput;
use crate::reward::ShapingTerm;
use crate::spawn::{inside_unit_sphere, range, SpawnRegion};

pub const ACTION_SIZE: usize = 3;
pub const OBSERVATION_SIZE: usize = 10;

const BODY_RADIUS: f32 = 0.3;
const FOOT_RADIUS: f32 = 0.15;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PogoBouncerConfig {
    pub has_target: bool,
    /// Ground point the agent spawns above.
    pub origin: [f32; 3],
    pub body_height: [f32; 2],
    pub body_speed: f32,
    pub body_tilt_degrees: f32,
    pub foot_spread: f32,
    pub foot_height: f32,
    pub target_spread: f32,
    pub target_height: [f32; 2],
    pub leg_length: f32,
    pub leg_travel: f32,
    pub leg_swing_degrees: f32,
    /// Body height above `origin` below which the agent has fallen.
    pub fall_height: f32,
    pub fall_penalty: f32,
    pub collision_penalty: f32,
    pub collision_grace_seconds: f32,
    pub tilt_penalty_factor: f32,
    pub action_penalty: f32,
    pub survival_bonus: f32,
    pub height_reward_factor: f32,
}

impl Default for PogoBouncerConfig {
    fn default() -> Self {
        Self {
            has_target: true,
            origin: [0.0; 3],
            body_height: [0.5, 2.5],
            body_speed: 0.5,
            body_tilt_degrees: 30.0,
            foot_spread: 0.5,
            foot_height: 0.5,
            target_spread: 3.0,
            target_height: [1.0, 2.5],
            leg_length: 1.0,
            leg_travel: 0.5,
            leg_swing_degrees: 30.0,
            fall_height: 0.4,
            fall_penalty: 1.0,
            collision_penalty: 1.0,
            collision_grace_seconds: 1.0,
            tilt_penalty_factor: 0.01,
            action_penalty: 0.05,
            survival_bonus: 0.1,
            height_reward_factor: 0.1,
        }
    }
}

impl PogoBouncerConfig {
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        Vec3::from(self.origin)
    }

    /// Box holding every reset position of the body, foot and target.
    #[must_use]
    pub fn spawn_region(&self) -> SpawnRegion {
        let top = self.body_height[1].max(self.target_height[1]).max(self.foot_height);
        let spread = self.target_spread.max(self.foot_spread);
        SpawnRegion::new(
            self.origin() + Vec3::new(0.0, top * 0.5, 0.0),
            Vec3::new(2.0 * spread, top, 2.0 * spread),
        )
    }

    pub fn validate(&mut self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("origin.x", self.origin[0]),
            ("origin.y", self.origin[1]),
            ("origin.z", self.origin[2]),
            ("body_height.min", self.body_height[0]),
            ("body_height.max", self.body_height[1]),
            ("body_speed", self.body_speed),
            ("body_tilt_degrees", self.body_tilt_degrees),
            ("foot_spread", self.foot_spread),
            ("foot_height", self.foot_height),
            ("target_spread", self.target_spread),
            ("target_height.min", self.target_height[0]),
            ("target_height.max", self.target_height[1]),
            ("leg_length", self.leg_length),
            ("leg_travel", self.leg_travel),
            ("leg_swing_degrees", self.leg_swing_degrees),
            ("fall_height", self.fall_height),
            ("fall_penalty", self.fall_penalty),
            ("collision_penalty", self.collision_penalty),
            ("collision_grace_seconds", self.collision_grace_seconds),
            ("tilt_penalty_factor", self.tilt_penalty_factor),
            ("action_penalty", self.action_penalty),
            ("survival_bonus", self.survival_bonus),
            ("height_reward_factor", self.height_reward_factor),
        ] {
            ensure_finite(name, value)?;
        }

        let defaults = Self::default();
        for (name, bounds, default) in [
            ("body_height", &mut self.body_height, defaults.body_height),
            ("target_height", &mut self.target_height, defaults.target_height),
        ] {
            if bounds[0] > bounds[1] {
                warn!(name, ?bounds, "inverted range, swapping bounds");
                bounds.swap(0, 1);
            }
            // heights are measured up from the origin
            if bounds[0] < 0.0 {
                warn!(name, ?bounds, "height below the origin, using default");
                *bounds = default;
            }
        }
        for (name, value) in [
            ("body_speed", &mut self.body_speed),
            ("foot_spread", &mut self.foot_spread),
            ("foot_height", &mut self.foot_height),
            ("target_spread", &mut self.target_spread),
        ] {
            if *value < 0.0 {
                warn!(name, value = *value, "negative extent, using its magnitude");
                *value = value.abs();
            }
        }
        if self.leg_length <= 0.0 {
            warn!(value = self.leg_length, "non-positive leg length, using default");
            self.leg_length = defaults.leg_length;
        }
        if self.collision_grace_seconds < 0.0 {
            warn!(value = self.collision_grace_seconds, "negative collision grace, disabling it");
            self.collision_grace_seconds = 0.0;
        }
        Ok(())
    }
}

/// Where the foot last touched something.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FootContact {
    pub point: Vec3,
    pub normal: Vec3,
}

pub struct PogoBouncer {
    config: PogoBouncerConfig,
    body: BodyId,
    foot: BodyId,
    leg: JointId,
    target: Option<Vec3>,
    foot_contact: Option<FootContact>,
    body_hit: bool,
}

impl PogoBouncer {
    #[must_use]
    pub fn new(config: PogoBouncerConfig, body: BodyId, foot: BodyId, leg: JointId) -> Self {
        let target = config.has_target.then(|| config.origin() + Vec3::Y * config.target_height[0]);
        Self {
            config,
            body,
            foot,
            leg,
            target,
            foot_contact: None,
            body_hit: false,
        }
    }

    /// Flat ground at the origin with the hopper standing on it.
    #[must_use]
    pub fn scene(config: PogoBouncerConfig) -> (PhysicsSim, Self) {
        let origin = config.origin();
        let mut sim = PhysicsSim::new();
        sim.add_plane(Vec3::Y, origin.y);

        let body_start = origin + Vec3::Y * (config.leg_length + FOOT_RADIUS);
        let body = sim.add_sphere_with_mass_and_material(body_start, Vec3::ZERO, BODY_RADIUS, 1.0, Material::default());
        let foot_material = Material {
            friction: 0.9,
            restitution: 0.5,
            ..Material::default()
        };
        let foot = sim.add_sphere_with_mass_and_material(
            origin + Vec3::Y * FOOT_RADIUS,
            Vec3::ZERO,
            FOOT_RADIUS,
            0.2,
            foot_material,
        );
        let leg = sim.add_drive_joint(
            body,
            foot,
            DriveJointDef {
                // joint +Z hangs straight down from the body
                axis: Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
                rest_length: config.leg_length,
                limits: JointLimits {
                    linear: config.leg_travel,
                    angular_x: config.leg_swing_degrees,
                    angular_y: config.leg_swing_degrees,
                },
                ..DriveJointDef::default()
            },
        );
        (sim, Self::new(config, body, foot, leg))
    }

    #[must_use]
    pub fn config(&self) -> &PogoBouncerConfig {
        &self.config
    }

    #[must_use]
    pub fn body(&self) -> BodyId {
        self.body
    }

    #[must_use]
    pub fn foot(&self) -> BodyId {
        self.foot
    }

    #[must_use]
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<Vec3>) {
        self.target = target;
    }

    #[must_use]
    pub fn foot_contact(&self) -> Option<FootContact> {
        self.foot_contact
    }

    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.foot_contact.is_some()
    }

    /// Pitch and roll away from upright, in degrees.
    #[must_use]
    pub fn tilt_degrees(rotation: Quat) -> f32 {
        let euler = euler_degrees(rotation);
        Vec2::new(euler.x, euler.z).length()
    }
}

impl Agent for PogoBouncer {
    fn name(&self) -> &'static str {
        "pogo-bouncer"
    }

    fn observation_size(&self) -> usize {
        OBSERVATION_SIZE
    }

    fn action_size(&self) -> usize {
        ACTION_SIZE
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        self.config.validate()
    }

    fn observe(&self, world: &dyn PhysicsWorld, obs: &mut ObservationBuilder) -> Result<(), PhysicsError> {
        let body = world.body(self.body)?;
        let foot = world.body(self.foot)?;
        obs.push_vec3(body.position);
        obs.push_vec3(body.inverse_transform_point(foot.position));
        obs.push_vec3(body.inverse_transform_point(self.target.unwrap_or(body.position)));
        obs.push_bool(self.is_grounded());
        Ok(())
    }

    fn apply_action(&mut self, world: &mut dyn PhysicsWorld, action: &[f32]) -> Result<(), PhysicsError> {
        let limits = world.joint_limits(self.leg)?;
        let target = JointTarget {
            position: Vec3::new(0.0, 0.0, action[0] * limits.linear),
            rotation: from_euler_degrees(action[1] * limits.angular_x, action[2] * limits.angular_y, 0.0),
        };
        world.set_joint_target(self.leg, target)
    }

    fn smoothness(&self) -> SmoothnessPenalty {
        SmoothnessPenalty {
            norm: SmoothnessNorm::MeanSquare,
            weight: self.config.action_penalty,
        }
    }

    fn on_contact(&mut self, event: &ContactEvent, episode: &mut Episode) {
        if event.body == self.foot {
            self.foot_contact = match event.phase {
                ContactPhase::Begin | ContactPhase::Stay => Some(FootContact {
                    point: event.point,
                    normal: event.normal,
                }),
                ContactPhase::End => None,
            };
        } else if event.body == self.body
            && event.phase == ContactPhase::Begin
            && event.other.is_terrain()
            && episode.elapsed() > self.config.collision_grace_seconds
        {
            debug!(other = ?event.other, "body touched terrain");
            self.body_hit = true;
        }
    }

    fn reward(&mut self, world: &dyn PhysicsWorld, dt: f32, episode: &mut Episode) -> Result<(), PhysicsError> {
        let body = world.body(self.body)?;
        let c = &self.config;
        episode.add_reward(ShapingTerm::Tilt, -Self::tilt_degrees(body.rotation) * c.tilt_penalty_factor * dt);
        episode.add_reward(ShapingTerm::Survival, c.survival_bonus * dt);
        if let Some(target) = self.target {
            episode.add_reward(
                ShapingTerm::Height,
                -(body.position.y - target.y).abs() * c.height_reward_factor * dt,
            );
        }
        Ok(())
    }

    fn check_terminal(&mut self, world: &dyn PhysicsWorld, _episode: &Episode) -> Result<Option<Terminal>, PhysicsError> {
        if self.body_hit {
            return Ok(Some(Terminal {
                cause: EpisodeEnd::Collided,
                term: ShapingTerm::Collision,
                reward: -self.config.collision_penalty,
            }));
        }
        let body = world.body(self.body)?;
        if body.position.y < self.config.origin[1] + self.config.fall_height {
            return Ok(Some(Terminal {
                cause: EpisodeEnd::Fell,
                term: ShapingTerm::Fall,
                reward: -self.config.fall_penalty,
            }));
        }
        Ok(None)
    }

    fn reset(&mut self, world: &mut dyn PhysicsWorld, rng: &mut Rng) -> Result<(), PhysicsError> {
        let c = &self.config;
        let origin = c.origin();

        let tilt = inside_unit_sphere(rng) * c.body_tilt_degrees;
        let body = BodyState {
            position: origin + Vec3::Y * range(rng, c.body_height[0], c.body_height[1]),
            rotation: from_euler_degrees(tilt.x, tilt.y, tilt.z),
            linear_velocity: Vec3::new(
                range(rng, -c.body_speed, c.body_speed),
                range(rng, -c.body_speed, c.body_speed),
                range(rng, -c.body_speed, c.body_speed),
            ),
            angular_velocity: Vec3::ZERO,
        };
        let foot = BodyState::at(
            origin
                + Vec3::new(
                    range(rng, -c.foot_spread, c.foot_spread),
                    range(rng, 0.0, c.foot_height),
                    range(rng, -c.foot_spread, c.foot_spread),
                ),
        );
        if c.has_target {
            self.target = Some(
                origin
                    + Vec3::new(
                        range(rng, -c.target_spread, c.target_spread),
                        range(rng, c.target_height[0], c.target_height[1]),
                        range(rng, -c.target_spread, c.target_spread),
                    ),
            );
        }
        // episode flags are cleared even if the world rejects the placement
        self.foot_contact = None;
        self.body_hit = false;

        world.set_body_state(self.body, body)?;
        world.set_body_state(self.foot, foot)?;
        world.set_joint_target(self.leg, JointTarget::default())?;
        debug!(body = ?body.position, foot = ?foot.position, target = ?self.target, "pogo bouncer placed");
        Ok(())
    }

    fn heuristic(&mut self, _world: &dyn PhysicsWorld, input: Option<&OperatorInput>) -> Result<Vec<f32>, PhysicsError> {
        // without an operator, keep the leg extended and upright
        let input = input.copied().unwrap_or_default();
        Ok(vec![if input.jump { -1.0 } else { 1.0 }, input.strafe, input.thrust])
    }
}
