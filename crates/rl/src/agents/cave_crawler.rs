//! Free-flying agent that hunts a target through a walled cave.
//!
//! Six actions: strafe, lift and thrust accelerations along the body axes,
//! then pitch, yaw and roll accelerations about them. Observations are the
//! body pose, the target in the body frame and a fan of distance rays.

use fastrand::Rng;
use physics::transform::{canonical, look_rotation};
use physics::{
    BodyId, BodyState, ContactEvent, ContactPhase, ForceMode, Material, PhysicsError, PhysicsSim, PhysicsWorld,
    Vec3,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::{clamp_component, SmoothnessNorm, SmoothnessPenalty};
use crate::env::Agent;
use crate::episode::{Episode, EpisodeEnd, Terminal};
use crate::error::{ensure_finite, ConfigError};
use crate::observation::ObservationBuilder;
use crate::policy::OperatorInput;
use crate::reward::ShapingTerm;
use crate::sensor::RayFan;
use crate::spawn::{random_rotation, SpawnRegion};

pub const ACTION_SIZE: usize = 6;

const BODY_RADIUS: f32 = 0.5;
const WALL_MARGIN: f32 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaveCrawlerConfig {
    pub has_target: bool,
    pub spawn_center: [f32; 3],
    pub spawn_size: [f32; 3],
    /// Distance from the agent at which the target is placed; `0` places it
    /// anywhere in the spawn region.
    pub target_reset_distance: f32,
    pub max_view_distance: f32,
    pub ray_splay_degrees: f32,
    pub side_rays: usize,
    pub forward_acceleration: f32,
    pub side_acceleration: f32,
    pub angular_acceleration: f32,
    pub speed_reward_factor: f32,
    pub target_reward: f32,
    pub target_facing_reward_factor: f32,
    pub target_distance_penalty_factor: f32,
    pub impact_penalty: f32,
    pub input_delta_penalty: f32,
    pub goal_tolerance: f32,
    pub collision_grace_seconds: f32,
    /// Add four floor-to-ceiling pillars to the generated cave.
    pub pillars: bool,
}

impl Default for CaveCrawlerConfig {
    fn default() -> Self {
        Self {
            has_target: true,
            spawn_center: [0.0; 3],
            spawn_size: [25.0; 3],
            target_reset_distance: 0.0,
            max_view_distance: 10.0,
            ray_splay_degrees: 45.0,
            side_rays: 6,
            forward_acceleration: 6.0,
            side_acceleration: 3.0,
            angular_acceleration: 3.0,
            speed_reward_factor: 0.1,
            target_reward: 2.0,
            target_facing_reward_factor: 0.25,
            target_distance_penalty_factor: 0.5,
            impact_penalty: 3.0,
            input_delta_penalty: 0.1,
            goal_tolerance: 0.5,
            collision_grace_seconds: 1.0,
            pillars: true,
        }
    }
}

impl CaveCrawlerConfig {
    #[must_use]
    pub fn spawn_region(&self) -> SpawnRegion {
        SpawnRegion::new(Vec3::from(self.spawn_center), Vec3::from(self.spawn_size))
    }

    #[must_use]
    pub fn ray_fan(&self) -> RayFan {
        RayFan {
            side_rays: self.side_rays,
            splay_degrees: self.ray_splay_degrees,
            max_distance: self.max_view_distance,
        }
    }

    /// Reject non-finite values and replace degenerate ones with defaults.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        for (i, value) in self.spawn_center.iter().enumerate() {
            ensure_finite(["spawn_center.x", "spawn_center.y", "spawn_center.z"][i], *value)?;
        }
        for (i, value) in self.spawn_size.iter().enumerate() {
            ensure_finite(["spawn_size.x", "spawn_size.y", "spawn_size.z"][i], *value)?;
        }
        for (name, value) in [
            ("target_reset_distance", self.target_reset_distance),
            ("max_view_distance", self.max_view_distance),
            ("ray_splay_degrees", self.ray_splay_degrees),
            ("forward_acceleration", self.forward_acceleration),
            ("side_acceleration", self.side_acceleration),
            ("angular_acceleration", self.angular_acceleration),
            ("speed_reward_factor", self.speed_reward_factor),
            ("target_reward", self.target_reward),
            ("target_facing_reward_factor", self.target_facing_reward_factor),
            ("target_distance_penalty_factor", self.target_distance_penalty_factor),
            ("impact_penalty", self.impact_penalty),
            ("input_delta_penalty", self.input_delta_penalty),
            ("goal_tolerance", self.goal_tolerance),
            ("collision_grace_seconds", self.collision_grace_seconds),
        ] {
            ensure_finite(name, value)?;
        }

        let defaults = Self::default();
        for axis in 0..3 {
            if self.spawn_size[axis] <= 0.0 {
                warn!(axis, size = self.spawn_size[axis], "degenerate spawn region, using default extent");
                self.spawn_size[axis] = defaults.spawn_size[axis];
            }
        }
        if self.max_view_distance <= 0.0 {
            warn!(value = self.max_view_distance, "non-positive view distance, using default");
            self.max_view_distance = defaults.max_view_distance;
        }
        if self.side_rays == 0 {
            warn!("no side rays configured, using default");
            self.side_rays = defaults.side_rays;
        }
        if self.target_reset_distance < 0.0 {
            warn!(value = self.target_reset_distance, "negative target reset distance, placing uniformly");
            self.target_reset_distance = 0.0;
        }
        if self.goal_tolerance <= 0.0 {
            warn!(value = self.goal_tolerance, "non-positive goal tolerance, using default");
            self.goal_tolerance = defaults.goal_tolerance;
        }
        if self.collision_grace_seconds < 0.0 {
            warn!(value = self.collision_grace_seconds, "negative collision grace, disabling it");
            self.collision_grace_seconds = 0.0;
        }
        Ok(())
    }
}

pub struct CaveCrawler {
    config: CaveCrawlerConfig,
    body: BodyId,
    target: Option<Vec3>,
}

impl CaveCrawler {
    /// Drive `body`, which must already exist in the world.
    #[must_use]
    pub fn new(config: CaveCrawlerConfig, body: BodyId) -> Self {
        let target = config.has_target.then(|| Vec3::from(config.spawn_center));
        Self { config, body, target }
    }

    /// A cave enclosing the spawn region, with one weightless crawler in it.
    #[must_use]
    pub fn scene(config: CaveCrawlerConfig) -> (PhysicsSim, Self) {
        let region = config.spawn_region();
        let mut sim = PhysicsSim::new();
        let half = region.half_extents().abs();
        sim.add_enclosure(region.center, half + Vec3::splat(WALL_MARGIN));
        if config.pillars {
            for (x, z) in [(-0.5, -0.5), (0.5, -0.5), (-0.5, 0.5), (0.5, 0.5)] {
                let offset = Vec3::new(x * half.x, 0.0, z * half.z);
                sim.add_static_box(region.center + offset, Vec3::new(0.75, half.y + WALL_MARGIN, 0.75));
            }
        }
        let material = Material {
            restitution: 0.4,
            ..Material::default()
        };
        let body = sim.add_sphere_with_mass_and_material(region.center, Vec3::ZERO, BODY_RADIUS, 1.0, material);
        sim.bodies[body].use_gravity = false;
        sim.bodies[body].linear_damping = 0.5;
        sim.bodies[body].angular_damping = 2.0;
        (sim, Self::new(config, body))
    }

    #[must_use]
    pub fn config(&self) -> &CaveCrawlerConfig {
        &self.config
    }

    #[must_use]
    pub fn body(&self) -> BodyId {
        self.body
    }

    #[must_use]
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<Vec3>) {
        self.target = target;
    }

    /// Where the agent is steering; itself when there is no target.
    fn aim(&self, state: &BodyState) -> Vec3 {
        self.target.unwrap_or(state.position)
    }

    fn operator_action(input: &OperatorInput) -> Vec<f32> {
        let mut action = vec![0.0; ACTION_SIZE];
        action[0] = input.strafe;
        action[1] = input.lift;
        action[2] = input.thrust;
        if input.look_held {
            action[3] = input.look.y;
            action[4] = input.look.x;
        }
        action[5] = input.roll;
        action
    }

    /// Steer towards the target with the body axes, turning to face it.
    fn scripted_action(&self, state: &BodyState, gravity: Vec3) -> Vec<f32> {
        let mut action = vec![0.0; ACTION_SIZE];
        let Some(target) = self.target else {
            action[2] = 1.0;
            return action;
        };
        let to_target = target - state.position;
        action[0] = clamp_component(to_target.dot(state.right()));
        action[1] = clamp_component(to_target.dot(state.up()));
        action[2] = clamp_component(to_target.dot(state.forward()));

        let facing = look_rotation(to_target, -gravity);
        let correction = canonical(state.rotation.inverse() * facing);
        action[3] = correction.x;
        action[4] = correction.y;
        action[5] = correction.z;
        action
    }
}

impl Agent for CaveCrawler {
    fn name(&self) -> &'static str {
        "cave-crawler"
    }

    fn observation_size(&self) -> usize {
        3 + 4 + 3 + self.config.ray_fan().ray_count()
    }

    fn action_size(&self) -> usize {
        ACTION_SIZE
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        self.config.validate()?;
        if self.config.has_target != self.target.is_some() {
            warn!(has_target = self.config.has_target, "target presence disagrees with config, following config");
            self.target = self.config.has_target.then(|| Vec3::from(self.config.spawn_center));
        }
        Ok(())
    }

    fn observe(&self, world: &dyn PhysicsWorld, obs: &mut ObservationBuilder) -> Result<(), PhysicsError> {
        let state = world.body(self.body)?;
        obs.push_vec3(state.position);
        obs.push_quat(state.rotation);
        obs.push_vec3(state.inverse_transform_point(self.aim(&state)));
        obs.extend_from_slice(&self.config.ray_fan().sense(world, state.position, state.rotation));
        Ok(())
    }

    fn apply_action(&mut self, world: &mut dyn PhysicsWorld, action: &[f32]) -> Result<(), PhysicsError> {
        let state = world.body(self.body)?;
        let c = &self.config;
        let force = state.rotation
            * Vec3::new(
                action[0] * c.side_acceleration,
                action[1] * c.side_acceleration,
                action[2] * c.forward_acceleration,
            );
        let torque = state.rotation * Vec3::new(action[3], action[4], action[5]) * c.angular_acceleration;
        world.apply_force(self.body, force, ForceMode::Acceleration)?;
        world.apply_torque(self.body, torque, ForceMode::Acceleration)
    }

    fn smoothness(&self) -> SmoothnessPenalty {
        SmoothnessPenalty {
            norm: SmoothnessNorm::L1Delta,
            weight: self.config.input_delta_penalty,
        }
    }

    fn on_contact(&mut self, event: &ContactEvent, episode: &mut Episode) {
        if event.body != self.body || event.phase != ContactPhase::Begin {
            return;
        }
        // spawn overlaps are expected right after a reset
        if episode.elapsed() > self.config.collision_grace_seconds {
            debug!(other = ?event.other, "impact");
            episode.add_reward(ShapingTerm::Impact, -self.config.impact_penalty);
        }
    }

    fn reward(&mut self, world: &dyn PhysicsWorld, dt: f32, episode: &mut Episode) -> Result<(), PhysicsError> {
        let state = world.body(self.body)?;
        let c = &self.config;
        let to_target = self.aim(&state) - state.position;
        let facing = (1.0 + state.forward().dot(to_target.normalize_or_zero())) * 0.5;

        episode.add_reward(ShapingTerm::Speed, state.speed() * dt * c.speed_reward_factor);
        episode.add_reward(ShapingTerm::Facing, facing * dt * c.target_facing_reward_factor);
        episode.add_reward(
            ShapingTerm::Distance,
            -to_target.length() * dt * c.target_distance_penalty_factor,
        );
        Ok(())
    }

    fn check_terminal(&mut self, world: &dyn PhysicsWorld, _episode: &Episode) -> Result<Option<Terminal>, PhysicsError> {
        let Some(target) = self.target else {
            return Ok(None);
        };
        let state = world.body(self.body)?;
        if state.position.distance(target) < self.config.goal_tolerance {
            return Ok(Some(Terminal {
                cause: EpisodeEnd::GoalReached,
                term: ShapingTerm::Goal,
                reward: self.config.target_reward,
            }));
        }
        Ok(None)
    }

    fn reset(&mut self, world: &mut dyn PhysicsWorld, rng: &mut Rng) -> Result<(), PhysicsError> {
        let region = self.config.spawn_region();
        let position = region.sample_point(rng);
        let state = BodyState {
            rotation: random_rotation(rng),
            ..BodyState::at(position)
        };
        if self.config.has_target {
            let target = if self.config.target_reset_distance <= 0.0 {
                region.sample_point(rng)
            } else {
                region.place_near(position, self.config.target_reset_distance, rng)
            };
            self.target = Some(target);
        }

        world.set_body_state(self.body, state)?;
        debug!(?position, target = ?self.target, "cave crawler placed");
        Ok(())
    }

    fn heuristic(&mut self, world: &dyn PhysicsWorld, input: Option<&OperatorInput>) -> Result<Vec<f32>, PhysicsError> {
        match input {
            Some(input) => Ok(Self::operator_action(input)),
            None => {
                let state = world.body(self.body)?;
                Ok(self.scripted_action(&state, world.gravity()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::Quat;

    fn still_crawler(position: Vec3, target: Vec3) -> (PhysicsSim, CaveCrawler) {
        let config = CaveCrawlerConfig {
            pillars: false,
            ..CaveCrawlerConfig::default()
        };
        let (mut sim, mut crawler) = CaveCrawler::scene(config);
        sim.set_body_state(crawler.body(), BodyState::at(position)).unwrap();
        crawler.set_target(Some(target));
        (sim, crawler)
    }

    #[test]
    fn observation_layout() {
        let (sim, crawler) = still_crawler(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, 5.0));
        let mut obs = ObservationBuilder::default();
        crawler.observe(&sim, &mut obs).unwrap();
        let obs = obs.finish(crawler.observation_size());
        assert_eq!(obs.len(), 17);
        assert_eq!(&obs[0..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&obs[3..7], &[0.0, 0.0, 0.0, 1.0]);
        assert!((obs[9] - 2.0).abs() < 1e-5);
        assert!(obs[10..].iter().all(|r| (0.0..=10.0).contains(r)));
    }

    #[test]
    fn thrust_pushes_along_forward() {
        let (mut sim, mut crawler) = still_crawler(Vec3::ZERO, Vec3::Z);
        let facing_right = BodyState {
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..BodyState::at(Vec3::ZERO)
        };
        sim.set_body_state(crawler.body(), facing_right).unwrap();
        crawler.apply_action(&mut sim, &[0.0, 0.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
        sim.step(0.02);
        let v = sim.body(crawler.body()).unwrap().linear_velocity;
        assert!(v.x > 0.1, "v={v:?}");
        assert!(v.z.abs() < 1e-4);
    }

    #[test]
    fn facing_reward_is_half_without_target() {
        let (sim, mut crawler) = still_crawler(Vec3::ZERO, Vec3::Z);
        crawler.set_target(None);
        let mut episode = Episode::begin(1, 0.0);
        crawler.reward(&sim, 1.0, &mut episode).unwrap();
        assert!((episode.rewards().term(ShapingTerm::Facing) - 0.125).abs() < 1e-6);
        assert!(episode.rewards().term(ShapingTerm::Distance).abs() < 1e-6);
    }

    #[test]
    fn impacts_respect_grace_period() {
        let (_, mut crawler) = still_crawler(Vec3::ZERO, Vec3::Z);
        let event = ContactEvent {
            body: crawler.body(),
            other: physics::Collider::Plane(0),
            phase: ContactPhase::Begin,
            point: Vec3::ZERO,
            normal: Vec3::Y,
        };
        let mut episode = Episode::begin(1, 0.0);
        crawler.on_contact(&event, &mut episode);
        assert_eq!(episode.cumulative_reward(), 0.0);

        for _ in 0..60 {
            episode.advance(0.02);
        }
        crawler.on_contact(&event, &mut episode);
        assert!((episode.cumulative_reward() + 3.0).abs() < 1e-6);
    }

    #[test]
    fn scripted_policy_heads_for_target() {
        let (sim, mut crawler) = still_crawler(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
        let action = crawler.heuristic(&sim, None).unwrap();
        assert_eq!(action.len(), ACTION_SIZE);
        assert!((action[2] - 1.0).abs() < 1e-6);
        assert!(action[0].abs() < 1e-6 && action[1].abs() < 1e-6);
        // already facing the target: no correction
        assert!(action[3..].iter().all(|a| a.abs() < 1e-5));
    }

    #[test]
    fn scripted_policy_without_target_flies_forward() {
        let (sim, mut crawler) = still_crawler(Vec3::ZERO, Vec3::Z);
        crawler.set_target(None);
        assert_eq!(crawler.heuristic(&sim, None).unwrap(), vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn operator_look_needs_held_button() {
        let (sim, mut crawler) = still_crawler(Vec3::ZERO, Vec3::Z);
        let mut input = OperatorInput {
            thrust: 1.0,
            look: glam::Vec2::new(0.3, -0.2),
            ..OperatorInput::default()
        };
        assert_eq!(crawler.heuristic(&sim, Some(&input)).unwrap()[3], 0.0);
        input.look_held = true;
        let action = crawler.heuristic(&sim, Some(&input)).unwrap();
        assert_eq!(action[3], -0.2);
        assert_eq!(action[4], 0.3);
    }

    #[test]
    fn degenerate_config_gets_defaults() {
        let mut config = CaveCrawlerConfig {
            spawn_size: [0.0, 10.0, -1.0],
            max_view_distance: 0.0,
            side_rays: 0,
            ..CaveCrawlerConfig::default()
        };
        config.validate().unwrap();
        assert_eq!(config.spawn_size, [25.0, 10.0, 25.0]);
        assert_eq!(config.max_view_distance, 10.0);
        assert_eq!(config.side_rays, 6);
    }

    #[test]
    fn non_finite_config_is_fatal() {
        let mut config = CaveCrawlerConfig {
            impact_penalty: f32::NAN,
            ..CaveCrawlerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonFinite("impact_penalty")));
    }
}
