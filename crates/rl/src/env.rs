use fastrand::Rng;
use physics::{ContactEvent, PhysicsError, PhysicsWorld};

use crate::action::SmoothnessPenalty;
use crate::episode::{Episode, Terminal};
use crate::error::ConfigError;
use crate::observation::ObservationBuilder;
use crate::policy::OperatorInput;

/// An embodied agent driven by [`crate::ControlLoop`].
///
/// Inspired by classic frameworks like OpenAI Gym, but split into the
/// individual phases of a tick so the loop controls ordering, clamping and
/// the terminal edge. Implementors only describe their own sensing,
/// actuation and shaping; they never decide when an episode is over beyond
/// reporting a [`Terminal`] from [`check_terminal`].
///
/// [`check_terminal`]: Agent::check_terminal
pub trait Agent {
    fn name(&self) -> &'static str;

    /// Length of the observation vector written by [`Agent::observe`].
    fn observation_size(&self) -> usize;

    /// Number of action components consumed by [`Agent::apply_action`].
    fn action_size(&self) -> usize;

    /// Check configuration before the first episode. Degenerate values may be
    /// replaced with defaults; non-finite values are an error.
    fn validate(&mut self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn observe(&self, world: &dyn PhysicsWorld, obs: &mut ObservationBuilder) -> Result<(), PhysicsError>;

    /// Drive the world with an action already clamped to `[-1, 1]`.
    fn apply_action(&mut self, world: &mut dyn PhysicsWorld, action: &[f32]) -> Result<(), PhysicsError>;

    /// Penalty applied to every actuated action.
    fn smoothness(&self) -> SmoothnessPenalty;

    /// Contact notification delivered at the start of a tick.
    fn on_contact(&mut self, _event: &ContactEvent, _episode: &mut Episode) {}

    /// Add this tick's rate-based shaping terms, each scaled by `dt`.
    fn reward(&mut self, world: &dyn PhysicsWorld, dt: f32, episode: &mut Episode) -> Result<(), PhysicsError>;

    /// Report a terminal condition, if one holds.
    fn check_terminal(&mut self, world: &dyn PhysicsWorld, episode: &Episode) -> Result<Option<Terminal>, PhysicsError>;

    /// Place the agent (and its goal) for a new episode with zero velocity.
    fn reset(&mut self, world: &mut dyn PhysicsWorld, rng: &mut Rng) -> Result<(), PhysicsError>;

    /// Action from operator input or, without it, a scripted policy.
    fn heuristic(&mut self, world: &dyn PhysicsWorld, input: Option<&OperatorInput>) -> Result<Vec<f32>, PhysicsError>;
}
