//! # Episodic Control Loop
//!
//! [`ControlLoop`] owns one agent and its current [`Episode`] and runs the
//! observe, decide, act, reward, terminate cycle once per fixed simulation
//! step. It never steps the world itself: the host alternates
//! `world.step(dt)` and [`ControlLoop::tick`], and calls
//! [`ControlLoop::reset`] once a tick reports `done`.
//!
//! Errors inside a tick are logged and returned in the [`TickReport`]; they
//! degrade the tick instead of aborting the host.

use fastrand::Rng;
use physics::PhysicsWorld;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::action::{clamped, validate_arity};
use crate::env::Agent;
use crate::episode::{Episode, EpisodeEnd};
use crate::error::{ensure_finite, ConfigError, ControlError};
use crate::observation::{Observation, ObservationBuilder};
use crate::policy::{BehaviorMode, OperatorInput};
use crate::reward::ShapingTerm;

pub const DEFAULT_DT: f32 = 0.02;

/// Host-side settings shared by every agent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopSettings {
    /// Episode length limit in ticks; `0` means unlimited.
    pub max_steps: u32,
    pub seed: u64,
    /// Fixed step used by the host scheduler.
    pub dt: f32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            max_steps: 0,
            seed: 0,
            dt: DEFAULT_DT,
        }
    }
}

impl LoopSettings {
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        ensure_finite("dt", self.dt)?;
        if self.dt <= 0.0 {
            warn!(dt = self.dt, default = DEFAULT_DT, "non-positive dt, using default");
            self.dt = DEFAULT_DT;
        }
        Ok(())
    }
}

/// Outcome of one [`ControlLoop::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Steps taken in the current episode.
    pub step: u32,
    /// Reward added during this tick.
    pub reward: f32,
    pub done: bool,
    pub end: Option<EpisodeEnd>,
    /// Whether an action reached the world.
    pub actuated: bool,
    pub error: Option<ControlError>,
}

pub struct ControlLoop<A> {
    agent: A,
    behavior: BehaviorMode,
    operator_input: Option<OperatorInput>,
    operator_control: bool,
    settings: LoopSettings,
    rng: Rng,
    episode: Episode,
    last_action: Vec<f32>,
    clock: f64,
    episodes: u64,
    initialized: bool,
}

impl<A: Agent> ControlLoop<A> {
    pub fn new(agent: A, behavior: BehaviorMode, settings: LoopSettings) -> Self {
        let last_action = vec![0.0; agent.action_size()];
        Self {
            agent,
            behavior,
            operator_input: None,
            operator_control: false,
            settings,
            rng: Rng::with_seed(settings.seed),
            episode: Episode::begin(0, 0.0),
            last_action,
            clock: 0.0,
            episodes: 0,
            initialized: false,
        }
    }

    /// Validate configuration and start the first episode.
    pub fn initialize(&mut self, world: &mut dyn PhysicsWorld) -> Result<(), ConfigError> {
        self.settings.validate()?;
        self.agent.validate()?;
        self.initialized = true;
        info!(
            agent = self.agent.name(),
            observation_size = self.agent.observation_size(),
            action_size = self.agent.action_size(),
            behavior = ?self.behavior,
            max_steps = self.settings.max_steps,
            "control loop initialized"
        );
        self.reset(world);
        Ok(())
    }

    /// Start a new episode: the agent repositions itself and its goal, and
    /// the ledger, last action and grace timer start from zero.
    pub fn reset(&mut self, world: &mut dyn PhysicsWorld) {
        // notifications from before the reset belong to the old episode
        world.drain_contacts();
        if let Err(err) = self.agent.reset(world, &mut self.rng) {
            error!(agent = self.agent.name(), %err, "agent reset failed");
        }
        self.episodes += 1;
        self.episode = Episode::begin(self.episodes, self.clock);
        self.last_action = vec![0.0; self.agent.action_size()];
        debug!(episode = self.episodes, start = self.clock, "episode started");
    }

    /// Advance the control cycle by one fixed step of `dt` seconds.
    pub fn tick(&mut self, world: &mut dyn PhysicsWorld, dt: f32) -> TickReport {
        if !self.initialized {
            return self.report(0.0, false, Some(ControlError::Uninitialized));
        }
        if !self.episode.is_running() {
            return self.report(0.0, false, None);
        }
        let before = self.episode.cumulative_reward();

        for event in world.drain_contacts() {
            self.agent.on_contact(&event, &mut self.episode);
        }

        let (observation, mut failure) = self.observe(world);

        let actuated = match self.decide(world, &observation).and_then(|action| self.actuate(world, &action, dt)) {
            Ok(()) => true,
            Err(err) => {
                error!(agent = self.agent.name(), episode = self.episode.number(), %err, "actuation skipped");
                failure.get_or_insert(err);
                false
            }
        };

        if let Err(err) = self.agent.reward(world, dt, &mut self.episode) {
            error!(agent = self.agent.name(), %err, "reward evaluation failed");
            failure.get_or_insert(err.into());
        }

        self.episode.advance(dt);
        self.clock += f64::from(dt);

        self.evaluate_terminal(world);
        self.truncate();

        let reward = self.episode.cumulative_reward() - before;
        self.report(reward, actuated, failure)
    }

    /// Ask the agent for a terminal condition and apply it on the first
    /// firing only. Returns `true` if this call ended the episode.
    pub fn evaluate_terminal(&mut self, world: &dyn PhysicsWorld) -> bool {
        if !self.episode.is_running() {
            return false;
        }
        let terminal = match self.agent.check_terminal(world, &self.episode) {
            Ok(terminal) => terminal,
            Err(err) => {
                error!(agent = self.agent.name(), %err, "terminal check failed");
                None
            }
        };
        let Some(terminal) = terminal else {
            return false;
        };
        let fired = self
            .episode
            .finish(terminal.cause, Some((terminal.term, terminal.reward)));
        if fired {
            info!(
                agent = self.agent.name(),
                episode = self.episode.number(),
                cause = ?terminal.cause,
                steps = self.episode.steps(),
                reward = self.episode.cumulative_reward(),
                "episode finished"
            );
        }
        fired
    }

    fn truncate(&mut self) {
        let limit = self.settings.max_steps;
        if limit > 0 && self.episode.steps() >= limit && self.episode.finish(EpisodeEnd::Interrupted, None) {
            info!(
                agent = self.agent.name(),
                episode = self.episode.number(),
                cause = ?EpisodeEnd::Interrupted,
                steps = self.episode.steps(),
                reward = self.episode.cumulative_reward(),
                "episode finished"
            );
        }
    }

    fn observe(&self, world: &dyn PhysicsWorld) -> (Observation, Option<ControlError>) {
        let size = self.agent.observation_size();
        let mut builder = ObservationBuilder::with_capacity(size);
        if let Err(err) = self.agent.observe(world, &mut builder) {
            error!(agent = self.agent.name(), %err, "observation failed");
            return (Observation::zeros(size), Some(err.into()));
        }
        if builder.len() == size {
            return (builder.finish(size), None);
        }
        let err = ControlError::MalformedObservation {
            expected: size,
            actual: builder.len(),
        };
        error!(agent = self.agent.name(), %err, "observation resized");
        (builder.finish(size), Some(err))
    }

    fn decide(&mut self, world: &dyn PhysicsWorld, observation: &Observation) -> Result<Vec<f32>, ControlError> {
        match &mut self.behavior {
            BehaviorMode::Inference(policy) => Ok(policy.decide(observation)),
            BehaviorMode::Heuristic => {
                let input = self
                    .operator_control
                    .then(|| self.operator_input.unwrap_or_default());
                Ok(self.agent.heuristic(world, input.as_ref())?)
            }
        }
    }

    fn actuate(&mut self, world: &mut dyn PhysicsWorld, action: &[f32], dt: f32) -> Result<(), ControlError> {
        validate_arity(action, self.agent.action_size())?;
        let action = clamped(action);
        let penalty = self.agent.smoothness().reward(&action, &self.last_action, dt);
        self.agent.apply_action(world, &action)?;
        self.episode.add_reward(ShapingTerm::InputSmoothness, penalty);
        self.last_action = action;
        Ok(())
    }

    fn report(&self, reward: f32, actuated: bool, error: Option<ControlError>) -> TickReport {
        TickReport {
            step: self.episode.steps(),
            reward,
            done: self.initialized && !self.episode.is_running(),
            end: self.episode.end(),
            actuated,
            error,
        }
    }

    #[must_use]
    pub fn cumulative_reward(&self) -> f32 {
        self.episode.cumulative_reward()
    }

    /// Cumulative reward as shown on a scoreboard.
    #[must_use]
    pub fn reward_text(&self) -> String {
        format!("{:.2}", self.cumulative_reward())
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        !self.episode.is_running()
    }

    #[must_use]
    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    #[must_use]
    pub fn last_action(&self) -> &[f32] {
        &self.last_action
    }

    #[must_use]
    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut A {
        &mut self.agent
    }

    #[must_use]
    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Simulated seconds ticked since construction.
    #[must_use]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn set_behavior(&mut self, behavior: BehaviorMode) {
        debug!(behavior = ?behavior, "behavior changed");
        self.behavior = behavior;
    }

    pub fn set_operator_input(&mut self, input: Option<OperatorInput>) {
        self.operator_input = input;
    }

    /// Switch the heuristic between operator input and its scripted policy.
    pub fn toggle_operator_control(&mut self) -> bool {
        self.operator_control = !self.operator_control;
        info!(operator_control = self.operator_control, "operator control toggled");
        self.operator_control
    }
}
