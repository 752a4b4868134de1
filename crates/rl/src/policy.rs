//! Where actions come from.
//!
//! A [`PolicySource`] maps an observation to an action vector. The control
//! loop either asks one (inference) or falls back to the agent's own
//! heuristic, which may read an [`OperatorInput`] snapshot.

use std::fmt;

use glam::Vec2;

use crate::action::{ACTION_MAX, ACTION_MIN};

/// Decision-making collaborator of the control loop.
pub trait PolicySource {
    /// Produce an action for `observation`. The length is validated by the
    /// caller, so an implementation may return any arity.
    fn decide(&mut self, observation: &[f32]) -> Vec<f32>;
}

/// Always returns the no-op action.
#[derive(Copy, Clone, Debug)]
pub struct ZeroPolicy {
    pub arity: usize,
}

impl PolicySource for ZeroPolicy {
    fn decide(&mut self, _observation: &[f32]) -> Vec<f32> {
        vec![0.0; self.arity]
    }
}

/// Uniform random actions in the valid range.
pub struct RandomPolicy {
    arity: usize,
    rng: fastrand::Rng,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(arity: usize, seed: u64) -> Self {
        Self {
            arity,
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl PolicySource for RandomPolicy {
    fn decide(&mut self, _observation: &[f32]) -> Vec<f32> {
        (0..self.arity)
            .map(|_| ACTION_MIN + self.rng.f32() * (ACTION_MAX - ACTION_MIN))
            .collect()
    }
}

/// Adapts a closure into a policy.
pub struct FnPolicy<F>(pub F);

impl<F> PolicySource for FnPolicy<F>
where
    F: FnMut(&[f32]) -> Vec<f32>,
{
    fn decide(&mut self, observation: &[f32]) -> Vec<f32> {
        (self.0)(observation)
    }
}

/// Who drives the agent.
pub enum BehaviorMode {
    Inference(Box<dyn PolicySource>),
    Heuristic,
}

impl BehaviorMode {
    pub fn inference(policy: impl PolicySource + 'static) -> Self {
        Self::Inference(Box::new(policy))
    }
}

impl fmt::Debug for BehaviorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inference(_) => f.write_str("Inference"),
            Self::Heuristic => f.write_str("Heuristic"),
        }
    }
}

/// Snapshot of operator controls for one tick.
///
/// Axes are in `[-1, 1]`. `look` is a pointer delta and is only honoured
/// while `look_held` is set.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OperatorInput {
    pub strafe: f32,
    pub lift: f32,
    pub thrust: f32,
    pub look: Vec2,
    pub look_held: bool,
    pub roll: f32,
    pub jump: bool,
}
