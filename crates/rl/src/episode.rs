//! One attempt from reset to terminal.

use serde::Serialize;
use tracing::debug;

use crate::reward::{RewardLedger, ShapingTerm};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EpisodeState {
    Running,
    Terminal,
}

/// Why an episode stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeEnd {
    GoalReached,
    Fell,
    Collided,
    /// Step limit reached; no terminal reward.
    Interrupted,
}

/// A terminal condition reported by an agent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Terminal {
    pub cause: EpisodeEnd,
    pub term: ShapingTerm,
    pub reward: f32,
}

#[derive(Clone, Debug)]
pub struct Episode {
    number: u64,
    start_time: f64,
    elapsed: f32,
    steps: u32,
    state: EpisodeState,
    end: Option<EpisodeEnd>,
    rewards: RewardLedger,
}

impl Episode {
    #[must_use]
    pub fn begin(number: u64, start_time: f64) -> Self {
        Self {
            number,
            start_time,
            elapsed: 0.0,
            steps: 0,
            state: EpisodeState::Running,
            end: None,
            rewards: RewardLedger::default(),
        }
    }

    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Simulation clock at reset.
    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Seconds since reset.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    #[must_use]
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == EpisodeState::Running
    }

    #[must_use]
    pub fn end(&self) -> Option<EpisodeEnd> {
        self.end
    }

    #[must_use]
    pub fn rewards(&self) -> &RewardLedger {
        &self.rewards
    }

    #[must_use]
    pub fn cumulative_reward(&self) -> f32 {
        self.rewards.total()
    }

    /// Add a shaping term. Ignored once the episode is terminal.
    pub fn add_reward(&mut self, term: ShapingTerm, value: f32) {
        if self.is_running() {
            self.rewards.add(term, value);
        } else {
            debug!(episode = self.number, %term, value, "reward after terminal ignored");
        }
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        self.steps += 1;
        self.elapsed += dt;
    }

    /// Move to `Terminal`. Returns `false` if the episode had already ended,
    /// in which case nothing changes.
    pub fn finish(&mut self, cause: EpisodeEnd, reward: Option<(ShapingTerm, f32)>) -> bool {
        if !self.is_running() {
            return false;
        }
        if let Some((term, value)) = reward {
            self.rewards.add(term, value);
        }
        self.state = EpisodeState::Terminal;
        self.end = Some(cause);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_is_edge_triggered() {
        let mut episode = Episode::begin(1, 0.0);
        assert!(episode.finish(EpisodeEnd::GoalReached, Some((ShapingTerm::Goal, 2.0))));
        assert!(!episode.finish(EpisodeEnd::GoalReached, Some((ShapingTerm::Goal, 2.0))));
        assert!((episode.cumulative_reward() - 2.0).abs() < 1e-6);
        assert_eq!(episode.end(), Some(EpisodeEnd::GoalReached));
    }

    #[test]
    fn terminal_episode_rejects_rewards() {
        let mut episode = Episode::begin(1, 0.0);
        episode.add_reward(ShapingTerm::Speed, 1.0);
        episode.finish(EpisodeEnd::Interrupted, None);
        episode.add_reward(ShapingTerm::Speed, 1.0);
        assert!((episode.cumulative_reward() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn advance_counts_steps_and_time() {
        let mut episode = Episode::begin(3, 1.5);
        episode.advance(0.02);
        episode.advance(0.02);
        assert_eq!(episode.steps(), 2);
        assert!((episode.elapsed() - 0.04).abs() < 1e-6);
        assert!((episode.start_time() - 1.5).abs() < 1e-9);
    }
}
