//! Action vectors and the smoothness penalty computed from them.

use serde::{Deserialize, Serialize};

use crate::error::ControlError;

pub const ACTION_MIN: f32 = -1.0;
pub const ACTION_MAX: f32 = 1.0;

/// Check that a policy produced exactly `expected` components.
pub fn validate_arity(action: &[f32], expected: usize) -> Result<(), ControlError> {
    if action.len() == expected {
        Ok(())
    } else {
        Err(ControlError::MalformedAction {
            expected,
            actual: action.len(),
        })
    }
}

/// Clamp one component into `[-1, 1]`. NaN becomes zero.
#[must_use]
pub fn clamp_component(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(ACTION_MIN, ACTION_MAX)
    }
}

#[must_use]
pub fn clamped(action: &[f32]) -> Vec<f32> {
    action.iter().copied().map(clamp_component).collect()
}

/// How an action is compared against the previous one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothnessNorm {
    /// Sum of absolute differences to the last action.
    L1Delta,
    /// Euclidean distance to the last action.
    L2Delta,
    /// Mean of the squared components, ignoring the last action.
    MeanSquare,
}

/// Per-tick penalty discouraging jittery control.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmoothnessPenalty {
    pub norm: SmoothnessNorm,
    pub weight: f32,
}

impl SmoothnessPenalty {
    /// Non-negative magnitude of the action under this norm.
    #[must_use]
    pub fn measure(&self, action: &[f32], last: &[f32]) -> f32 {
        let delta = |i: usize| action[i] - last.get(i).copied().unwrap_or(0.0);
        match self.norm {
            SmoothnessNorm::L1Delta => (0..action.len()).map(|i| delta(i).abs()).sum(),
            SmoothnessNorm::L2Delta => (0..action.len()).map(|i| delta(i).powi(2)).sum::<f32>().sqrt(),
            SmoothnessNorm::MeanSquare => {
                if action.is_empty() {
                    0.0
                } else {
                    action.iter().map(|a| a * a).sum::<f32>() / action.len() as f32
                }
            }
        }
    }

    /// Reward contribution for one tick of length `dt`; never positive.
    #[must_use]
    pub fn reward(&self, action: &[f32], last: &[f32], dt: f32) -> f32 {
        -self.weight * self.measure(action, last) * dt
    }
}
