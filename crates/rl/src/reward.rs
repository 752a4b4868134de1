use std::fmt;

use serde::Serialize;

/// Named additive components of the reward signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapingTerm {
    Speed,
    Facing,
    Distance,
    Impact,
    InputSmoothness,
    Survival,
    Height,
    Tilt,
    Fall,
    Collision,
    Goal,
}

impl ShapingTerm {
    pub const COUNT: usize = 11;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Speed,
        Self::Facing,
        Self::Distance,
        Self::Impact,
        Self::InputSmoothness,
        Self::Survival,
        Self::Height,
        Self::Tilt,
        Self::Fall,
        Self::Collision,
        Self::Goal,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Facing => "facing",
            Self::Distance => "distance",
            Self::Impact => "impact",
            Self::InputSmoothness => "input_smoothness",
            Self::Survival => "survival",
            Self::Height => "height",
            Self::Tilt => "tilt",
            Self::Fall => "fall",
            Self::Collision => "collision",
            Self::Goal => "goal",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ShapingTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-episode reward, kept both as a running total and per term.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardLedger {
    terms: [f32; ShapingTerm::COUNT],
    total: f32,
}

impl RewardLedger {
    pub fn add(&mut self, term: ShapingTerm, value: f32) {
        self.terms[term.index()] += value;
        self.total += value;
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        self.total
    }

    #[must_use]
    pub fn term(&self, term: ShapingTerm) -> f32 {
        self.terms[term.index()]
    }

    /// Terms that received any reward, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ShapingTerm, f32)> + '_ {
        ShapingTerm::ALL
            .into_iter()
            .map(|term| (term, self.term(term)))
            .filter(|(_, value)| *value != 0.0)
    }
}
