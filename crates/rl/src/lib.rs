#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]
//! # Episodic Control
//!
//! Drives one embodied agent through repeated observe, act, reward and
//! reset cycles over a [`physics::PhysicsWorld`].
//!
//! ## Key Components
//!
//! -   **[`ControlLoop`]:** owns the current [`Episode`] and runs one tick per
//!     fixed simulation step.
//! -   **[`Agent`]:** what an agent must provide: sensing, actuation, shaping
//!     terms, terminal conditions, reset placement and a heuristic.
//! -   **[`PolicySource`]:** where actions come from when not using the
//!     heuristic.
//! -   **Agents:** [`CaveCrawler`] and [`PogoBouncer`], each with a scene
//!     builder for the bundled [`physics::PhysicsSim`].
//!
//! ## Usage
//!
//! ```rust
//! use rl::{BehaviorMode, CaveCrawler, CaveCrawlerConfig, ControlLoop, LoopSettings};
//!
//! let (mut world, agent) = CaveCrawler::scene(CaveCrawlerConfig::default());
//! let settings = LoopSettings { max_steps: 50, ..LoopSettings::default() };
//! let mut control = ControlLoop::new(agent, BehaviorMode::Heuristic, settings);
//! control.initialize(&mut world).unwrap();
//! while !control.is_done() {
//!     world.step(settings.dt);
//!     control.tick(&mut world, settings.dt);
//! }
//! assert!(control.episode().steps() <= 50);
//! ```

pub mod action;
pub mod agents;
pub mod config;
pub mod control_loop;
pub mod env;
pub mod episode;
pub mod error;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod sensor;
pub mod spawn;

pub use action::{SmoothnessNorm, SmoothnessPenalty};
pub use agents::{CaveCrawler, CaveCrawlerConfig, PogoBouncer, PogoBouncerConfig};
pub use config::{AgentKind, ArenaConfig};
pub use control_loop::{ControlLoop, LoopSettings, TickReport};
pub use env::Agent;
pub use episode::{Episode, EpisodeEnd, EpisodeState, Terminal};
pub use error::{ConfigError, ControlError};
pub use observation::{Observation, ObservationBuilder};
pub use policy::{BehaviorMode, FnPolicy, OperatorInput, PolicySource, RandomPolicy, ZeroPolicy};
pub use reward::{RewardLedger, ShapingTerm};
pub use sensor::RayFan;
pub use spawn::SpawnRegion;
