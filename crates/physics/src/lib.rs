#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]
//! # Arena Physics
//!
//! The world that agents live in. This crate defines the [`PhysicsWorld`]
//! interface the control loop consumes and ships [`PhysicsSim`], a small CPU
//! simulator implementing it.
//!
//! `PhysicsSim` is deliberately simple: dynamic bodies are spheres, level
//! geometry is made of planes and axis-aligned boxes, and integration is
//! semi-implicit Euler. It is good enough to drive agents headless and to
//! test them end to end; swap in a real engine by implementing
//! [`PhysicsWorld`] for it.
//!
//! ## Key Components
//!
//! -   **Bodies and geometry:** [`RigidBody`], [`Plane`] and [`StaticBox`] in
//!     the [`types`] module.
//! -   **Queries and effects:** [`PhysicsWorld`] with ray casts, forces,
//!     joint drives and contact notifications.
//! -   **Simulation:** [`PhysicsSim::step`] advances the world by one fixed
//!     tick.
//!
//! ## Usage
//!
//! ```rust
//! use physics::{PhysicsSim, PhysicsWorld, Vec3};
//!
//! let mut sim = PhysicsSim::new();
//! sim.add_plane(Vec3::Y, 0.0);
//! let ball = sim.add_sphere(Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, 0.5);
//! for _ in 0..100 {
//!     sim.step(0.02);
//! }
//! assert!(sim.body(ball).unwrap().position.y > 0.4);
//! ```

pub mod builder;
pub mod collision;
pub mod error;
pub mod integrator;
pub mod joint;
pub mod raycast;
pub mod simulation;
pub mod transform;
pub mod types;
pub mod world;

pub use builder::{calculate_sphere_mass, DriveJointDef};
pub use error::PhysicsError;
pub use joint::DriveJoint;
pub use simulation::PhysicsSim;
pub use types::{
    BodyId, BodyState, Collider, ForceMode, JointId, Material, PhysParams, Plane, Quat, RigidBody,
    StaticBox, Vec3,
};
pub use world::{ContactEvent, ContactPhase, JointLimits, JointTarget, PhysicsWorld, RayHit};
