//! The concrete agents and the scenes they are trained in.

pub mod cave_crawler;
pub mod pogo_bouncer;

pub use cave_crawler::{CaveCrawler, CaveCrawlerConfig};
pub use pogo_bouncer::{FootContact, PogoBouncer, PogoBouncerConfig};
