use thiserror::Error;

use crate::types::{BodyId, JointId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("unknown body {0}")]
    UnknownBody(BodyId),
    #[error("unknown joint {0}")]
    UnknownJoint(JointId),
    #[error("simulation has no bodies")]
    NoBodies,
    #[error("non-finite value for {0}")]
    NonFinite(&'static str),
}
