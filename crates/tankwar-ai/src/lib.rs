//! Tank AI: perception, behaviors, and the per-agent reactive loop.
//!
//! Operates on plain data and the collaborator traits in `world`.
//! No ECS dependency.

pub mod agent;
pub mod behavior;
pub mod error;
pub mod patrol;
pub mod perception;
pub mod policy;
pub mod timer;
pub mod world;

pub use agent::{Agent, TickReport};
pub use error::TransitionRejected;
pub use tankwar_core as core;

#[cfg(test)]
mod tests;
