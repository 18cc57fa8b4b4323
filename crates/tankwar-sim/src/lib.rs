//! Headless arena simulation for tankwar.
//!
//! Owns the hecs ECS world, drives every AI tank's reactive loop at a fixed
//! tick rate, and produces ArenaSnapshots for whoever is watching.

pub mod arena;
pub mod engine;
pub mod error;
pub mod registry;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use error::CommandError;
pub use registry::AgentRegistry;
pub use tankwar_core as core;
