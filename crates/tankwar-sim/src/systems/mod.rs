//! ECS systems that operate on the arena each tick.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for read-only).
//! They do not own state. All state lives in components, the agent
//! registry, and the per-tick `ArenaView`.

pub mod agents;
pub mod cleanup;
pub mod movement;
pub mod projectiles;
pub mod snapshot;
