//! Commands sent to the simulation from a driver (runner, tests, frontend).
//!
//! Commands are queued and processed at the next tick boundary.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::BehaviorKind;
use crate::types::AgentId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    // --- Player ---
    /// Set the player's ground-plane velocity (m/s). Zero stops it.
    SetPlayerVelocity { velocity: Vec3 },
    /// Fire the player's gun along its current facing.
    PlayerFire,
    /// Spawn (or respawn) the player. A random spawn point is used when absent.
    SpawnPlayer { position: Option<Vec3> },

    // --- Agents ---
    /// Request a behavior change. The archetype policy still applies.
    ForceBehavior { agent: AgentId, kind: BehaviorKind },
    /// Replace an agent's patrol route.
    SetPatrolRoute {
        agent: AgentId,
        waypoints: Vec<Vec3>,
        looping: bool,
    },
    AppendWaypoint { agent: AgentId, waypoint: Vec3 },
    /// Reset the agent's route cursor to the first waypoint.
    RestartPatrol { agent: AgentId },
    DespawnAgent { agent: AgentId },

    // --- Simulation control ---
    Pause,
    Resume,
}
