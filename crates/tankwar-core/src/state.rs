//! Arena snapshot: the complete visible state produced after each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{Archetype, BehaviorKind};
use crate::events::AiEvent;
use crate::types::{AgentId, ObjectId, SimTime};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub time: SimTime,
    pub paused: bool,
    pub player: Option<PlayerView>,
    /// Sorted by agent id.
    pub agents: Vec<AgentView>,
    pub projectiles: Vec<ProjectileView>,
    /// Events raised during this tick.
    pub events: Vec<AiEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: ObjectId,
    pub position: Vec3,
    pub forward: Vec3,
    pub health: f32,
    pub making_noise: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub archetype: Archetype,
    pub behavior: BehaviorKind,
    pub position: Vec3,
    pub forward: Vec3,
    pub health: f32,
    pub fleeing: bool,
    pub target: Option<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub shooter: ObjectId,
    pub position: Vec3,
    pub direction: Vec3,
}
