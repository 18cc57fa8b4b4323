//! Events emitted by the simulation for observers and tests.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{BehaviorKind, RejectReason};
use crate::types::{AgentId, ObjectId};

/// Something noteworthy the AI or the arena did during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AiEvent {
    /// An agent left one behavior and entered another.
    BehaviorChanged {
        agent: AgentId,
        from: BehaviorKind,
        to: BehaviorKind,
    },
    /// A requested transition was refused by the archetype policy.
    TransitionRejected {
        agent: AgentId,
        requested: BehaviorKind,
        reason: RejectReason,
    },
    /// An agent fired its gun.
    ShotFired {
        agent: AgentId,
        origin: Vec3,
        direction: Vec3,
    },
    /// An agent's hearing test succeeded.
    TargetHeard { agent: AgentId },
    /// A projectile struck something with health.
    ProjectileHit {
        shooter: ObjectId,
        victim: ObjectId,
        damage: f32,
    },
    AgentDestroyed { agent: AgentId },
    PlayerDestroyed,
    PlayerSpawned { position: Vec3 },
}
