//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components. `Pose` from `types` is
//! attached directly as the spatial component.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::Archetype;
use crate::types::ObjectId;

/// Anything a ray or projectile can strike. Spheres only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub id: ObjectId,
    pub radius: f32,
}

/// Hit points. The entity is destroyed when `current` reaches zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

/// Marks the player tank.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Player;

/// Input state of the player tank, set by commands.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlayerControl {
    /// Ground-plane velocity (m/s).
    pub velocity: Vec3,
    /// Simulation time of the last shot, if any.
    pub last_fired_secs: Option<f32>,
}

/// Marks an AI-driven tank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tank {
    pub archetype: Archetype,
}

/// Marks a static obstacle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Obstacle;

/// A shell in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile {
    pub shooter: ObjectId,
    /// Unit travel direction.
    pub direction: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub spawned_at_secs: f32,
}

/// Marks an entity for removal at the end of the tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Destroyed;
