//! Fundamental geometric and simulation types.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// World up axis. The arena floor is the XZ plane.
pub const UP: Vec3 = Vec3::Y;

/// Stable identifier for anything a ray can strike or an agent can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Agents share the object id space with every other collider.
pub type AgentId = ObjectId;

/// Position and facing of a body in simulation space (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Unit forward vector.
    pub forward: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        }
    }
}

impl Pose {
    /// Build a pose, normalizing `forward`. A zero forward falls back to +Z.
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        let forward = forward.try_normalize().unwrap_or(Vec3::Z);
        Self { position, forward }
    }

    /// Straight-line distance to a point.
    pub fn range_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    /// Unit direction from this pose to `point` (zero if coincident).
    pub fn direction_to(&self, point: Vec3) -> Vec3 {
        (point - self.position).normalize_or_zero()
    }

    /// Angle in degrees between forward and the direction to `point`.
    pub fn angle_to(&self, point: Vec3) -> f32 {
        let direction = self.direction_to(point);
        if direction == Vec3::ZERO {
            return 0.0;
        }
        self.forward.angle_between(direction).to_degrees()
    }

    /// Facing alignment: dot of forward with the unit direction to `point`.
    pub fn alignment_with(&self, point: Vec3) -> f32 {
        self.forward.dot(self.direction_to(point))
    }
}

/// Project a vector onto the arena floor.
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f32,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f32 * dt;
    }
}
