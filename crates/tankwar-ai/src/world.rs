//! Collaborator interfaces the agents drive.
//!
//! The AI never touches physics directly. A host (the sim harness, or test
//! fakes) implements these traits and hands them to `Agent::tick` through a
//! `TickContext`.

use glam::{Quat, Vec3};

use tankwar_core::types::{flatten, AgentId, ObjectId, Pose};

/// First collider struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub object: ObjectId,
    pub distance: f32,
}

/// What an agent may know about its target this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub id: ObjectId,
    pub position: Vec3,
    pub making_noise: bool,
}

/// The agent's own hull. Owns the timestep.
pub trait MovableBody {
    fn pose(&self) -> Pose;

    /// Translate along `direction` (projected onto the ground) at `speed` m/s.
    fn move_in_direction(&mut self, direction: Vec3, speed: f32);

    fn move_forward(&mut self, speed: f32) {
        let forward = self.pose().forward;
        self.move_in_direction(forward, speed);
    }

    /// Yaw toward `point`, at most `max_degrees_per_sec` this step.
    fn rotate_toward(&mut self, point: Vec3, max_degrees_per_sec: f32);
}

/// Read-only view of the arena.
pub trait WorldQuery {
    /// Nearest collider along a ray. Colliders containing `origin` are skipped.
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;

    /// Closest thing worth targeting, if any exists.
    fn nearest_target(&self, from: Vec3) -> Option<ObjectId>;

    /// Current view of a target, or `None` once it no longer exists.
    fn resolve_target(&self, id: ObjectId) -> Option<TargetView>;
}

pub trait ProjectileSpawner {
    fn fire(&mut self, shooter: AgentId, origin: Vec3, direction: Vec3, speed: f32, damage: f32);
}

/// Everything one agent tick may touch.
pub struct TickContext<'a> {
    /// Simulation time in seconds.
    pub now: f32,
    pub body: &'a mut dyn MovableBody,
    pub world: &'a dyn WorldQuery,
    pub spawner: &'a mut dyn ProjectileSpawner,
}

/// Rotate `forward` about the up axis toward `desired`, by at most `max_radians`.
///
/// Both vectors are flattened onto the ground plane. Returns `forward`
/// unchanged if either is degenerate.
pub fn turn_toward(forward: Vec3, desired: Vec3, max_radians: f32) -> Vec3 {
    let (Some(from), Some(to)) = (
        flatten(forward).try_normalize(),
        flatten(desired).try_normalize(),
    ) else {
        return forward;
    };
    let angle = from.angle_between(to);
    if angle <= max_radians {
        return to;
    }
    let sign = if from.cross(to).y >= 0.0 { 1.0 } else { -1.0 };
    (Quat::from_rotation_y(sign * max_radians) * from).normalize()
}

/// Distance along a unit ray to the entry point of a sphere.
///
/// Returns `None` on a miss, when the sphere is behind the origin, or when
/// the origin lies inside the sphere.
pub fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = origin - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let b = offset.dot(direction);
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}
