//! Arena-side implementations of the AI collaborator traits.
//!
//! `ArenaView` is a per-tick capture of every collider and target, so the
//! agent loop can read the scene while individual agents are borrowed
//! mutably out of the ECS world.

use glam::Vec3;
use hecs::{Entity, World};

use tankwar_ai::world::{
    ray_sphere, turn_toward, MovableBody, ProjectileSpawner, RayHit, TargetView, WorldQuery,
};
use tankwar_core::components::{Collider, Player, PlayerControl};
use tankwar_core::constants::PLAYER_FIRE_NOISE_SECS;
use tankwar_core::types::{flatten, AgentId, ObjectId, Pose};

/// One sphere collider as it stood at capture time.
#[derive(Debug, Clone, Copy)]
pub struct ColliderEntry {
    pub entity: Entity,
    pub id: ObjectId,
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ArenaView {
    colliders: Vec<ColliderEntry>,
    targets: Vec<TargetView>,
}

impl ArenaView {
    /// Capture colliders and players. `now` decides whether a player is noisy.
    pub fn capture(world: &World, now: f32) -> Self {
        let mut colliders: Vec<ColliderEntry> = world
            .query::<(&Collider, &Pose)>()
            .iter()
            .map(|(entity, (collider, pose))| ColliderEntry {
                entity,
                id: collider.id,
                center: pose.position,
                radius: collider.radius,
            })
            .collect();
        colliders.sort_by_key(|c| c.id);

        let mut targets: Vec<TargetView> = world
            .query::<(&Player, &Collider, &Pose, &PlayerControl)>()
            .iter()
            .map(|(_, (_, collider, pose, control))| TargetView {
                id: collider.id,
                position: pose.position,
                making_noise: is_making_noise(control, now),
            })
            .collect();
        targets.sort_by_key(|t| t.id);

        Self { colliders, targets }
    }

    pub fn colliders(&self) -> &[ColliderEntry] {
        &self.colliders
    }

    /// First collider a moving sphere of `radius` would touch along a segment.
    pub fn sweep(
        &self,
        origin: Vec3,
        direction: Vec3,
        length: f32,
        radius: f32,
        ignore: ObjectId,
    ) -> Option<(ColliderEntry, f32)> {
        self.colliders
            .iter()
            .filter(|c| c.id != ignore)
            .filter_map(|c| {
                ray_sphere(origin, direction, c.center, c.radius + radius)
                    .filter(|d| *d <= length)
                    .map(|d| (*c, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

impl WorldQuery for ArenaView {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        self.colliders
            .iter()
            .filter_map(|c| {
                ray_sphere(origin, direction, c.center, c.radius)
                    .filter(|d| *d <= max_distance)
                    .map(|distance| RayHit {
                        object: c.id,
                        distance,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn nearest_target(&self, from: Vec3) -> Option<ObjectId> {
        self.targets
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance_squared(from)
                    .total_cmp(&b.position.distance_squared(from))
            })
            .map(|t| t.id)
    }

    fn resolve_target(&self, id: ObjectId) -> Option<TargetView> {
        self.targets.iter().find(|t| t.id == id).copied()
    }
}

/// Moving, or recently fired.
pub fn is_making_noise(control: &PlayerControl, now: f32) -> bool {
    let moving = flatten(control.velocity) != Vec3::ZERO;
    let firing = control
        .last_fired_secs
        .is_some_and(|at| now - at < PLAYER_FIRE_NOISE_SECS);
    moving || firing
}

/// Push a ground-plane sphere out of every other collider it overlaps.
pub fn resolve_overlaps(position: Vec3, radius: f32, own: ObjectId, view: &ArenaView) -> Vec3 {
    let mut resolved = position;
    for other in view.colliders().iter().filter(|c| c.id != own) {
        let offset = flatten(resolved - other.center);
        let min_distance = radius + other.radius;
        let distance = offset.length();
        if distance >= min_distance {
            continue;
        }
        let push = offset.try_normalize().unwrap_or(Vec3::X);
        let corrected = flatten(other.center) + push * min_distance;
        resolved = Vec3::new(corrected.x, resolved.y, corrected.z);
    }
    resolved
}

/// An agent's hull for the duration of its tick.
pub struct KinematicBody<'a> {
    pose: Pose,
    id: ObjectId,
    radius: f32,
    dt: f32,
    view: &'a ArenaView,
}

impl<'a> KinematicBody<'a> {
    pub fn new(pose: Pose, id: ObjectId, radius: f32, dt: f32, view: &'a ArenaView) -> Self {
        Self {
            pose,
            id,
            radius,
            dt,
            view,
        }
    }
}

impl MovableBody for KinematicBody<'_> {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn move_in_direction(&mut self, direction: Vec3, speed: f32) {
        let step = flatten(direction).normalize_or_zero() * speed * self.dt;
        let moved = self.pose.position + step;
        self.pose.position = resolve_overlaps(moved, self.radius, self.id, self.view);
    }

    fn rotate_toward(&mut self, point: Vec3, max_degrees_per_sec: f32) {
        let desired = point - self.pose.position;
        let max_radians = (max_degrees_per_sec * self.dt).to_radians();
        self.pose.forward = turn_toward(self.pose.forward, desired, max_radians);
    }
}

/// A shot requested during the agent pass.
#[derive(Debug, Clone, Copy)]
pub struct ShotRequest {
    pub shooter: AgentId,
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub damage: f32,
}

/// Collects shots; projectiles are spawned once the agent pass is done.
#[derive(Debug, Default)]
pub struct ShotBuffer {
    shots: Vec<ShotRequest>,
}

impl ShotBuffer {
    pub fn into_shots(self) -> Vec<ShotRequest> {
        self.shots
    }
}

impl ProjectileSpawner for ShotBuffer {
    fn fire(&mut self, shooter: AgentId, origin: Vec3, direction: Vec3, speed: f32, damage: f32) {
        self.shots.push(ShotRequest {
            shooter,
            origin,
            direction,
            speed,
            damage,
        });
    }
}
