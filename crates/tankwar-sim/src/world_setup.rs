//! Entity spawn factories for setting up the arena.
//!
//! Creates obstacles, the player tank, AI tanks and projectiles with
//! appropriate component bundles.

use glam::Vec3;
use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use tankwar_ai::patrol::PatrolRoute;
use tankwar_ai::Agent;
use tankwar_core::components::*;
use tankwar_core::config::{AgentSpawn, ObstacleSpawn};
use tankwar_core::constants::*;
use tankwar_core::types::{flatten, AgentId, ObjectId, Pose};

use crate::arena::ShotRequest;

pub fn spawn_obstacle(world: &mut World, id: ObjectId, obstacle: &ObstacleSpawn) -> Entity {
    world.spawn((
        Obstacle,
        Pose::new(obstacle.position, Vec3::Z),
        Collider {
            id,
            radius: obstacle.radius,
        },
    ))
}

/// Spawn the player tank facing +Z with full health.
pub fn spawn_player(world: &mut World, id: ObjectId, position: Vec3) -> Entity {
    world.spawn((
        Player,
        PlayerControl::default(),
        Pose::new(position, Vec3::Z),
        Collider {
            id,
            radius: TANK_RADIUS,
        },
        Health {
            current: TANK_MAX_HEALTH,
            max: TANK_MAX_HEALTH,
        },
    ))
}

/// Spawn an AI tank and its brain. The caller registers it.
pub fn spawn_agent(world: &mut World, id: AgentId, spawn: &AgentSpawn) -> Entity {
    let config = spawn.config.normalized();
    let route = PatrolRoute::new(spawn.waypoints.clone(), spawn.looping);
    let agent = Agent::new(id, config, route);
    world.spawn((
        Tank {
            archetype: config.archetype,
        },
        Pose::new(spawn.position, spawn.forward),
        Collider {
            id,
            radius: TANK_RADIUS,
        },
        Health {
            current: TANK_MAX_HEALTH,
            max: TANK_MAX_HEALTH,
        },
        agent,
    ))
}

pub fn spawn_projectile(world: &mut World, shot: &ShotRequest, now: f32) -> Entity {
    world.spawn((
        Pose::new(shot.origin, shot.direction),
        Projectile {
            shooter: shot.shooter,
            direction: flatten(shot.direction).normalize_or_zero(),
            speed: shot.speed,
            damage: shot.damage,
            spawned_at_secs: now,
        },
    ))
}

/// Choose a respawn point: one of the level's spawns, or anywhere in the arena.
pub fn pick_spawn_point(rng: &mut ChaCha8Rng, spawns: &[Vec3]) -> Vec3 {
    if let Some(point) = spawns.choose(rng) {
        return *point;
    }
    let extent = ARENA_HALF_EXTENT * 0.5;
    Vec3::new(
        rng.gen_range(-extent..extent),
        0.0,
        rng.gen_range(-extent..extent),
    )
}
