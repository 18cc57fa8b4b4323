//! Snapshot system: queries the ECS world and builds a complete ArenaSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use tankwar_ai::Agent;
use tankwar_core::components::*;
use tankwar_core::events::AiEvent;
use tankwar_core::state::*;
use tankwar_core::types::{Pose, SimTime};

use crate::arena::is_making_noise;

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    paused: bool,
    events: Vec<AiEvent>,
) -> ArenaSnapshot {
    ArenaSnapshot {
        time: *time,
        paused,
        player: build_player(world, time.elapsed_secs),
        agents: build_agents(world),
        projectiles: build_projectiles(world),
        events,
    }
}

fn build_player(world: &World, now: f32) -> Option<PlayerView> {
    world
        .query::<(&Player, &Collider, &Pose, &Health, &PlayerControl)>()
        .iter()
        .next()
        .map(|(_, (_, collider, pose, health, control))| PlayerView {
            id: collider.id,
            position: pose.position,
            forward: pose.forward,
            health: health.current,
            making_noise: is_making_noise(control, now),
        })
}

fn build_agents(world: &World) -> Vec<AgentView> {
    let mut agents: Vec<AgentView> = world
        .query::<(&Agent, &Pose, &Health)>()
        .iter()
        .map(|(_, (agent, pose, health))| AgentView {
            id: agent.id(),
            archetype: agent.archetype(),
            behavior: agent.current_behavior_kind(),
            position: pose.position,
            forward: pose.forward,
            health: health.current,
            fleeing: agent.is_fleeing(),
            target: agent.target(),
        })
        .collect();
    agents.sort_by_key(|a| a.id);
    agents
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    world
        .query::<(&Projectile, &Pose)>()
        .iter()
        .map(|(_, (projectile, pose))| ProjectileView {
            shooter: projectile.shooter,
            position: pose.position,
            direction: projectile.direction,
        })
        .collect()
}
