//! Agent system: runs each agent's reactive loop against the arena.
//!
//! Agents are ticked in registry order. Each one borrows its brain and pose
//! out of the ECS world, acts through a `KinematicBody` over the tick's
//! `ArenaView`, and has its pose written back. Shots are buffered and
//! returned for spawning once every agent has run.

use hecs::World;

use tankwar_ai::world::{MovableBody, TickContext};
use tankwar_ai::Agent;
use tankwar_core::components::Collider;
use tankwar_core::events::AiEvent;
use tankwar_core::types::Pose;

use crate::arena::{ArenaView, KinematicBody, ShotBuffer, ShotRequest};
use crate::registry::AgentRegistry;

pub fn run(
    world: &mut World,
    view: &ArenaView,
    registry: &AgentRegistry,
    now: f32,
    dt: f32,
    events: &mut Vec<AiEvent>,
) -> Vec<ShotRequest> {
    let mut shots = ShotBuffer::default();

    for (id, entity) in registry.iter() {
        let Ok((agent, pose, collider)) =
            world.query_one_mut::<(&mut Agent, &mut Pose, &Collider)>(entity)
        else {
            tracing::warn!(agent = %id, "registered agent has no entity");
            continue;
        };

        let mut body = KinematicBody::new(*pose, id, collider.radius, dt, view);
        let report = {
            let mut ctx = TickContext {
                now,
                body: &mut body,
                world: view,
                spawner: &mut shots,
            };
            agent.tick(&mut ctx)
        };
        *pose = body.pose();
        events.extend(report.events);
    }

    shots.into_shots()
}
