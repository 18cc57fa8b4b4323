//! Cleanup system: removes spent projectiles and destroyed tanks.

use hecs::{Entity, World};

use tankwar_core::components::{Collider, Destroyed, Health, Player, Tank};
use tankwar_core::events::AiEvent;

use crate::registry::AgentRegistry;

/// Despawn everything marked `Destroyed` or out of health.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(
    world: &mut World,
    registry: &mut AgentRegistry,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<AiEvent>,
) {
    despawn_buffer.clear();

    for (entity, _) in world.query_mut::<&Destroyed>() {
        despawn_buffer.push(entity);
    }

    // Tanks at zero health leave the registry before they leave the world.
    for (entity, (health, collider, tank)) in
        world.query_mut::<(&Health, &Collider, Option<&Tank>)>()
    {
        if health.current > 0.0 {
            continue;
        }
        if tank.is_some() {
            registry.unregister(collider.id);
            tracing::info!(agent = %collider.id, "agent destroyed");
            events.push(AiEvent::AgentDestroyed { agent: collider.id });
        }
        despawn_buffer.push(entity);
    }

    for (entity, (_player, health)) in world.query_mut::<(&Player, &Health)>() {
        if health.current <= 0.0 {
            tracing::info!(?entity, "player destroyed");
            events.push(AiEvent::PlayerDestroyed);
        }
    }

    despawn_buffer.sort_unstable();
    despawn_buffer.dedup();
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
