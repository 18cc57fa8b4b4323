//! Projectile flight, hits and expiry.
//!
//! Shells fly straight. A shell that would touch a collider this tick stops
//! there and damages it if it has health. The shooter is never hit by its
//! own shell.

use hecs::{Entity, World};

use tankwar_core::components::{Destroyed, Health, Projectile};
use tankwar_core::constants::{ARENA_HALF_EXTENT, PROJECTILE_LIFESPAN_SECS, PROJECTILE_RADIUS};
use tankwar_core::events::AiEvent;
use tankwar_core::types::Pose;

use crate::arena::ArenaView;

pub fn run(world: &mut World, view: &ArenaView, now: f32, dt: f32, events: &mut Vec<AiEvent>) {
    // Collect outcomes in a buffer to avoid borrow issues with hecs
    let mut spent: Vec<Entity> = Vec::new();
    let mut hits: Vec<(Entity, Projectile, Entity)> = Vec::new();

    for (entity, (projectile, pose)) in world.query_mut::<(&Projectile, &mut Pose)>() {
        if now - projectile.spawned_at_secs >= PROJECTILE_LIFESPAN_SECS {
            spent.push(entity);
            continue;
        }

        let step = projectile.speed * dt;
        match view.sweep(
            pose.position,
            projectile.direction,
            step,
            PROJECTILE_RADIUS,
            projectile.shooter,
        ) {
            Some((victim, distance)) => {
                pose.position += projectile.direction * distance;
                hits.push((entity, *projectile, victim.entity));
            }
            None => {
                pose.position += projectile.direction * step;
                let out = pose.position.x.abs() > ARENA_HALF_EXTENT
                    || pose.position.z.abs() > ARENA_HALF_EXTENT;
                if out {
                    spent.push(entity);
                }
            }
        }
    }

    for (shell, projectile, victim) in hits {
        spent.push(shell);
        let Some(victim_id) = view
            .colliders()
            .iter()
            .find(|c| c.entity == victim)
            .map(|c| c.id)
        else {
            continue;
        };
        if let Ok(mut health) = world.get::<&mut Health>(victim) {
            if health.current <= 0.0 {
                continue;
            }
            health.current = (health.current - projectile.damage).max(0.0);
            tracing::debug!(
                shooter = %projectile.shooter,
                victim = %victim_id,
                remaining = health.current,
                "projectile hit"
            );
            events.push(AiEvent::ProjectileHit {
                shooter: projectile.shooter,
                victim: victim_id,
                damage: projectile.damage,
            });
        }
    }

    for entity in spent {
        let _ = world.insert_one(entity, Destroyed);
    }
}
