//! Player kinematics.
//!
//! Integrates the commanded ground velocity each tick and turns the hull to
//! face the direction of travel. Other colliders push the player out.

use glam::Vec3;
use hecs::World;

use tankwar_core::components::{Collider, Player, PlayerControl};
use tankwar_core::types::{flatten, Pose};

use crate::arena::{resolve_overlaps, ArenaView};

pub fn run(world: &mut World, view: &ArenaView, dt: f32) {
    for (_entity, (_player, control, collider, pose)) in
        world.query_mut::<(&Player, &PlayerControl, &Collider, &mut Pose)>()
    {
        let velocity = flatten(control.velocity);
        if velocity == Vec3::ZERO {
            continue;
        }
        let moved = pose.position + velocity * dt;
        pose.position = resolve_overlaps(moved, collider.radius, collider.id, view);
        pose.forward = velocity.normalize();
    }
}
