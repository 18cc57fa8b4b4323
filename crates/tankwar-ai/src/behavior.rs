//! The five behaviors and their enter/execute/exit logic.
//!
//! Each variant carries only its transient data. `execute` never switches
//! behavior itself; it returns a `Handoff` and the agent applies it through
//! `Agent::change_state`, so the archetype policy always has the last word.

use glam::Vec3;

use tankwar_core::enums::BehaviorKind;
use tankwar_core::types::{flatten, Pose, UP};

use crate::agent::AgentCore;
use crate::timer::Deadline;
use crate::world::{MovableBody, TargetView, TickContext, WorldQuery};

/// Outcome of one `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    Stay,
    To(BehaviorKind),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Patrol { waypoint: Option<Vec3> },
    Chase,
    Attack { lost_sight: Option<Deadline> },
    Ambush,
    Flee {
        destination: Option<Vec3>,
        refresh: Option<Deadline>,
    },
}

impl Behavior {
    pub fn new(kind: BehaviorKind) -> Self {
        match kind {
            BehaviorKind::Patrol => Behavior::Patrol { waypoint: None },
            BehaviorKind::Chase => Behavior::Chase,
            BehaviorKind::Attack => Behavior::Attack { lost_sight: None },
            BehaviorKind::Ambush => Behavior::Ambush,
            BehaviorKind::Flee => Behavior::Flee {
                destination: None,
                refresh: None,
            },
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Patrol { .. } => BehaviorKind::Patrol,
            Behavior::Chase => BehaviorKind::Chase,
            Behavior::Attack { .. } => BehaviorKind::Attack,
            Behavior::Ambush => BehaviorKind::Ambush,
            Behavior::Flee { .. } => BehaviorKind::Flee,
        }
    }

    pub fn enter(&mut self, core: &mut AgentCore) {
        match self {
            Behavior::Patrol { waypoint } => {
                *waypoint = core.route.next_waypoint();
            }
            Behavior::Flee { .. } => {
                core.fleeing = true;
            }
            Behavior::Chase | Behavior::Attack { .. } | Behavior::Ambush => {}
        }
    }

    pub fn execute(
        &mut self,
        core: &mut AgentCore,
        ctx: &mut TickContext<'_>,
        target: Option<&TargetView>,
    ) -> Handoff {
        match self {
            Behavior::Patrol { waypoint } => execute_patrol(waypoint, core, ctx, target),
            Behavior::Chase => execute_chase(core, ctx, target),
            Behavior::Attack { lost_sight } => execute_attack(lost_sight, core, ctx, target),
            Behavior::Ambush => execute_ambush(core, ctx, target),
            Behavior::Flee {
                destination,
                refresh,
            } => execute_flee(destination, refresh, core, ctx, target),
        }
    }

    /// Leaving Flee by any route ends the retreat. Other payloads die with
    /// the variant; timers are generation-stamped.
    pub fn exit(&mut self, core: &mut AgentCore) {
        if let Behavior::Flee { .. } = self {
            core.fleeing = false;
        }
    }

    /// Forget the cached waypoint so the next tick fetches from the route.
    pub(crate) fn reset_waypoint(&mut self) {
        if let Behavior::Patrol { waypoint } = self {
            *waypoint = None;
        }
    }
}

/// Move toward `point` along the ground and yaw to face it.
fn steer_toward(body: &mut dyn MovableBody, point: Vec3, speed: f32, turn_rate_deg: f32) {
    let direction = flatten(point - body.pose().position).normalize_or_zero();
    if direction != Vec3::ZERO {
        body.move_in_direction(direction, speed);
    }
    body.rotate_toward(point, turn_rate_deg);
}

fn execute_patrol(
    waypoint: &mut Option<Vec3>,
    core: &mut AgentCore,
    ctx: &mut TickContext<'_>,
    target: Option<&TargetView>,
) -> Handoff {
    if waypoint.is_none() {
        *waypoint = core.route.next_waypoint();
    }

    match *waypoint {
        Some(point) => {
            let speeds = core.config.speeds;
            steer_toward(ctx.body, point, speeds.patrol, speeds.turn_rate_deg);
            let remaining = flatten(point - ctx.body.pose().position).length();
            if remaining < core.config.patrol.waypoint_tolerance {
                *waypoint = core.route.next_waypoint();
                tracing::trace!(agent = %core.id, ?waypoint, "waypoint reached");
            }
        }
        None if core.route.is_empty() => core.warn_no_route(),
        None => {}
    }

    let Some(reaction) = core.policy.on_sighting else {
        return Handoff::Stay;
    };
    let pose = ctx.body.pose();
    let spotted = core.sees(&pose, target, ctx.world)
        || (core.policy.hears_while_patrolling && core.hears(&pose, target, ctx.now));
    if spotted {
        Handoff::To(reaction)
    } else {
        Handoff::Stay
    }
}

fn execute_chase(
    core: &mut AgentCore,
    ctx: &mut TickContext<'_>,
    target: Option<&TargetView>,
) -> Handoff {
    let Some(view) = target else {
        return Handoff::To(BehaviorKind::Patrol);
    };
    let pose = ctx.body.pose();
    if !core.sees(&pose, target, ctx.world) && !core.audible(&pose, target) {
        tracing::trace!(agent = %core.id, "chase target lost");
        return Handoff::To(BehaviorKind::Patrol);
    }
    let speeds = core.config.speeds;
    steer_toward(ctx.body, view.position, speeds.chase, speeds.turn_rate_deg);
    Handoff::Stay
}

fn execute_ambush(
    core: &mut AgentCore,
    ctx: &mut TickContext<'_>,
    target: Option<&TargetView>,
) -> Handoff {
    let pose = ctx.body.pose();
    if core.sees(&pose, target, ctx.world) {
        Handoff::To(BehaviorKind::Attack)
    } else {
        Handoff::Stay
    }
}

fn execute_attack(
    lost_sight: &mut Option<Deadline>,
    core: &mut AgentCore,
    ctx: &mut TickContext<'_>,
    target: Option<&TargetView>,
) -> Handoff {
    let Some(view) = target else {
        return Handoff::To(BehaviorKind::Ambush);
    };

    let pose = ctx.body.pose();
    if !core.sees(&pose, target, ctx.world) {
        let grace = core.config.attack.lost_sight_grace_secs;
        let generation = core.generation;
        let deadline = *lost_sight.get_or_insert_with(|| Deadline::arm(ctx.now, grace, generation));
        if deadline.is_due(ctx.now, generation) {
            return Handoff::To(BehaviorKind::Ambush);
        }
        return Handoff::Stay;
    }
    *lost_sight = None;

    ctx.body.rotate_toward(view.position, core.config.speeds.turn_rate_deg);

    let pose = ctx.body.pose();
    if let Some(weapon) = core.weapon_ready(ctx.now) {
        if pose.alignment_with(view.position) > weapon.attack_alignment {
            core.fire(ctx, &pose, &weapon);
        }
    }
    Handoff::Stay
}

fn execute_flee(
    destination: &mut Option<Vec3>,
    refresh: &mut Option<Deadline>,
    core: &mut AgentCore,
    ctx: &mut TickContext<'_>,
    target: Option<&TargetView>,
) -> Handoff {
    let Some(view) = target else {
        core.fleeing = false;
        return Handoff::To(BehaviorKind::Patrol);
    };

    let pose = ctx.body.pose();
    let flee = core.config.flee;
    if pose.range_to(view.position) >= flee.safe_distance {
        core.fleeing = false;
        tracing::trace!(agent = %core.id, "reached safe distance");
        return Handoff::To(BehaviorKind::Patrol);
    }

    let due = match refresh {
        Some(deadline) => {
            deadline.is_due(ctx.now, core.generation) || deadline.is_stale(core.generation)
        }
        None => true,
    };
    if due || destination.is_none() {
        *destination = pick_flee_destination(&pose, view.position, core, ctx.world);
        *refresh = Some(Deadline::arm(ctx.now, flee.refresh_secs, core.generation));
    }

    if let Some(point) = *destination {
        let speeds = core.config.speeds;
        steer_toward(ctx.body, point, speeds.flee, speeds.turn_rate_deg);
    }
    Handoff::Stay
}

/// A point `flee_distance` away from the threat.
///
/// Probes straight away first, then strafes right, then left. `None` means
/// every direction is blocked and the agent holds position.
fn pick_flee_destination(
    pose: &Pose,
    threat: Vec3,
    core: &AgentCore,
    world: &dyn WorldQuery,
) -> Option<Vec3> {
    let flee = core.config.flee;
    let away = flatten(pose.position - threat)
        .try_normalize()
        .unwrap_or_else(|| flatten(pose.forward).normalize_or_zero());
    let right = away.cross(UP).normalize_or_zero();

    [away, right, -right]
        .into_iter()
        .filter(|direction| *direction != Vec3::ZERO)
        .find(|direction| {
            world
                .cast(pose.position, *direction, flee.probe_distance)
                .is_none()
        })
        .map(|direction| pose.position + direction * flee.flee_distance)
}
