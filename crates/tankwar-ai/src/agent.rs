//! The agent: one live behavior plus everything the behaviors share.
//!
//! `Agent::tick` runs the reactive loop:
//! 1. refresh the cached target,
//! 2. execute the current behavior and apply its hand-off,
//! 3. let hearing force an urgent transition,
//! 4. fire while chasing if the target is visible and roughly ahead.

use tankwar_core::config::{AgentConfig, WeaponConfig};
use tankwar_core::enums::{Archetype, BehaviorKind};
use tankwar_core::events::AiEvent;
use tankwar_core::types::{AgentId, ObjectId, Pose};

use crate::behavior::{Behavior, Handoff};
use crate::error::TransitionRejected;
use crate::patrol::PatrolRoute;
use crate::perception::{self, HearingMemory};
use crate::policy::{get_policy, ArchetypePolicy};
use crate::world::{TargetView, TickContext, WorldQuery};

/// Events produced by one agent tick, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<AiEvent>,
}

/// Agent state shared by all behaviors.
#[derive(Debug, Clone)]
pub struct AgentCore {
    pub id: AgentId,
    pub config: AgentConfig,
    pub policy: ArchetypePolicy,
    pub route: PatrolRoute,
    pub hearing: HearingMemory,
    /// Earliest time the gun may fire again.
    pub next_fire_at: f32,
    pub target: Option<ObjectId>,
    pub fleeing: bool,
    /// Bumped on every applied transition.
    pub generation: u64,
    warned_no_route: bool,
    outbox: Vec<AiEvent>,
}

impl AgentCore {
    /// Vision, through the ambush gate when the policy asks for it.
    pub fn sees(&self, pose: &Pose, target: Option<&TargetView>, world: &dyn WorldQuery) -> bool {
        let seen = match (self.policy.ambush_gate, self.config.ambush_range()) {
            (true, Some(range)) => {
                perception::can_see_target_within(pose, target, &self.config.sensors, range, world)
            }
            _ => perception::can_see_target(pose, target, &self.config.sensors, world),
        };
        tracing::trace!(agent = %self.id, seen, "vision");
        seen
    }

    /// Debounced hearing. Records a `TargetHeard` event on success.
    pub fn hears(&mut self, pose: &Pose, target: Option<&TargetView>, now: f32) -> bool {
        let heard = perception::can_hear_target(
            pose,
            target,
            &self.config.sensors,
            &mut self.hearing,
            now,
        );
        if heard {
            tracing::trace!(agent = %self.id, now, "heard target");
            self.outbox.push(AiEvent::TargetHeard { agent: self.id });
        }
        heard
    }

    pub fn audible(&self, pose: &Pose, target: Option<&TargetView>) -> bool {
        perception::is_audible(pose, target, &self.config.sensors)
    }

    /// The weapon, if one is mounted and off cooldown.
    pub fn weapon_ready(&self, now: f32) -> Option<WeaponConfig> {
        self.config.weapon.filter(|_| now >= self.next_fire_at)
    }

    /// Launch a projectile from the muzzle along the current facing.
    pub fn fire(&mut self, ctx: &mut TickContext<'_>, pose: &Pose, weapon: &WeaponConfig) {
        let origin = pose.position + pose.forward * weapon.muzzle_offset;
        ctx.spawner.fire(
            self.id,
            origin,
            pose.forward,
            weapon.projectile_speed,
            weapon.damage,
        );
        self.next_fire_at = ctx.now + weapon.fire_interval_secs;
        tracing::debug!(agent = %self.id, ?origin, "fired");
        self.outbox.push(AiEvent::ShotFired {
            agent: self.id,
            origin,
            direction: pose.forward,
        });
    }

    pub(crate) fn warn_no_route(&mut self) {
        if !self.warned_no_route {
            self.warned_no_route = true;
            tracing::warn!(agent = %self.id, "patrol route is empty; standing idle");
        }
    }
}

/// An AI tank's brain.
#[derive(Debug, Clone)]
pub struct Agent {
    core: AgentCore,
    behavior: Behavior,
}

impl Agent {
    /// Build an agent and enter its archetype's initial behavior.
    pub fn new(id: AgentId, config: AgentConfig, route: PatrolRoute) -> Self {
        let policy = get_policy(config.archetype);
        let mut core = AgentCore {
            id,
            config,
            policy,
            route,
            hearing: HearingMemory::default(),
            next_fire_at: 0.0,
            target: None,
            fleeing: false,
            generation: 0,
            warned_no_route: false,
            outbox: Vec::new(),
        };

        if core.config.weapon.is_none() {
            tracing::warn!(agent = %id, "no weapon mounted; agent will never fire");
        }
        if policy.initial == BehaviorKind::Patrol && core.route.is_empty() {
            core.warn_no_route();
        }

        let mut behavior = Behavior::new(policy.initial);
        behavior.enter(&mut core);
        tracing::debug!(
            agent = %id,
            archetype = ?config.archetype,
            behavior = %policy.initial,
            "agent created"
        );
        Self { core, behavior }
    }

    pub fn id(&self) -> AgentId {
        self.core.id
    }

    pub fn archetype(&self) -> Archetype {
        self.core.config.archetype
    }

    pub fn config(&self) -> &AgentConfig {
        &self.core.config
    }

    pub fn current_behavior_kind(&self) -> BehaviorKind {
        self.behavior.kind()
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn is_fleeing(&self) -> bool {
        self.core.fleeing
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.core.target
    }

    pub fn generation(&self) -> u64 {
        self.core.generation
    }

    pub fn next_fire_at(&self) -> f32 {
        self.core.next_fire_at
    }

    pub fn last_heard(&self) -> Option<f32> {
        self.core.hearing.last_heard()
    }

    pub fn route(&self) -> &PatrolRoute {
        &self.core.route
    }

    pub fn route_mut(&mut self) -> &mut PatrolRoute {
        &mut self.core.route
    }

    /// Rewind the route and, if patrolling, head for the first waypoint.
    pub fn restart_patrol(&mut self) {
        self.core.route.restart();
        self.behavior.reset_waypoint();
    }

    /// Switch behavior, subject to the archetype policy.
    ///
    /// On success the old behavior's exit runs before the new one is built
    /// and entered, and the previous kind is returned.
    pub fn change_state(&mut self, kind: BehaviorKind) -> Result<BehaviorKind, TransitionRejected> {
        let from = self.behavior.kind();
        if let Err(reason) = self.core.policy.admit(from, kind, self.core.fleeing) {
            tracing::debug!(
                agent = %self.core.id,
                %from,
                requested = %kind,
                %reason,
                "transition rejected"
            );
            return Err(TransitionRejected {
                agent: self.core.id,
                from,
                requested: kind,
                reason,
            });
        }

        self.behavior.exit(&mut self.core);
        self.core.generation += 1;
        let mut next = Behavior::new(kind);
        next.enter(&mut self.core);
        self.behavior = next;

        tracing::debug!(agent = %self.core.id, %from, to = %kind, "behavior changed");
        Ok(from)
    }

    /// Transition from inside the loop, recording the outcome.
    fn request(&mut self, kind: BehaviorKind) {
        let event = match self.change_state(kind) {
            Ok(from) => AiEvent::BehaviorChanged {
                agent: self.core.id,
                from,
                to: kind,
            },
            Err(rejected) => AiEvent::TransitionRejected {
                agent: rejected.agent,
                requested: rejected.requested,
                reason: rejected.reason,
            },
        };
        self.core.outbox.push(event);
    }

    /// Drop a target that no longer resolves and acquire the nearest one if needed.
    fn refresh_target(&mut self, ctx: &TickContext<'_>) -> Option<TargetView> {
        if let Some(id) = self.core.target {
            if ctx.world.resolve_target(id).is_none() {
                tracing::debug!(agent = %self.core.id, target = %id, "target lost");
                self.core.target = None;
            }
        }
        if self.core.target.is_none() {
            self.core.target = ctx.world.nearest_target(ctx.body.pose().position);
        }
        self.core.target.and_then(|id| ctx.world.resolve_target(id))
    }

    /// Run one step of the reactive loop.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) -> TickReport {
        let target = self.refresh_target(ctx);
        let target = target.as_ref();

        if let Handoff::To(kind) = self.behavior.execute(&mut self.core, ctx, target) {
            self.request(kind);
        }

        let pose = ctx.body.pose();
        if self.core.hears(&pose, target, ctx.now) {
            if let Some(kind) = self.core.policy.hearing_reaction(self.behavior.kind()) {
                self.request(kind);
            }
        }

        if self.behavior.kind() == BehaviorKind::Chase {
            self.chase_fire(ctx, target);
        }

        TickReport {
            events: std::mem::take(&mut self.core.outbox),
        }
    }

    fn chase_fire(&mut self, ctx: &mut TickContext<'_>, target: Option<&TargetView>) {
        let Some(view) = target else {
            return;
        };
        let Some(weapon) = self.core.weapon_ready(ctx.now) else {
            return;
        };
        let pose = ctx.body.pose();
        if !self.core.sees(&pose, target, ctx.world) {
            return;
        }
        if pose.alignment_with(view.position) > weapon.chase_alignment {
            self.core.fire(ctx, &pose, &weapon);
        }
    }
}
