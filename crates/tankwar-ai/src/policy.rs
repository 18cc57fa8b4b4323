//! Archetype-specific transition policy.
//!
//! Consolidates what each lineage may do: where it starts, how it reacts to
//! sight and sound, and which transitions it refuses.

use tankwar_core::enums::{Archetype, BehaviorKind, RejectReason};

/// Behavioral policy for an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypePolicy {
    pub archetype: Archetype,
    /// Behavior entered at spawn.
    pub initial: BehaviorKind,
    /// Where a sighting during Patrol leads, if anywhere.
    pub on_sighting: Option<BehaviorKind>,
    /// Whether a debounced hearing hit counts as a sighting during Patrol.
    pub hears_while_patrolling: bool,
    /// Hearing forces Flee instead of Chase; Patrol is refused while fleeing.
    pub flee_lineage: bool,
    /// Chase is always refused.
    pub never_chases: bool,
    /// Vision is wrapped by the ambush range gate.
    pub ambush_gate: bool,
}

/// Get the policy for a given archetype.
pub fn get_policy(archetype: Archetype) -> ArchetypePolicy {
    match archetype {
        Archetype::Patrol => ArchetypePolicy {
            archetype,
            initial: BehaviorKind::Patrol,
            on_sighting: None,
            hears_while_patrolling: false,
            flee_lineage: false,
            never_chases: false,
            ambush_gate: false,
        },
        Archetype::PatrolChase => ArchetypePolicy {
            archetype,
            initial: BehaviorKind::Patrol,
            on_sighting: Some(BehaviorKind::Chase),
            hears_while_patrolling: true,
            flee_lineage: false,
            never_chases: false,
            ambush_gate: false,
        },
        Archetype::Chase => ArchetypePolicy {
            archetype,
            initial: BehaviorKind::Chase,
            on_sighting: Some(BehaviorKind::Chase),
            hears_while_patrolling: true,
            flee_lineage: false,
            never_chases: false,
            ambush_gate: false,
        },
        Archetype::Flee => ArchetypePolicy {
            archetype,
            initial: BehaviorKind::Patrol,
            on_sighting: Some(BehaviorKind::Flee),
            hears_while_patrolling: false,
            flee_lineage: true,
            never_chases: false,
            ambush_gate: false,
        },
        Archetype::Ambush => ArchetypePolicy {
            archetype,
            initial: BehaviorKind::Ambush,
            on_sighting: None,
            hears_while_patrolling: false,
            flee_lineage: false,
            never_chases: true,
            ambush_gate: true,
        },
    }
}

impl ArchetypePolicy {
    /// Decide whether `current -> requested` may proceed.
    pub fn admit(
        &self,
        current: BehaviorKind,
        requested: BehaviorKind,
        fleeing: bool,
    ) -> Result<(), RejectReason> {
        if current == requested {
            return Err(RejectReason::SameKind);
        }
        if self.never_chases && requested == BehaviorKind::Chase {
            return Err(RejectReason::AmbushNeverChases);
        }
        if self.flee_lineage && fleeing && requested == BehaviorKind::Patrol {
            return Err(RejectReason::StillFleeing);
        }
        Ok(())
    }

    /// Transition forced by a successful hearing test, if any.
    pub fn hearing_reaction(&self, current: BehaviorKind) -> Option<BehaviorKind> {
        let wanted = if self.flee_lineage {
            BehaviorKind::Flee
        } else {
            BehaviorKind::Chase
        };
        (current != wanted).then_some(wanted)
    }
}
