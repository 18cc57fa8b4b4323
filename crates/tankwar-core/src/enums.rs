//! Enumeration types used throughout the simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed behavioral lineage of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Walks its route and never pursues on sight.
    Patrol,
    /// Starts in pursuit.
    Chase,
    /// Patrols, runs from the player when it sees or hears them.
    Flee,
    /// Sits still and opens fire at close range. Never pursues.
    Ambush,
    /// Patrols, pursues on sight or sound.
    PatrolChase,
}

/// The five behaviors an agent can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    Patrol,
    Chase,
    Attack,
    Ambush,
    Flee,
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BehaviorKind::Patrol => "Patrol",
            BehaviorKind::Chase => "Chase",
            BehaviorKind::Attack => "Attack",
            BehaviorKind::Ambush => "Ambush",
            BehaviorKind::Flee => "Flee",
        };
        f.write_str(name)
    }
}

/// Why a requested behavior transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Already in the requested behavior.
    SameKind,
    /// Ambush lineage never enters Chase.
    AmbushNeverChases,
    /// Flee lineage cannot return to Patrol until it reaches safety.
    StillFleeing,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::SameKind => "already in requested behavior",
            RejectReason::AmbushNeverChases => "ambush lineage never chases",
            RejectReason::StillFleeing => "still fleeing",
        };
        f.write_str(text)
    }
}
