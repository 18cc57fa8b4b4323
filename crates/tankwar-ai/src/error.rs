use tankwar_core::enums::{BehaviorKind, RejectReason};
use tankwar_core::types::AgentId;

/// A behavior change refused by the archetype policy. The agent is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("agent {agent}: {from} -> {requested} rejected ({reason})")]
pub struct TransitionRejected {
    pub agent: AgentId,
    pub from: BehaviorKind,
    pub requested: BehaviorKind,
    pub reason: RejectReason,
}
