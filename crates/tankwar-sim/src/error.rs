use tankwar_ai::TransitionRejected;
use tankwar_core::types::AgentId;

/// Why a queued command was dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),
    #[error("agent {0}: patrol route needs at least one waypoint")]
    EmptyRoute(AgentId),
    #[error("no player in the arena")]
    NoPlayer,
    #[error(transparent)]
    Rejected(#[from] TransitionRejected),
}
