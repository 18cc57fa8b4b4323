//! Registry of live agents.
//!
//! Owned by the engine and passed to systems explicitly. Iteration is in
//! ascending id order, which fixes the order agents are ticked in.

use std::collections::BTreeMap;

use hecs::Entity;

use tankwar_core::types::AgentId;

#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentId, Entity>,
}

impl AgentRegistry {
    pub fn register(&mut self, id: AgentId, entity: Entity) {
        if self.agents.insert(id, entity).is_some() {
            tracing::warn!(agent = %id, "agent registered twice; keeping latest entity");
        }
    }

    pub fn unregister(&mut self, id: AgentId) -> Option<Entity> {
        self.agents.remove(&id)
    }

    pub fn get(&self, id: AgentId) -> Option<Entity> {
        self.agents.get(&id).copied()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, Entity)> + '_ {
        self.agents.iter().map(|(id, entity)| (*id, *entity))
    }

    pub fn clear(&mut self) {
        self.agents.clear();
    }
}
