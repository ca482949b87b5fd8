use rustc_hash::FxHashMap;

use crate::Entity;

/// Node id to the entity wrapping that node.
///
/// The cache only holds entities. Nodes belong to the document, so a cached entry never keeps a
/// node alive; entries are evicted when the document drops the node (see
/// [`Dom::reclaim`](crate::Dom::reclaim)).
#[derive(Default)]
pub(crate) struct WrapCache {
    entries: FxHashMap<usize, Entity>,
}

impl WrapCache {
    pub(crate) fn get(&self, node_id: usize) -> Option<Entity> {
        self.entries.get(&node_id).cloned()
    }

    pub(crate) fn insert(&mut self, node_id: usize, entity: Entity) -> Option<Entity> {
        self.entries.insert(node_id, entity)
    }

    pub(crate) fn remove(&mut self, node_id: usize) -> Option<Entity> {
        self.entries.remove(&node_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every entry, returning the evicted entities
    pub(crate) fn drain(&mut self) -> Vec<Entity> {
        self.entries.drain().map(|(_, entity)| entity).collect()
    }
}
