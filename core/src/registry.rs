//! The identity registry: caller ids to retained native nodes.

use crate::config::IdSpace;
use crate::node::{Id, NodeKey, NodeKind, Parent};
use std::collections::HashMap;

/// A registered node.
#[derive(Debug)]
pub(crate) struct Entry<H> {
    pub handle: H,
    pub kind: NodeKind,
    pub parent: Parent,
    /// Children in native order (containers only).
    pub children: Vec<NodeKey>,
    /// Root container (widget hosts only).
    pub root: Option<Id>,
    /// Set on windows created this frame; they are shown when their scope ends.
    pub pending_show: bool,
}

impl<H> Entry<H> {
    pub fn new(handle: H, kind: NodeKind, parent: Parent) -> Entry<H> {
        Entry {
            handle,
            kind,
            parent,
            children: Vec::new(),
            root: None,
            pending_show: false,
        }
    }
}

/// Returned when an id is declared with a kind that doesn’t match its registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mismatch {
    pub key: NodeKey,
    pub registered: NodeKind,
}

/// Two maps, one per namespace, so that kind confusion is detectable instead of silent.
#[derive(Debug)]
pub(crate) struct Registry<H> {
    containers: HashMap<Id, Entry<H>>,
    leaves: HashMap<Id, Entry<H>>,
    id_space: IdSpace,
}

impl<H> Registry<H> {
    pub fn new(id_space: IdSpace) -> Registry<H> {
        Registry {
            containers: HashMap::new(),
            leaves: HashMap::new(),
            id_space,
        }
    }

    fn map(&self, key: NodeKey) -> &HashMap<Id, Entry<H>> {
        match key {
            NodeKey::Container(_) => &self.containers,
            NodeKey::Leaf(_) => &self.leaves,
        }
    }

    fn map_mut(&mut self, key: NodeKey) -> &mut HashMap<Id, Entry<H>> {
        match key {
            NodeKey::Container(_) => &mut self.containers,
            NodeKey::Leaf(_) => &mut self.leaves,
        }
    }

    /// Looks up a node, checking that it has the expected kind.
    ///
    /// With a unified id space, an id registered in the other namespace also counts as a
    /// mismatch.
    pub fn lookup(&self, key: NodeKey, expected: NodeKind) -> Result<Option<&Entry<H>>, Mismatch> {
        if self.id_space == IdSpace::Unified {
            let other = match key {
                NodeKey::Container(id) => NodeKey::Leaf(id),
                NodeKey::Leaf(id) => NodeKey::Container(id),
            };
            if let Some(entry) = self.get(other) {
                return Err(Mismatch {
                    key: other,
                    registered: entry.kind,
                });
            }
        }

        match self.get(key) {
            Some(entry) if entry.kind != expected => Err(Mismatch {
                key,
                registered: entry.kind,
            }),
            entry => Ok(entry),
        }
    }

    pub fn get(&self, key: NodeKey) -> Option<&Entry<H>> {
        self.map(key).get(&key.id())
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut Entry<H>> {
        self.map_mut(key).get_mut(&key.id())
    }

    /// Finds the node that owns a native handle.
    pub fn find(&self, handle: &H) -> Option<NodeKey>
    where
        H: PartialEq,
    {
        self.containers
            .iter()
            .find(|(_, entry)| entry.handle == *handle)
            .map(|(id, _)| NodeKey::Container(*id))
            .or_else(|| {
                self.leaves
                    .iter()
                    .find(|(_, entry)| entry.handle == *handle)
                    .map(|(id, _)| NodeKey::Leaf(*id))
            })
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces a node.
    pub fn register(&mut self, key: NodeKey, entry: Entry<H>) -> Option<Entry<H>> {
        self.map_mut(key).insert(key.id(), entry)
    }

    pub fn unregister(&mut self, key: NodeKey) -> Option<Entry<H>> {
        self.map_mut(key).remove(&key.id())
    }

    /// All registered keys, in a stable order.
    pub fn keys(&self) -> Vec<NodeKey> {
        let mut keys: Vec<_> = self
            .containers
            .keys()
            .map(|id| NodeKey::Container(*id))
            .chain(self.leaves.keys().map(|id| NodeKey::Leaf(*id)))
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.containers.len() + self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
