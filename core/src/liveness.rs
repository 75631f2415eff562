//! Per-frame liveness tracking.

use crate::node::NodeKey;
use std::collections::HashSet;

/// The set of nodes declared (“touched”) in the current frame.
#[derive(Debug, Default)]
pub(crate) struct Liveness {
    touched: HashSet<NodeKey>,
}

impl Liveness {
    pub fn new() -> Liveness {
        Liveness::default()
    }

    /// Marks a node live. Returns false if it was already marked this frame.
    pub fn mark_live(&mut self, key: NodeKey) -> bool {
        self.touched.insert(key)
    }

    pub fn is_live(&self, key: NodeKey) -> bool {
        self.touched.contains(&key)
    }

    pub fn unmark(&mut self, key: NodeKey) {
        self.touched.remove(&key);
    }

    /// Returns every key in `registered` that was not touched, in a stable order.
    pub fn stale<I: IntoIterator<Item = NodeKey>>(&self, registered: I) -> Vec<NodeKey> {
        let mut stale: Vec<_> = registered
            .into_iter()
            .filter(|key| !self.touched.contains(key))
            .collect();
        stale.sort();
        stale
    }

    pub fn len(&self) -> usize {
        self.touched.len()
    }

    pub fn reset(&mut self) {
        self.touched.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_is_the_untouched_rest() {
        let mut liveness = Liveness::new();
        assert!(liveness.mark_live(NodeKey::Leaf(2)));
        assert!(!liveness.mark_live(NodeKey::Leaf(2)));
        liveness.mark_live(NodeKey::Container(1));

        let registered = vec![
            NodeKey::Leaf(3),
            NodeKey::Leaf(2),
            NodeKey::Container(1),
            NodeKey::Container(4),
        ];
        assert_eq!(
            liveness.stale(registered),
            vec![NodeKey::Container(4), NodeKey::Leaf(3)]
        );

        liveness.reset();
        assert_eq!(liveness.len(), 0);
        assert!(!liveness.is_live(NodeKey::Leaf(2)));
    }
}
