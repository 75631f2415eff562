//! Tearing down retained nodes.
//!
//! Native containers usually destroy their children along with themselves. Here, every node is
//! destroyed on its own terms: a container first marks its registered children as detached and
//! severs its ownership of them, so destroying it never takes anything else along. Children that
//! are still needed get reparented when they are declared again; the rest are swept separately.

use crate::backend::Backend;
use crate::error::{Error, TeardownFault};
use crate::node::{LeafKind, NodeKey, NodeKind, Parent};
use crate::nv_tree::{NVTree, TreeResult};
use log::debug;

impl<B: Backend> NVTree<B> {
    /// Destroys every registered node that was not declared in the current frame.
    pub(crate) fn sweep(&mut self) -> TreeResult<(), B::Error> {
        for key in self.liveness.stale(self.registry.keys()) {
            // a widget's root container may already be gone
            if self.registry.contains(key) {
                self.destroy(key)?;
            }
        }
        Ok(())
    }

    /// Destroys every node, regardless of liveness, and resets all frame state.
    pub fn cleanup(&mut self) -> TreeResult<(), B::Error> {
        self.reset_frame();
        for key in self.registry.keys() {
            if self.registry.contains(key) {
                self.destroy(key)?;
            }
        }
        self.ledger.clear();
        self.report = Default::default();
        debug!("cleaned up");
        Ok(())
    }

    pub(crate) fn destroy(&mut self, key: NodeKey) -> TreeResult<(), B::Error> {
        match key {
            NodeKey::Container(_) => self.destroy_container(key),
            NodeKey::Leaf(_) => self.destroy_leaf(key),
        }
    }

    fn check_destroyable(&self, key: NodeKey) -> TreeResult<(), B::Error> {
        if self.liveness.is_live(key) {
            Err(TeardownFault::DestroyingLiveNode(key).into())
        } else if !self.registry.contains(key) {
            Err(TeardownFault::NotRegistered(key).into())
        } else {
            Ok(())
        }
    }

    /// Destroys a container without destroying its children.
    pub(crate) fn destroy_container(&mut self, key: NodeKey) -> TreeResult<(), B::Error> {
        self.check_destroyable(key)?;
        let (handle, parent, children) = match self.registry.get(key) {
            Some(entry) => (entry.handle.clone(), entry.parent, entry.children.clone()),
            None => return Err(TeardownFault::NotRegistered(key).into()),
        };

        for child in children {
            if let Some(entry) = self.registry.get_mut(child) {
                if entry.parent == Parent::Container(key.id()) {
                    entry.parent = Parent::Detached;
                }
            }
            self.ledger.forget(child);
        }
        self.backend
            .sever_children(&handle)
            .map_err(Error::Backend)?;

        self.unlink(key, &handle, parent)?;
        self.registry.unregister(key);
        self.liveness.unmark(key);

        debug!("destroying {}", key);
        self.backend.destroy(handle).map_err(Error::Backend)?;
        self.report.destroyed += 1;
        Ok(())
    }

    /// Destroys a leaf widget along with its root container. Surfaces are hidden instead.
    pub(crate) fn destroy_leaf(&mut self, key: NodeKey) -> TreeResult<(), B::Error> {
        self.check_destroyable(key)?;
        let (handle, kind, parent, root) = match self.registry.get(key) {
            Some(entry) => (entry.handle.clone(), entry.kind, entry.parent, entry.root),
            None => return Err(TeardownFault::NotRegistered(key).into()),
        };

        if let Some(root) = root {
            self.destroy_container(NodeKey::Container(root))?;
        }

        self.unlink(key, &handle, parent)?;
        self.registry.unregister(key);
        self.liveness.unmark(key);

        if kind == NodeKind::Leaf(LeafKind::Surface) {
            debug!("hiding {}", key);
            self.backend.hide(&handle).map_err(Error::Backend)?;
            self.report.hidden += 1;
        } else {
            debug!("destroying {}", key);
            self.backend.clear_focus(&handle).map_err(Error::Backend)?;
            self.backend.destroy(handle).map_err(Error::Backend)?;
            self.report.destroyed += 1;
        }
        Ok(())
    }
}
