//! The native-view tree.
//!
//! An [`NVTree`] receives a flat stream of declarations every frame and keeps a retained tree of
//! native objects in sync with it. Each declaration is reconciled against the node registered for
//! its key: the node is created if there is none, reparented if its parent changed, reinserted if
//! only its placement changed, and otherwise left alone. Nodes that were not declared are torn down
//! when the frame is completed.

use crate::backend::Backend;
use crate::config::Config;
use crate::error::{Error, UsageFault};
use crate::liveness::Liveness;
use crate::node::{ContainerKind, Id, LeafKind, NodeKey, NodeKind, Parent};
use crate::options::{self, Opts};
use crate::placement::{Placement, PositionLedger, Slot};
use crate::registry::{Entry, Registry};
use crate::report::FrameReport;
use crate::stack::{DeclarationStack, Scope, ScopeKind, Target};
use cgmath::Vector2;
use log::{debug, trace, warn};

pub(crate) type TreeResult<T, E> = Result<T, Error<E>>;

/// Where a declared node goes.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Dest {
    TopLevel,
    Container(Target, Slot),
    /// Root container of a leaf widget.
    Host(Id),
}

impl Dest {
    fn parent(&self) -> Parent {
        match self {
            Dest::TopLevel => Parent::TopLevel,
            Dest::Container(target, _) => Parent::Container(target.id),
            Dest::Host(id) => Parent::Host(*id),
        }
    }
}

/// Where a new node’s native object comes from.
enum Source<H> {
    Create,
    /// Supplied by an external owner.
    Adopt(H),
}

/// The native-view tree; reconciles declarations against retained native objects.
pub struct NVTree<B: Backend> {
    pub(crate) backend: B,
    config: Config,
    pub(crate) registry: Registry<B::Handle>,
    pub(crate) ledger: PositionLedger,
    stack: DeclarationStack,
    pub(crate) liveness: Liveness,
    pub(crate) report: FrameReport,
    aborted: bool,
}

impl<B: Backend> NVTree<B> {
    pub fn new(backend: B) -> NVTree<B> {
        NVTree::with_config(backend, Config::default())
    }

    pub fn with_config(backend: B, config: Config) -> NVTree<B> {
        NVTree {
            backend,
            config,
            registry: Registry::new(config.id_space),
            ledger: PositionLedger::new(),
            stack: DeclarationStack::new(),
            liveness: Liveness::new(),
            report: FrameReport::default(),
            aborted: false,
        }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Declares a top-level window and opens its scope.
    ///
    /// The declaration stack must be empty. A window created in this frame is shown when its scope
    /// ends.
    pub fn begin_top_level(&mut self, id: Id, opts: &Opts) -> TreeResult<B::Handle, B::Error> {
        self.check_running()?;
        let result = self.top_level(id, opts);
        self.guard(result)
    }

    /// Declares a leaf widget that may own a root container, and opens its scope.
    pub fn begin_widget(
        &mut self,
        id: Id,
        kind: LeafKind,
        opts: &Opts,
    ) -> TreeResult<B::Handle, B::Error> {
        self.check_running()?;
        let result = self.widget(id, kind, opts);
        self.guard(result)
    }

    /// Declares a container and makes it the insertion target for following declarations.
    ///
    /// Inside a widget scope that has no container yet, the container becomes the widget’s root
    /// container.
    pub fn begin_container(
        &mut self,
        id: Id,
        kind: ContainerKind,
        opts: &Opts,
    ) -> TreeResult<B::Handle, B::Error> {
        self.check_running()?;
        let result = self.container(id, kind, opts);
        self.guard(result)
    }

    /// Declares a leaf in the current insertion target and returns its native handle.
    pub fn declare_leaf(
        &mut self,
        id: Id,
        kind: LeafKind,
        opts: &Opts,
    ) -> TreeResult<B::Handle, B::Error> {
        self.check_running()?;
        let result = self.leaf(id, kind, opts);
        self.guard(result)
    }

    /// Declares a rendering surface whose native object is owned elsewhere.
    ///
    /// Surfaces are hidden instead of destroyed when they are torn down, and shown again when
    /// they are adopted again.
    pub fn adopt_surface(
        &mut self,
        id: Id,
        handle: B::Handle,
        opts: &Opts,
    ) -> TreeResult<(), B::Error> {
        self.check_running()?;
        let result = self.surface(id, handle, opts);
        self.guard(result)
    }

    /// Shows ARGB32 pixels in a pixmap widget declared in this frame.
    pub fn blit(&mut self, id: Id, size: Vector2<i32>, argb: &[u8]) -> TreeResult<(), B::Error> {
        self.check_running()?;
        let result = self.blit_pixmap(id, size, argb);
        self.guard(result)
    }

    /// Closes the innermost scope.
    pub fn end(&mut self) -> TreeResult<(), B::Error> {
        self.check_running()?;
        let result = self.close(None);
        self.guard(result)
    }

    /// Closes the innermost scope, checking that it is of the given kind.
    pub fn end_scope(&mut self, kind: ScopeKind) -> TreeResult<(), B::Error> {
        self.check_running()?;
        let result = self.close(Some(kind));
        self.guard(result)
    }

    /// Completes the frame: tears down every node that was not declared, and returns a summary.
    ///
    /// If the frame was aborted by a fault, nothing is torn down and this returns
    /// [`Error::FrameAborted`]. Either way, the next frame starts with a clean slate.
    pub fn complete_frame(&mut self) -> TreeResult<FrameReport, B::Error> {
        if self.aborted {
            self.reset_frame();
            return Err(Error::FrameAborted);
        }
        if !self.stack.is_empty() {
            let depth = self.stack.depth();
            warn!("frame completed with {} open scope(s); skipping teardown", depth);
            self.reset_frame();
            return Err(UsageFault::UnclosedScopes(depth).into());
        }

        let result = self.sweep();
        let report = std::mem::replace(&mut self.report, FrameReport::default());
        self.liveness.reset();
        result?;

        trace!("frame complete: {:?}", report);
        Ok(report)
    }

    /// Returns the native handle of a registered node.
    pub fn handle(&self, key: NodeKey) -> Option<&B::Handle> {
        self.registry.get(key).map(|entry| &entry.handle)
    }

    /// Finds the node a native handle belongs to.
    pub fn find(&self, handle: &B::Handle) -> Option<NodeKey> {
        self.registry.find(handle)
    }

    pub fn kind(&self, key: NodeKey) -> Option<NodeKind> {
        self.registry.get(key).map(|entry| entry.kind)
    }

    pub fn parent(&self, key: NodeKey) -> Option<Parent> {
        self.registry.get(key).map(|entry| entry.parent)
    }

    /// Children of a container, in native order.
    pub fn children(&self, id: Id) -> Option<&[NodeKey]> {
        self.registry
            .get(NodeKey::Container(id))
            .map(|entry| &entry.children[..])
    }

    /// Root container of a leaf widget.
    pub fn root(&self, id: Id) -> Option<Id> {
        self.registry.get(NodeKey::Leaf(id)).and_then(|entry| entry.root)
    }

    /// The placement a node was last inserted at. Top-level nodes and root containers have none.
    pub fn placement(&self, key: NodeKey) -> Option<Placement> {
        self.ledger.get(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.registry.contains(key)
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Whether the node was declared in the current frame.
    pub fn is_live(&self, key: NodeKey) -> bool {
        self.liveness.is_live(key)
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// The summary of the frame in progress.
    pub fn report(&self) -> &FrameReport {
        &self.report
    }

    fn check_running(&self) -> TreeResult<(), B::Error> {
        if self.aborted {
            Err(Error::FrameAborted)
        } else {
            Ok(())
        }
    }

    /// Aborts the frame if a declaration failed.
    fn guard<T>(&mut self, result: TreeResult<T, B::Error>) -> TreeResult<T, B::Error> {
        if let Err(err) = &result {
            warn!("frame aborted: {}", err);
            self.aborted = true;
        }
        result
    }

    pub(crate) fn reset_frame(&mut self) {
        self.stack.clear();
        self.liveness.reset();
        self.report = FrameReport::default();
        self.aborted = false;
    }

    fn blit_pixmap(&mut self, id: Id, size: Vector2<i32>, argb: &[u8]) -> TreeResult<(), B::Error> {
        let key = NodeKey::Leaf(id);
        let pixmap = NodeKind::Leaf(LeafKind::Pixmap);
        let handle = match self.registry.get(key) {
            Some(entry) if entry.kind != pixmap => {
                return Err(Error::TypeMismatch {
                    key,
                    registered: entry.kind,
                    declared: pixmap,
                })
            }
            Some(entry) if self.liveness.is_live(key) => entry.handle.clone(),
            _ => return Err(UsageFault::NotDeclared(key).into()),
        };

        let expected = size.x.max(0) as usize * size.y.max(0) as usize * 4;
        if argb.len() != expected {
            return Err(UsageFault::PixelBufferSize {
                key,
                expected,
                actual: argb.len(),
            }
            .into());
        }
        self.backend.blit(&handle, size, argb).map_err(Error::Backend)
    }

    fn top_level(&mut self, id: Id, opts: &Opts) -> TreeResult<B::Handle, B::Error> {
        let key = NodeKey::Leaf(id);
        if !self.stack.is_empty() {
            return Err(UsageFault::NestedTopLevel(key).into());
        }
        let handle = self.declare(
            key,
            NodeKind::Leaf(LeafKind::Window),
            Dest::TopLevel,
            opts,
            Source::Create,
        )?;
        self.stack.push(Scope::widget(ScopeKind::TopLevel, id));
        Ok(handle)
    }

    fn widget(&mut self, id: Id, kind: LeafKind, opts: &Opts) -> TreeResult<B::Handle, B::Error> {
        let key = NodeKey::Leaf(id);
        if kind == LeafKind::Window {
            return Err(UsageFault::WrongEntryPoint(key, kind).into());
        }
        if !kind.can_host() {
            return Err(UsageFault::NotAHost(key).into());
        }
        let dest = self.leaf_dest(key, opts)?;
        let handle = self.declare(key, NodeKind::Leaf(kind), dest, opts, Source::Create)?;
        self.stack.advance();
        self.stack.push(Scope::widget(ScopeKind::Widget, id));
        Ok(handle)
    }

    fn container(
        &mut self,
        id: Id,
        kind: ContainerKind,
        opts: &Opts,
    ) -> TreeResult<B::Handle, B::Error> {
        let key = NodeKey::Container(id);
        let scope = *self.stack.top().ok_or(UsageFault::NoScope(key))?;
        self.ensure_fresh(key)?;

        let dest = match scope.target {
            Some(target) => Dest::Container(target, opts.slot(target.kind, scope.ordinal)),
            None if scope.has_root => {
                return Err(UsageFault::SecondRootContainer(key, NodeKey::Leaf(scope.host)).into());
            }
            None => {
                self.replace_root(scope.host, id)?;
                Dest::Host(scope.host)
            }
        };

        let handle = self.declare(key, NodeKind::Container(kind), dest, opts, Source::Create)?;
        match dest {
            Dest::Host(_) => {
                if let Some(scope) = self.stack.top_mut() {
                    scope.has_root = true;
                }
            }
            _ => self.stack.advance(),
        }
        self.stack.push(Scope::container(scope.host, Target { id, kind }));
        Ok(handle)
    }

    fn leaf(&mut self, id: Id, kind: LeafKind, opts: &Opts) -> TreeResult<B::Handle, B::Error> {
        let key = NodeKey::Leaf(id);
        match kind {
            LeafKind::Window | LeafKind::Surface => {
                return Err(UsageFault::WrongEntryPoint(key, kind).into());
            }
            _ => (),
        }
        let dest = self.leaf_dest(key, opts)?;
        let handle = self.declare(key, NodeKind::Leaf(kind), dest, opts, Source::Create)?;
        self.stack.advance();
        Ok(handle)
    }

    fn surface(&mut self, id: Id, handle: B::Handle, opts: &Opts) -> TreeResult<(), B::Error> {
        let key = NodeKey::Leaf(id);
        let dest = self.leaf_dest(key, opts)?;
        self.declare(
            key,
            NodeKind::Leaf(LeafKind::Surface),
            dest,
            opts,
            Source::Adopt(handle),
        )?;
        self.stack.advance();
        Ok(())
    }

    fn close(&mut self, expected: Option<ScopeKind>) -> TreeResult<(), B::Error> {
        let scope = self.stack.pop().ok_or(UsageFault::UnbalancedEnd)?;
        if let Some(expected) = expected {
            if scope.kind != expected {
                return Err(UsageFault::MismatchedEnd {
                    expected,
                    found: scope.kind,
                }
                .into());
            }
        }
        if scope.kind == ScopeKind::TopLevel {
            self.show_pending(scope.host)?;
        }
        Ok(())
    }

    fn show_pending(&mut self, id: Id) -> TreeResult<(), B::Error> {
        let key = NodeKey::Leaf(id);
        let entry = match self.registry.get_mut(key) {
            Some(entry) if entry.pending_show => entry,
            _ => return Ok(()),
        };
        entry.pending_show = false;
        debug!("showing {}", key);
        self.backend.show(&entry.handle).map_err(Error::Backend)
    }

    /// The insertion point for a leaf declared in the innermost scope.
    fn leaf_dest(&self, key: NodeKey, opts: &Opts) -> TreeResult<Dest, B::Error> {
        let scope = self.stack.top().ok_or(UsageFault::NoScope(key))?;
        let target = scope.target.ok_or(UsageFault::NoContainer(key))?;
        Ok(Dest::Container(
            target,
            opts.slot(target.kind, scope.ordinal),
        ))
    }

    fn ensure_fresh(&self, key: NodeKey) -> TreeResult<(), B::Error> {
        if self.liveness.is_live(key) {
            Err(UsageFault::DuplicateDeclaration(key).into())
        } else {
            Ok(())
        }
    }

    /// Tears down a widget’s root container if a container with another id replaces it.
    fn replace_root(&mut self, host: Id, id: Id) -> TreeResult<(), B::Error> {
        match self.root(host) {
            Some(old) if old != id => {
                debug!(
                    "root container of {} changed from {} to {}",
                    NodeKey::Leaf(host),
                    old,
                    id
                );
                self.destroy_container(NodeKey::Container(old))
            }
            _ => Ok(()),
        }
    }

    /// Runs one reconciliation step for a declared node.
    fn declare(
        &mut self,
        key: NodeKey,
        kind: NodeKind,
        dest: Dest,
        opts: &Opts,
        source: Source<B::Handle>,
    ) -> TreeResult<B::Handle, B::Error> {
        self.ensure_fresh(key)?;

        let lookup = self
            .registry
            .lookup(key, kind)
            .map(|entry| entry.map(|entry| entry.handle.clone()));
        let existing = match lookup {
            Ok(existing) => existing,
            Err(mismatch) if mismatch.key == key && key.is_container() => {
                debug!(
                    "{} changed from {} to {}; recreating",
                    key, mismatch.registered, kind
                );
                self.destroy_container(key)?;
                None
            }
            Err(mismatch) => {
                return Err(Error::TypeMismatch {
                    key: mismatch.key,
                    registered: mismatch.registered,
                    declared: kind,
                });
            }
        };

        let existing = match (existing, &source) {
            (Some(handle), Source::Adopt(adopted)) if handle != *adopted => {
                debug!("{} was adopted with a new native object", key);
                self.destroy_leaf(key)?;
                None
            }
            (existing, _) => existing,
        };

        let handle = match existing {
            Some(handle) => {
                self.reconcile(key, &handle, dest)?;
                handle
            }
            None => self.create(key, kind, dest, source)?,
        };

        self.liveness.mark_live(key);
        self.report.option_diagnostics += options::apply(&mut self.backend, &handle, key, kind, opts);
        Ok(handle)
    }

    fn create(
        &mut self,
        key: NodeKey,
        kind: NodeKind,
        dest: Dest,
        source: Source<B::Handle>,
    ) -> TreeResult<B::Handle, B::Error> {
        let handle = match (kind, source) {
            (_, Source::Adopt(handle)) => {
                self.backend.show(&handle).map_err(Error::Backend)?;
                handle
            }
            (NodeKind::Container(kind), Source::Create) => self
                .backend
                .create_container(kind)
                .map_err(Error::Backend)?,
            (NodeKind::Leaf(kind), Source::Create) => {
                self.backend.create_leaf(kind).map_err(Error::Backend)?
            }
        };

        let mut entry = Entry::new(handle.clone(), kind, Parent::TopLevel);
        entry.pending_show = kind == NodeKind::Leaf(LeafKind::Window);
        self.registry.register(key, entry);
        self.attach(key, dest)?;

        debug!("created {} ({}) in {:?}", key, kind, dest.parent());
        self.report.created += 1;
        Ok(handle)
    }

    /// Moves an existing node to where it was declared, if it isn’t there already.
    fn reconcile(&mut self, key: NodeKey, handle: &B::Handle, dest: Dest) -> TreeResult<(), B::Error> {
        let parent = match self.registry.get(key) {
            Some(entry) => entry.parent,
            None => return Err(Error::Dangling(key)),
        };
        let drifted = match dest {
            Dest::Container(_, slot) => self.ledger.has_drifted(key, slot.placement),
            Dest::TopLevel | Dest::Host(_) => false,
        };

        if parent != dest.parent() {
            debug!("reparenting {} from {:?} to {:?}", key, parent, dest.parent());
            self.unlink(key, handle, parent)?;
            self.attach(key, dest)?;
            self.report.reparented += 1;
        } else if drifted {
            debug!("reinserting {} from {:?}", key, self.ledger.get(key));
            self.unlink(key, handle, parent)?;
            self.attach(key, dest)?;
            self.report.reinserted += 1;
        } else {
            self.report.reused += 1;
        }
        Ok(())
    }

    /// Removes a node from its parent without destroying it. Afterwards, the node is detached.
    pub(crate) fn unlink(
        &mut self,
        key: NodeKey,
        handle: &B::Handle,
        parent: Parent,
    ) -> TreeResult<(), B::Error> {
        match parent {
            Parent::Container(id) => {
                let container_key = NodeKey::Container(id);
                let container = match self.registry.get_mut(container_key) {
                    Some(entry) => entry,
                    None => return Err(Error::Dangling(container_key)),
                };
                container.children.retain(|child| *child != key);
                self.backend
                    .detach(&container.handle, handle)
                    .map_err(Error::Backend)?;
            }
            Parent::Host(id) => {
                let host_key = NodeKey::Leaf(id);
                let host = match self.registry.get_mut(host_key) {
                    Some(entry) => entry,
                    None => return Err(Error::Dangling(host_key)),
                };
                host.root = None;
                self.backend
                    .clear_root(&host.handle)
                    .map_err(Error::Backend)?;
            }
            Parent::TopLevel | Parent::Detached => (),
        }

        self.ledger.forget(key);
        if let Some(entry) = self.registry.get_mut(key) {
            entry.parent = Parent::Detached;
        }
        Ok(())
    }

    /// Inserts a parentless node at its destination.
    fn attach(&mut self, key: NodeKey, dest: Dest) -> TreeResult<(), B::Error> {
        let handle = match self.registry.get(key) {
            Some(entry) => entry.handle.clone(),
            None => return Err(Error::Dangling(key)),
        };

        match dest {
            Dest::TopLevel => (),
            Dest::Container(target, slot) => {
                let container_key = NodeKey::Container(target.id);
                let container = match self.registry.get_mut(container_key) {
                    Some(entry) => entry,
                    None => return Err(Error::Dangling(container_key)),
                };
                match slot.placement {
                    Placement::Ordinal(_) => {
                        // stale siblings are still in the list until the sweep, so the node goes
                        // right after the last sibling declared this frame
                        let liveness = &self.liveness;
                        let index = container
                            .children
                            .iter()
                            .rposition(|child| liveness.is_live(*child))
                            .map_or(0, |last| last + 1);
                        let native_slot = Slot {
                            placement: Placement::Ordinal(index),
                            ..slot
                        };
                        self.backend
                            .insert(&container.handle, &handle, &native_slot)
                            .map_err(Error::Backend)?;
                        container.children.insert(index, key);
                    }
                    Placement::Cell(_) => {
                        self.backend
                            .insert(&container.handle, &handle, &slot)
                            .map_err(Error::Backend)?;
                        container.children.push(key);
                    }
                }
                self.ledger.record(key, slot.placement);
            }
            Dest::Host(id) => {
                let host_key = NodeKey::Leaf(id);
                let host = match self.registry.get_mut(host_key) {
                    Some(entry) => entry,
                    None => return Err(Error::Dangling(host_key)),
                };
                self.backend
                    .set_root(&host.handle, &handle)
                    .map_err(Error::Backend)?;
                host.root = Some(key.id());
            }
        }

        if let Some(entry) = self.registry.get_mut(key) {
            entry.parent = dest.parent();
        }
        Ok(())
    }
}
