//! Traits for backends.

use crate::node::{ContainerKind, LeafKind};
use crate::options::{Property, Value};
use crate::placement::Slot;
use cgmath::Vector2;
use core::fmt;

/// A native toolkit, abstracted to the operations the tree needs.
///
/// Native toolkits usually let a container own (and destroy) its children. The tree manages every
/// lifetime itself, so backends must provide ways to remove and to un-own children without
/// destroying them: [`detach`](Backend::detach), [`clear_root`](Backend::clear_root) and
/// [`sever_children`](Backend::sever_children).
pub trait Backend {
    /// A reference to a native object.
    type Handle: Clone + PartialEq + fmt::Debug;

    /// Error type.
    type Error: fmt::Debug;

    /// Creates a new, empty container.
    fn create_container(&mut self, kind: ContainerKind) -> Result<Self::Handle, Self::Error>;

    /// Creates a new leaf widget. Never called for [`LeafKind::Surface`].
    fn create_leaf(&mut self, kind: LeafKind) -> Result<Self::Handle, Self::Error>;

    /// Inserts a parentless child into a container.
    ///
    /// For linear containers, the child is inserted at the given index of the native child list
    /// (or appended, if the index is past the end). This is not necessarily the declared ordinal,
    /// since children that are about to be torn down still count. For grids, the child is placed
    /// in the cell.
    fn insert(
        &mut self,
        container: &Self::Handle,
        child: &Self::Handle,
        slot: &Slot,
    ) -> Result<(), Self::Error>;

    /// Removes a child from a container without destroying it. Afterwards, the child is
    /// parentless and not owned by anything.
    fn detach(&mut self, container: &Self::Handle, child: &Self::Handle)
        -> Result<(), Self::Error>;

    /// Installs a container as the root container of a leaf widget.
    fn set_root(&mut self, host: &Self::Handle, container: &Self::Handle)
        -> Result<(), Self::Error>;

    /// Uninstalls a leaf widget’s root container without destroying it.
    fn clear_root(&mut self, host: &Self::Handle) -> Result<(), Self::Error>;

    /// Drops every ownership edge from a node to its children (and root container) without
    /// destroying any of them, so that destroying the node is no longer recursive.
    fn sever_children(&mut self, node: &Self::Handle) -> Result<(), Self::Error>;

    /// Destroys a native object.
    fn destroy(&mut self, node: Self::Handle) -> Result<(), Self::Error>;

    fn show(&mut self, node: &Self::Handle) -> Result<(), Self::Error>;

    fn hide(&mut self, node: &Self::Handle) -> Result<(), Self::Error>;

    fn clear_focus(&mut self, node: &Self::Handle) -> Result<(), Self::Error>;

    /// Sets a native property. The value has already been checked against
    /// [`Property::accepts`].
    fn set_property(
        &mut self,
        node: &Self::Handle,
        property: Property,
        value: &Value,
    ) -> Result<(), Self::Error>;

    /// Replaces the image shown by a pixmap widget. `argb` holds `size.x * size.y` ARGB32
    /// pixels, row by row.
    fn blit(
        &mut self,
        pixmap: &Self::Handle,
        size: Vector2<i32>,
        argb: &[u8],
    ) -> Result<(), Self::Error>;
}
