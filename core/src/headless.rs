//! An in-memory backend.
//!
//! The headless backend keeps native objects in an arena addressed by uuid handles and records
//! every call it receives. It mimics a toolkit with cascading ownership: destroying an object
//! that still owns children destroys them too (and records that it did), so a teardown that
//! forgets to sever ownership first is observable.
//!
//! Cloning a `HeadlessBackend` yields another reference to the same arena, so a test can hand one
//! clone to a tree and inspect the other.

use crate::backend::Backend;
use crate::node::{ContainerKind, LeafKind, NodeKind};
use crate::options::{Property, Value};
use crate::placement::{Placement, Slot};
use cgmath::Vector2;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// A handle to a headless native object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeHandle(Uuid);

impl NativeHandle {
    fn new() -> NativeHandle {
        NativeHandle(Uuid::new_v4())
    }
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateContainer(NativeHandle, ContainerKind),
    CreateLeaf(NativeHandle, LeafKind),
    Insert(NativeHandle, NativeHandle, Slot),
    Detach(NativeHandle, NativeHandle),
    SetRoot(NativeHandle, NativeHandle),
    ClearRoot(NativeHandle),
    Sever(NativeHandle),
    Destroy(NativeHandle),
    /// An object destroyed implicitly because its owner was destroyed.
    Cascade(NativeHandle),
    Show(NativeHandle),
    Hide(NativeHandle),
    ClearFocus(NativeHandle),
    SetProperty(NativeHandle, Property, Value),
    Blit(NativeHandle, Vector2<i32>),
}

impl Call {
    /// Whether this call changes the shape of the native tree.
    pub fn is_structural(&self) -> bool {
        match self {
            Call::CreateContainer(..)
            | Call::CreateLeaf(..)
            | Call::Insert(..)
            | Call::Detach(..)
            | Call::SetRoot(..)
            | Call::ClearRoot(..)
            | Call::Sever(..)
            | Call::Destroy(..)
            | Call::Cascade(..) => true,
            Call::Show(..)
            | Call::Hide(..)
            | Call::ClearFocus(..)
            | Call::SetProperty(..)
            | Call::Blit(..) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeadlessError {
    #[error("no such native object: {0:?}")]
    NoSuchObject(NativeHandle),
    #[error("{0:?} is not a container")]
    NotAContainer(NativeHandle),
    #[error("{0:?} already has a parent")]
    AlreadyParented(NativeHandle),
    #[error("{1:?} is not a child of {0:?}")]
    NotAChild(NativeHandle, NativeHandle),
    #[error("{0:?} already has a root container")]
    RootOccupied(NativeHandle),
    #[error("property {0:?} was rejected")]
    Rejected(Property),
    #[error("{0:?} is not a pixmap")]
    NotAPixmap(NativeHandle),
}

#[derive(Debug)]
struct Object {
    kind: NodeKind,
    parent: Option<NativeHandle>,
    children: Vec<(NativeHandle, Slot)>,
    root: Option<NativeHandle>,
    visible: bool,
    focused: bool,
    properties: BTreeMap<Property, Value>,
    image: Option<(Vector2<i32>, Vec<u8>)>,
}

impl Object {
    fn new(kind: NodeKind, visible: bool) -> Object {
        Object {
            kind,
            parent: None,
            children: Vec::new(),
            root: None,
            visible,
            focused: false,
            properties: BTreeMap::new(),
            image: None,
        }
    }

    fn owned(&self) -> Vec<NativeHandle> {
        self.children
            .iter()
            .map(|(child, _)| *child)
            .chain(self.root)
            .collect()
    }
}

#[derive(Debug, Default)]
struct Arena {
    objects: HashMap<NativeHandle, Object>,
    calls: Vec<Call>,
    rejected: HashSet<Property>,
}

impl Arena {
    fn get(&self, handle: NativeHandle) -> Result<&Object, HeadlessError> {
        self.objects
            .get(&handle)
            .ok_or(HeadlessError::NoSuchObject(handle))
    }

    fn get_mut(&mut self, handle: NativeHandle) -> Result<&mut Object, HeadlessError> {
        self.objects
            .get_mut(&handle)
            .ok_or(HeadlessError::NoSuchObject(handle))
    }

    fn create(&mut self, kind: NodeKind) -> NativeHandle {
        let handle = NativeHandle::new();
        let visible = kind != NodeKind::Leaf(LeafKind::Window);
        self.objects.insert(handle, Object::new(kind, visible));
        handle
    }

    /// Unlinks an object from whatever owns it.
    fn unlink(&mut self, handle: NativeHandle) -> Result<(), HeadlessError> {
        let parent = match self.get_mut(handle)?.parent.take() {
            Some(parent) => parent,
            None => return Ok(()),
        };
        let parent = self.get_mut(parent)?;
        parent.children.retain(|(child, _)| *child != handle);
        if parent.root == Some(handle) {
            parent.root = None;
        }
        Ok(())
    }

    /// Destroys an object together with everything it still owns.
    fn destroy_owned(&mut self, handle: NativeHandle) {
        if let Some(object) = self.objects.remove(&handle) {
            for owned in object.owned() {
                self.calls.push(Call::Cascade(owned));
                self.destroy_owned(owned);
            }
        }
    }
}

/// See the [module documentation](self).
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    arena: Arc<Mutex<Arena>>,
}

impl HeadlessBackend {
    pub fn new() -> HeadlessBackend {
        HeadlessBackend::default()
    }

    /// Creates a rendering surface, as an external surface context would.
    pub fn create_surface(&self) -> NativeHandle {
        self.arena.lock().create(NodeKind::Leaf(LeafKind::Surface))
    }

    /// Makes every future attempt to set the property fail.
    pub fn reject_property(&self, property: Property) {
        self.arena.lock().rejected.insert(property);
    }

    pub fn exists(&self, handle: NativeHandle) -> bool {
        self.arena.lock().objects.contains_key(&handle)
    }

    /// Number of live native objects.
    pub fn object_count(&self) -> usize {
        self.arena.lock().objects.len()
    }

    pub fn kind(&self, handle: NativeHandle) -> Option<NodeKind> {
        self.arena.lock().objects.get(&handle).map(|o| o.kind)
    }

    pub fn children(&self, handle: NativeHandle) -> Vec<NativeHandle> {
        self.arena
            .lock()
            .objects
            .get(&handle)
            .map(|o| o.children.iter().map(|(child, _)| *child).collect())
            .unwrap_or_default()
    }

    /// The slot a child was inserted with.
    pub fn slot(&self, container: NativeHandle, child: NativeHandle) -> Option<Slot> {
        let arena = self.arena.lock();
        let object = arena.objects.get(&container)?;
        object
            .children
            .iter()
            .find(|(c, _)| *c == child)
            .map(|(_, slot)| *slot)
    }

    pub fn parent(&self, handle: NativeHandle) -> Option<NativeHandle> {
        self.arena
            .lock()
            .objects
            .get(&handle)
            .and_then(|o| o.parent)
    }

    pub fn root(&self, host: NativeHandle) -> Option<NativeHandle> {
        self.arena.lock().objects.get(&host).and_then(|o| o.root)
    }

    pub fn is_visible(&self, handle: NativeHandle) -> bool {
        self.arena
            .lock()
            .objects
            .get(&handle)
            .map_or(false, |o| o.visible)
    }

    pub fn is_focused(&self, handle: NativeHandle) -> bool {
        self.arena
            .lock()
            .objects
            .get(&handle)
            .map_or(false, |o| o.focused)
    }

    /// The last image blitted to a pixmap.
    pub fn image(&self, handle: NativeHandle) -> Option<(Vector2<i32>, Vec<u8>)> {
        self.arena
            .lock()
            .objects
            .get(&handle)
            .and_then(|o| o.image.clone())
    }

    /// Gives keyboard focus to an object, as if the user had clicked it. Returns false if there
    /// is no such object.
    pub fn focus(&self, handle: NativeHandle) -> bool {
        let mut arena = self.arena.lock();
        for object in arena.objects.values_mut() {
            object.focused = false;
        }
        match arena.objects.get_mut(&handle) {
            Some(object) => {
                object.focused = true;
                true
            }
            None => false,
        }
    }

    pub fn property(&self, handle: NativeHandle, property: Property) -> Option<Value> {
        self.arena
            .lock()
            .objects
            .get(&handle)
            .and_then(|o| o.properties.get(&property).cloned())
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<Call> {
        self.arena.lock().calls.clone()
    }

    /// Returns and clears all recorded calls.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::replace(&mut self.arena.lock().calls, Vec::new())
    }

    /// Returns and clears recorded calls, keeping only structural ones.
    pub fn take_structural_calls(&self) -> Vec<Call> {
        self.take_calls()
            .into_iter()
            .filter(Call::is_structural)
            .collect()
    }
}

impl Backend for HeadlessBackend {
    type Handle = NativeHandle;
    type Error = HeadlessError;

    fn create_container(&mut self, kind: ContainerKind) -> Result<NativeHandle, HeadlessError> {
        let mut arena = self.arena.lock();
        let handle = arena.create(NodeKind::Container(kind));
        arena.calls.push(Call::CreateContainer(handle, kind));
        Ok(handle)
    }

    fn create_leaf(&mut self, kind: LeafKind) -> Result<NativeHandle, HeadlessError> {
        let mut arena = self.arena.lock();
        let handle = arena.create(NodeKind::Leaf(kind));
        arena.calls.push(Call::CreateLeaf(handle, kind));
        Ok(handle)
    }

    fn insert(
        &mut self,
        container: &NativeHandle,
        child: &NativeHandle,
        slot: &Slot,
    ) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        if arena.get(*child)?.parent.is_some() {
            return Err(HeadlessError::AlreadyParented(*child));
        }
        let object = arena.get_mut(*container)?;
        match object.kind {
            NodeKind::Container(_) => (),
            NodeKind::Leaf(_) => return Err(HeadlessError::NotAContainer(*container)),
        }
        match slot.placement {
            Placement::Ordinal(index) => {
                let index = index.min(object.children.len());
                object.children.insert(index, (*child, *slot));
            }
            Placement::Cell(_) => object.children.push((*child, *slot)),
        }
        arena.get_mut(*child)?.parent = Some(*container);
        arena.calls.push(Call::Insert(*container, *child, *slot));
        Ok(())
    }

    fn detach(&mut self, container: &NativeHandle, child: &NativeHandle) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        if arena.get(*child)?.parent != Some(*container) {
            return Err(HeadlessError::NotAChild(*container, *child));
        }
        arena.unlink(*child)?;
        arena.calls.push(Call::Detach(*container, *child));
        Ok(())
    }

    fn set_root(&mut self, host: &NativeHandle, container: &NativeHandle) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        if arena.get(*container)?.parent.is_some() {
            return Err(HeadlessError::AlreadyParented(*container));
        }
        let object = arena.get_mut(*host)?;
        if object.root.is_some() {
            return Err(HeadlessError::RootOccupied(*host));
        }
        object.root = Some(*container);
        arena.get_mut(*container)?.parent = Some(*host);
        arena.calls.push(Call::SetRoot(*host, *container));
        Ok(())
    }

    fn clear_root(&mut self, host: &NativeHandle) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        if let Some(root) = arena.get_mut(*host)?.root.take() {
            arena.get_mut(root)?.parent = None;
        }
        arena.calls.push(Call::ClearRoot(*host));
        Ok(())
    }

    fn sever_children(&mut self, node: &NativeHandle) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        let object = arena.get_mut(*node)?;
        let owned = object.owned();
        object.children.clear();
        object.root = None;
        for child in owned {
            arena.get_mut(child)?.parent = None;
        }
        arena.calls.push(Call::Sever(*node));
        Ok(())
    }

    fn destroy(&mut self, node: NativeHandle) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        arena.unlink(node)?;
        arena.calls.push(Call::Destroy(node));
        arena.destroy_owned(node);
        Ok(())
    }

    fn show(&mut self, node: &NativeHandle) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        arena.get_mut(*node)?.visible = true;
        arena.calls.push(Call::Show(*node));
        Ok(())
    }

    fn hide(&mut self, node: &NativeHandle) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        arena.get_mut(*node)?.visible = false;
        arena.calls.push(Call::Hide(*node));
        Ok(())
    }

    fn clear_focus(&mut self, node: &NativeHandle) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        arena.get_mut(*node)?.focused = false;
        arena.calls.push(Call::ClearFocus(*node));
        Ok(())
    }

    fn set_property(
        &mut self,
        node: &NativeHandle,
        property: Property,
        value: &Value,
    ) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        if arena.rejected.contains(&property) {
            return Err(HeadlessError::Rejected(property));
        }
        arena
            .get_mut(*node)?
            .properties
            .insert(property, value.clone());
        arena
            .calls
            .push(Call::SetProperty(*node, property, value.clone()));
        Ok(())
    }

    fn blit(
        &mut self,
        pixmap: &NativeHandle,
        size: Vector2<i32>,
        argb: &[u8],
    ) -> Result<(), HeadlessError> {
        let mut arena = self.arena.lock();
        let object = arena.get_mut(*pixmap)?;
        if object.kind != NodeKind::Leaf(LeafKind::Pixmap) {
            return Err(HeadlessError::NotAPixmap(*pixmap));
        }
        object.image = Some((size, argb.to_vec()));
        arena.calls.push(Call::Blit(*pixmap, size));
        Ok(())
    }
}
