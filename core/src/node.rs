//! Node identities and kinds.

use core::fmt;

/// A caller-assigned node identifier.
///
/// Ids are only meaningful together with a namespace; see [`NodeKey`].
pub type Id = u32;

/// Identifies a retained node: containers and leaves live in separate namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey {
    Container(Id),
    Leaf(Id),
}

impl NodeKey {
    pub fn id(self) -> Id {
        match self {
            NodeKey::Container(id) | NodeKey::Leaf(id) => id,
        }
    }

    pub fn is_container(self) -> bool {
        match self {
            NodeKey::Container(_) => true,
            NodeKey::Leaf(_) => false,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeKey::Container(id) => write!(f, "container[{}]", id),
            NodeKey::Leaf(id) => write!(f, "leaf[{}]", id),
        }
    }
}

/// Layout orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Kinds of containers (native layouts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    HBox,
    VBox,
    Grid,
}

impl ContainerKind {
    /// Returns the axis for linear containers and `None` for grids.
    pub fn axis(self) -> Option<Axis> {
        match self {
            ContainerKind::HBox => Some(Axis::Horizontal),
            ContainerKind::VBox => Some(Axis::Vertical),
            ContainerKind::Grid => None,
        }
    }

    pub fn is_linear(self) -> bool {
        self.axis().is_some()
    }
}

/// Kinds of leaves (native widgets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// A top-level window. May only be declared with an empty declaration stack.
    Window,
    Frame,
    GroupBox,
    Pixmap,
    Label,
    Separator(Axis),
    Button,
    ToggleButton,
    CheckBox,
    RadioButton,
    ComboBox,
    Slider(Axis),
    ScrollBar(Axis),
    SpinBox,
    DoubleSpinBox,
    LineEdit,
    Spacer,
    /// A rendering surface. Its native object is owned by an external surface context, so it is
    /// adopted rather than created, and hidden rather than destroyed.
    Surface,
}

impl LeafKind {
    /// Whether this leaf may open a widget scope and own a root container.
    pub fn can_host(self) -> bool {
        match self {
            LeafKind::Window | LeafKind::Frame | LeafKind::GroupBox | LeafKind::Pixmap => true,
            _ => false,
        }
    }
}

/// Any node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Container(ContainerKind),
    Leaf(LeafKind),
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeKind::Container(kind) => write!(f, "{:?}", kind),
            NodeKind::Leaf(kind) => write!(f, "{:?}", kind),
        }
    }
}

/// Where a retained node is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    /// Not attached to anything; the node is top-level.
    TopLevel,
    /// The former parent was torn down and ownership has been severed. Only seen within a
    /// teardown episode or until the node is redeclared (and reparented) or swept.
    Detached,
    /// Inserted into a container.
    Container(Id),
    /// Installed as the root container of the given leaf widget.
    Host(Id),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_ne!(NodeKey::Container(5), NodeKey::Leaf(5));
        assert_eq!(NodeKey::Container(5).id(), NodeKey::Leaf(5).id());
        assert_eq!(NodeKey::Leaf(7).to_string(), "leaf[7]");
    }

    #[test]
    fn only_widget_hosts_can_host() {
        assert!(LeafKind::GroupBox.can_host());
        assert!(LeafKind::Window.can_host());
        assert!(!LeafKind::Button.can_host());
        assert!(!LeafKind::Surface.can_host());
    }
}
