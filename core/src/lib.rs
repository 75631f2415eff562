//! Immediate-mode reconciliation over a retained native widget tree.
//!
//! # Conceptual overview
//! Applications describe their user interface anew every frame, as a flat sequence of declarative
//! calls keyed by small integer ids: “window 1”, “vertical box 10”, “button 7”. Native widgets
//! however carry state (focus, animations, identity) and must not be recreated every frame. The
//! [`NVTree`] (native-view tree) sits between the two and keeps a retained tree of native objects
//! in sync with the declarations, changing it only where the declared structure actually changed.
//!
//! ## Nodes
//! There are two kinds of nodes: containers, which lay out an ordered collection of children
//! (horizontally, vertically, or in a grid), and leaves, which are single widgets. Some leaves
//! (windows, frames, group boxes, pixmaps) may own one root container, which holds their content.
//! Containers and leaves are addressed by [`NodeKey`]s; see [`IdSpace`] for how their ids relate.
//!
//! ## Frames
//! A frame is a sequence of declarations followed by [`NVTree::complete_frame`]. Declarations nest:
//! `begin_top_level`, `begin_widget` and `begin_container` open scopes, `end` closes them. Every
//! leaf and non-root container is inserted into the innermost open container at a
//! [`Placement`]: its ordinal in a linear container, or a cell in a grid.
//!
//! Each declaration either reuses the node registered for its key, creates one, reparents it (if
//! it was declared in a different container last time), or reinserts it (if only its placement
//! changed). Nodes that were not declared during a frame are torn down when it completes.
//!
//! ## Faults
//! Misuse of the declaration API and id reuse across node kinds are faults: they surface as
//! [`Error`]s and abort the frame, which then completes without tearing anything down.
//! Options that cannot be applied to a node are not faults; they are logged and counted in the
//! [`FrameReport`].
//!
//! ## Backends
//! Backends are native toolkits abstracted to a common interface; see [`Backend`]. The
//! [`HeadlessBackend`] keeps native objects in memory and is useful for testing.

pub mod backend;
mod config;
mod error;
pub mod headless;
mod liveness;
mod node;
mod nv_tree;
pub mod options;
mod placement;
mod registry;
mod report;
mod stack;
mod teardown;

pub use backend::Backend;
pub use config::{Config, IdSpace};
pub use error::{Error, TeardownFault, UsageFault};
pub use headless::{HeadlessBackend, NativeHandle};
pub use node::{Axis, ContainerKind, Id, LeafKind, NodeKey, NodeKind, Parent};
pub use nv_tree::NVTree;
pub use options::{Margins, Opts, Property, Value};
pub use placement::{Align, Cell, HAlign, Placement, Slot, VAlign};
pub use report::FrameReport;
pub use stack::ScopeKind;
