//! Immediate-mode widgets on top of a retained native widget tree.
//!
//! A [`Host`] owns an [`NVTree`](perch_core::NVTree) and the receiving end of an event channel.
//! Each frame, the application declares its widgets through the host and then calls
//! [`Host::update`]; the tree takes care of creating, moving and destroying native widgets, and
//! the host feeds user interaction back into the next frame’s declarations.

pub mod events;
mod host;
mod pixmap;
mod widgets;

pub use events::{event_channel, EventInbox, EventKind, MouseButton, NativeEvent, Pointer};
pub use host::Host;
pub use pixmap::PixmapInput;
pub use perch_core::{Config, Error, FrameReport, Id, IdSpace, Opts};
pub use widgets::Surface;
