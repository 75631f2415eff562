//! Error types.
//!
//! Everything in here indicates lost structural consistency or a caller bug, and is surfaced to
//! the caller. Problems limited to option application are not errors; they are logged and
//! counted in the frame report instead.

use crate::node::{LeafKind, NodeKey, NodeKind};
use crate::stack::ScopeKind;
use thiserror::Error;

/// Misuse of the declaration API. Fatal to the current frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageFault {
    #[error("`end` called with no open scope")]
    UnbalancedEnd,
    #[error("expected to close a {expected} scope, but the innermost scope is a {found}")]
    MismatchedEnd { expected: ScopeKind, found: ScopeKind },
    #[error("frame completed with {0} open scope(s)")]
    UnclosedScopes(usize),
    #[error("top-level {0} declared inside an open scope")]
    NestedTopLevel(NodeKey),
    #[error("{0} declared outside of any scope")]
    NoScope(NodeKey),
    #[error("{0} declared in a scope without a container to insert into")]
    NoContainer(NodeKey),
    #[error("{0} is not a widget that can hold a container")]
    NotAHost(NodeKey),
    #[error("{0} declared as a second root container of widget {1}")]
    SecondRootContainer(NodeKey, NodeKey),
    #[error("{0} declared twice in one frame")]
    DuplicateDeclaration(NodeKey),
    #[error("{0} cannot be declared as a {1:?} here")]
    WrongEntryPoint(NodeKey, LeafKind),
    #[error("{0} has not been declared in this frame")]
    NotDeclared(NodeKey),
    #[error("{key} was given {actual} bytes of pixels, expected {expected}")]
    PixelBufferSize {
        key: NodeKey,
        expected: usize,
        actual: usize,
    },
}

/// Internal-consistency faults detected during teardown.
///
/// These should never happen; if they do, the registry and the retained tree have diverged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeardownFault {
    #[error("attempted to destroy {0}, which is live in the current frame")]
    DestroyingLiveNode(NodeKey),
    #[error("attempted to destroy {0}, which is not registered (double destroy?)")]
    NotRegistered(NodeKey),
}

/// Reconciliation errors, generic over the backend’s error type.
#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("usage fault: {0}")]
    Usage(#[from] UsageFault),

    #[error("{key} is registered as {registered} but was declared as {declared}")]
    TypeMismatch {
        key: NodeKey,
        registered: NodeKind,
        declared: NodeKind,
    },

    #[error("teardown fault: {0}")]
    Teardown(#[from] TeardownFault),

    /// The registry refers to a node that is not registered.
    #[error("{0} is referenced but not registered")]
    Dangling(NodeKey),

    #[error("backend error: {0:?}")]
    Backend(E),

    /// A previous fault aborted the current frame.
    #[error("frame aborted by an earlier fault")]
    FrameAborted,
}
