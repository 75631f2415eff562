//! The declaration stack.
//!
//! Each open scope records three things: the widget currently under construction, the innermost
//! open container (the insertion target), and the next ordinal within that container.

use crate::node::{ContainerKind, Id};
use core::fmt;

/// What opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    TopLevel,
    Widget,
    Container,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScopeKind::TopLevel => write!(f, "top-level"),
            ScopeKind::Widget => write!(f, "widget"),
            ScopeKind::Container => write!(f, "container"),
        }
    }
}

/// The container new declarations are inserted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Target {
    pub id: Id,
    pub kind: ContainerKind,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope {
    pub kind: ScopeKind,
    /// The leaf widget under construction.
    pub host: Id,
    /// `None` while a widget scope has no container yet.
    pub target: Option<Target>,
    /// Ordinal assigned to the next declaration in `target`.
    pub ordinal: usize,
    /// Set once a root container has been declared for `host` in this scope.
    pub has_root: bool,
}

impl Scope {
    pub fn widget(kind: ScopeKind, host: Id) -> Scope {
        Scope {
            kind,
            host,
            target: None,
            ordinal: 0,
            has_root: false,
        }
    }

    pub fn container(host: Id, target: Target) -> Scope {
        Scope {
            kind: ScopeKind::Container,
            host,
            target: Some(target),
            ordinal: 0,
            has_root: false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct DeclarationStack {
    scopes: Vec<Scope>,
}

impl DeclarationStack {
    pub fn new() -> DeclarationStack {
        DeclarationStack::default()
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.scopes.pop()
    }

    pub fn top(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    /// Moves the ordinal counter of the innermost scope past the node just declared.
    pub fn advance(&mut self) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.ordinal += 1;
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn clear(&mut self) {
        self.scopes.clear();
    }
}
