//! Tree configuration.

/// How container and leaf ids relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSpace {
    /// An id may only be registered in one namespace at a time. Declaring container `5` while
    /// leaf `5` is registered (or vice versa) is a type mismatch.
    Unified,
    /// Containers and leaves have fully independent ids.
    Separate,
}

impl Default for IdSpace {
    fn default() -> IdSpace {
        IdSpace::Unified
    }
}

/// Configuration for an [`NVTree`](crate::NVTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub id_space: IdSpace,
}

impl Config {
    pub fn with_id_space(mut self, id_space: IdSpace) -> Config {
        self.id_space = id_space;
        self
    }
}
