//! Per-frame reconciliation summaries.

/// What happened to the retained tree during one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Nodes created (or adopted) this frame.
    pub created: usize,
    /// Nodes declared again with no structural change.
    pub reused: usize,
    /// Nodes moved to a different parent.
    pub reparented: usize,
    /// Nodes removed and re-added at a new placement in the same parent.
    pub reinserted: usize,
    pub destroyed: usize,
    /// Surfaces hidden instead of destroyed.
    pub hidden: usize,
    /// Options that were skipped because they could not be applied.
    pub option_diagnostics: usize,
}

impl FrameReport {
    /// Returns true if the frame did not change the structure of the retained tree.
    pub fn is_quiet(&self) -> bool {
        self.mutations() == 0
    }

    /// Number of structural mutations.
    pub fn mutations(&self) -> usize {
        self.created + self.reparented + self.reinserted + self.destroyed + self.hidden
    }
}
