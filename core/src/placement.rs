//! Placements and the position ledger.

use crate::node::NodeKey;
use std::collections::HashMap;

/// A grid cell with spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: u32,
    pub column: u32,
    pub row_span: u32,
    pub column_span: u32,
}

impl Cell {
    /// A single cell without any spanning.
    pub fn new(row: u32, column: u32) -> Cell {
        Cell {
            row,
            column,
            row_span: 1,
            column_span: 1,
        }
    }

    pub fn with_span(mut self, row_span: u32, column_span: u32) -> Cell {
        self.row_span = row_span;
        self.column_span = column_span;
        self
    }
}

impl Default for Cell {
    fn default() -> Cell {
        Cell::new(0, 0)
    }
}

/// Where a node sits inside its parent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Sequence position in a linear container.
    Ordinal(usize),
    /// Cell in a grid container.
    Cell(Cell),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Alignment of an item inside its slot. `None` on an axis means “fill”.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Align {
    pub horizontal: Option<HAlign>,
    pub vertical: Option<VAlign>,
}

impl Align {
    pub fn new(horizontal: Option<HAlign>, vertical: Option<VAlign>) -> Align {
        Align {
            horizontal,
            vertical,
        }
    }

    pub fn center() -> Align {
        Align::new(Some(HAlign::Center), Some(VAlign::Center))
    }
}

/// Everything a container needs to insert a child.
///
/// Only the placement takes part in change detection; stretch and alignment are passed along
/// whenever an insertion happens anyway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub placement: Placement,
    pub stretch: u32,
    pub align: Align,
}

/// The last placement each node was inserted at.
///
/// Used only to detect placement changes between frames; the container child lists in the
/// registry remain the source of truth for the actual structure.
#[derive(Debug, Default)]
pub(crate) struct PositionLedger {
    positions: HashMap<NodeKey, Placement>,
}

impl PositionLedger {
    pub fn new() -> PositionLedger {
        PositionLedger::default()
    }

    pub fn record(&mut self, key: NodeKey, placement: Placement) {
        self.positions.insert(key, placement);
    }

    pub fn get(&self, key: NodeKey) -> Option<Placement> {
        self.positions.get(&key).copied()
    }

    /// Returns true if the node was never placed or was placed somewhere else.
    pub fn has_drifted(&self, key: NodeKey, placement: Placement) -> bool {
        self.get(key) != Some(placement)
    }

    pub fn forget(&mut self, key: NodeKey) {
        self.positions.remove(&key);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}
