//! Option bags and per-kind property capabilities.
//!
//! Options are applied after every declaration. Each node kind supports a finite set of
//! [`Property`]s; anything else is reported and skipped, never fatal.

use crate::backend::Backend;
use crate::node::{Axis, ContainerKind, LeafKind, NodeKey, NodeKind};
use crate::placement::{Align, Cell, Placement, Slot};
use cgmath::Vector2;
use core::convert::TryFrom;
use log::warn;

pub const ALIGN: &str = "align";
pub const STRETCH: &str = "stretch";
pub const GRID_ROW: &str = "grid_row";
pub const GRID_COLUMN: &str = "grid_column";
pub const GRID_ROW_SPAN: &str = "grid_row_span";
pub const GRID_COLUMN_SPAN: &str = "grid_column_span";

/// Options consumed by the reconciler when placing a node; never forwarded as properties.
const PLACEMENT_OPTIONS: &[&str] = &[
    ALIGN,
    STRETCH,
    GRID_ROW,
    GRID_COLUMN,
    GRID_ROW_SPAN,
    GRID_COLUMN_SPAN,
];

/// Content margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// An option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Size(Vector2<i32>),
    Margins(Margins),
    Align(Align),
    List(Vec<String>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Value {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Text(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(list: Vec<String>) -> Value {
        Value::List(list)
    }
}

/// An ordered bag of named options. Setting a name twice keeps the last value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Opts {
    entries: Vec<(String, Value)>,
}

impl Opts {
    pub fn new() -> Opts {
        Opts::default()
    }

    /// Sets an arbitrary option.
    pub fn set<V: Into<Value>>(mut self, name: &str, value: V) -> Opts {
        self.insert(name, value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
    }

    /// Combines two bags; options in `other` win.
    pub fn merge(mut self, other: &Opts) -> Opts {
        for (name, value) in &other.entries {
            self.insert(name, value.clone());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn align(self, align: Align) -> Opts {
        self.set(ALIGN, Value::Align(align))
    }

    pub fn stretch(self, stretch: u32) -> Opts {
        self.set(STRETCH, i64::from(stretch))
    }

    pub fn cell(self, row: u32, column: u32) -> Opts {
        self.set(GRID_ROW, i64::from(row))
            .set(GRID_COLUMN, i64::from(column))
    }

    pub fn span(self, row_span: u32, column_span: u32) -> Opts {
        self.set(GRID_ROW_SPAN, i64::from(row_span))
            .set(GRID_COLUMN_SPAN, i64::from(column_span))
    }

    pub fn minimum_size(self, width: i32, height: i32) -> Opts {
        self.set(
            Property::MinimumSize.name(),
            Value::Size(Vector2::new(width, height)),
        )
    }

    pub fn maximum_size(self, width: i32, height: i32) -> Opts {
        self.set(
            Property::MaximumSize.name(),
            Value::Size(Vector2::new(width, height)),
        )
    }

    pub fn fixed_size(self, width: i32, height: i32) -> Opts {
        self.minimum_size(width, height).maximum_size(width, height)
    }

    pub fn margins(self, left: i32, top: i32, right: i32, bottom: i32) -> Opts {
        self.set(
            Property::Margins.name(),
            Value::Margins(Margins {
                left,
                top,
                right,
                bottom,
            }),
        )
    }

    /// Entries of a combo box.
    pub fn items<S: AsRef<str>>(self, items: &[S]) -> Opts {
        let items: Vec<String> = items.iter().map(|item| item.as_ref().to_string()).collect();
        self.set(Property::Items.name(), items)
    }

    pub fn enabled(self, enabled: bool) -> Opts {
        self.set(Property::Enabled.name(), enabled)
    }

    pub fn text(self, text: &str) -> Opts {
        self.set(Property::Text.name(), text)
    }

    pub fn title(self, title: &str) -> Opts {
        self.set(Property::Title.name(), title)
    }

    pub fn align_text(self, align: Align) -> Opts {
        self.set(Property::TextAlign.name(), Value::Align(align))
    }

    pub fn checked(self, checked: bool) -> Opts {
        self.set(Property::Checked.name(), checked)
    }

    pub fn value<V: Into<Value>>(self, value: V) -> Opts {
        self.set(Property::Value.name(), value)
    }

    pub fn range<V: Into<Value>>(self, minimum: V, maximum: V) -> Opts {
        self.set(Property::Minimum.name(), minimum)
            .set(Property::Maximum.name(), maximum)
    }

    pub fn read_only(self, read_only: bool) -> Opts {
        self.set(Property::ReadOnly.name(), read_only)
    }

    pub fn tracking(self, tracking: bool) -> Opts {
        self.set(Property::Tracking.name(), tracking)
    }

    pub fn single_step(self, step: f64) -> Opts {
        self.set(Property::SingleStep.name(), step)
    }

    pub fn page_step(self, step: i32) -> Opts {
        self.set(Property::PageStep.name(), step)
    }

    pub fn tick_interval(self, interval: i32) -> Opts {
        self.set(Property::TickInterval.name(), interval)
    }

    pub fn decimals(self, decimals: i32) -> Opts {
        self.set(Property::Decimals.name(), decimals)
    }

    pub fn spacing(self, spacing: i32) -> Opts {
        self.set(Property::Spacing.name(), spacing)
    }

    pub fn grid_spacing(self, horizontal: i32, vertical: i32) -> Opts {
        self.set(Property::HorizontalSpacing.name(), horizontal)
            .set(Property::VerticalSpacing.name(), vertical)
    }

    fn get_u32(&self, name: &str, default: u32) -> u32 {
        self.get(name)
            .and_then(Value::as_int)
            .map(|i| u32::try_from(i.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(default)
    }

    /// Computes where a node declared with these options goes in a container of the given kind.
    pub fn slot(&self, container: ContainerKind, ordinal: usize) -> Slot {
        let placement = if container.is_linear() {
            Placement::Ordinal(ordinal)
        } else {
            Placement::Cell(Cell {
                row: self.get_u32(GRID_ROW, 0),
                column: self.get_u32(GRID_COLUMN, 0),
                row_span: self.get_u32(GRID_ROW_SPAN, 1).max(1),
                column_span: self.get_u32(GRID_COLUMN_SPAN, 1).max(1),
            })
        };
        let align = match self.get(ALIGN) {
            Some(Value::Align(align)) => *align,
            _ => Align::default(),
        };
        Slot {
            placement,
            stretch: self.get_u32(STRETCH, 0),
            align,
        }
    }
}

/// Native properties that options can be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Enabled,
    MinimumSize,
    MaximumSize,
    Margins,
    Text,
    Title,
    TextAlign,
    ReadOnly,
    Checked,
    Value,
    Minimum,
    Maximum,
    SingleStep,
    PageStep,
    Tracking,
    TickInterval,
    Decimals,
    Spacing,
    HorizontalSpacing,
    VerticalSpacing,
    Items,
}

const PROPERTIES: &[Property] = &[
    Property::Enabled,
    Property::MinimumSize,
    Property::MaximumSize,
    Property::Margins,
    Property::Text,
    Property::Title,
    Property::TextAlign,
    Property::ReadOnly,
    Property::Checked,
    Property::Value,
    Property::Minimum,
    Property::Maximum,
    Property::SingleStep,
    Property::PageStep,
    Property::Tracking,
    Property::TickInterval,
    Property::Decimals,
    Property::Spacing,
    Property::HorizontalSpacing,
    Property::VerticalSpacing,
    Property::Items,
];

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::Enabled => "enabled",
            Property::MinimumSize => "minimum_size",
            Property::MaximumSize => "maximum_size",
            Property::Margins => "margins",
            Property::Text => "text",
            Property::Title => "title",
            Property::TextAlign => "text_align",
            Property::ReadOnly => "read_only",
            Property::Checked => "checked",
            Property::Value => "value",
            Property::Minimum => "minimum",
            Property::Maximum => "maximum",
            Property::SingleStep => "single_step",
            Property::PageStep => "page_step",
            Property::Tracking => "tracking",
            Property::TickInterval => "tick_interval",
            Property::Decimals => "decimals",
            Property::Spacing => "spacing",
            Property::HorizontalSpacing => "horizontal_spacing",
            Property::VerticalSpacing => "vertical_spacing",
            Property::Items => "items",
        }
    }

    pub fn from_name(name: &str) -> Option<Property> {
        PROPERTIES.iter().copied().find(|p| p.name() == name)
    }

    /// The capability table: whether a node kind has this property.
    pub fn supported_by(self, kind: NodeKind) -> bool {
        use LeafKind::*;

        let leaf = match kind {
            NodeKind::Container(container) => {
                return match self {
                    Property::Margins | Property::Spacing => true,
                    Property::HorizontalSpacing | Property::VerticalSpacing => {
                        container == ContainerKind::Grid
                    }
                    _ => false,
                };
            }
            NodeKind::Leaf(leaf) => leaf,
        };

        match self {
            Property::Enabled | Property::MinimumSize | Property::MaximumSize => true,
            Property::Margins => leaf.can_host(),
            Property::Text => match leaf {
                Label | Button | ToggleButton | CheckBox | RadioButton | LineEdit => true,
                _ => false,
            },
            Property::Title => match leaf {
                Window | GroupBox => true,
                _ => false,
            },
            Property::TextAlign => match leaf {
                Label | LineEdit => true,
                _ => false,
            },
            Property::ReadOnly => match leaf {
                LineEdit | SpinBox | DoubleSpinBox => true,
                _ => false,
            },
            Property::Checked => match leaf {
                ToggleButton | CheckBox | RadioButton => true,
                _ => false,
            },
            Property::Value => match leaf {
                Slider(_) | ScrollBar(_) | SpinBox | DoubleSpinBox | ComboBox => true,
                _ => false,
            },
            Property::Minimum
            | Property::Maximum
            | Property::SingleStep
            | Property::PageStep => match leaf {
                Slider(_) | ScrollBar(_) | SpinBox | DoubleSpinBox => true,
                _ => false,
            },
            Property::Tracking => match leaf {
                Slider(_) | ScrollBar(_) => true,
                _ => false,
            },
            Property::TickInterval => match leaf {
                Slider(Axis::Horizontal) | Slider(Axis::Vertical) => true,
                _ => false,
            },
            Property::Decimals => leaf == DoubleSpinBox,
            Property::Items => leaf == ComboBox,
            Property::Spacing | Property::HorizontalSpacing | Property::VerticalSpacing => false,
        }
    }

    /// Whether a value has the right shape for this property.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Property::Enabled, Value::Bool(_))
            | (Property::ReadOnly, Value::Bool(_))
            | (Property::Checked, Value::Bool(_))
            | (Property::Tracking, Value::Bool(_)) => true,
            (Property::MinimumSize, Value::Size(_)) | (Property::MaximumSize, Value::Size(_)) => {
                true
            }
            (Property::Margins, Value::Margins(_)) => true,
            (Property::Text, Value::Text(_)) | (Property::Title, Value::Text(_)) => true,
            (Property::TextAlign, Value::Align(_)) => true,
            (Property::Value, Value::Int(_))
            | (Property::Value, Value::Float(_))
            | (Property::Minimum, Value::Int(_))
            | (Property::Minimum, Value::Float(_))
            | (Property::Maximum, Value::Int(_))
            | (Property::Maximum, Value::Float(_))
            | (Property::SingleStep, Value::Int(_))
            | (Property::SingleStep, Value::Float(_)) => true,
            (Property::PageStep, Value::Int(_))
            | (Property::TickInterval, Value::Int(_))
            | (Property::Decimals, Value::Int(_))
            | (Property::Spacing, Value::Int(_))
            | (Property::HorizontalSpacing, Value::Int(_))
            | (Property::VerticalSpacing, Value::Int(_)) => true,
            (Property::Items, Value::List(_)) => true,
            _ => false,
        }
    }
}

/// Applies an option bag to a native node. Returns the number of options that were skipped.
pub(crate) fn apply<B: Backend>(
    backend: &mut B,
    handle: &B::Handle,
    key: NodeKey,
    kind: NodeKind,
    opts: &Opts,
) -> usize {
    let mut skipped = 0;
    for (name, value) in opts.iter() {
        if PLACEMENT_OPTIONS.iter().any(|o| *o == name) {
            continue;
        }

        let property = match Property::from_name(name) {
            Some(property) => property,
            None => {
                warn!("{} ({}): invalid option {:?}", key, kind, name);
                skipped += 1;
                continue;
            }
        };

        if !property.supported_by(kind) {
            warn!("{} ({}): option {:?} is not supported", key, kind, name);
            skipped += 1;
        } else if !property.accepts(value) {
            warn!("{} ({}): option {:?} has invalid value {:?}", key, kind, name, value);
            skipped += 1;
        } else if let Err(err) = backend.set_property(handle, property, value) {
            warn!("{} ({}): failed to set {:?}: {:?}", key, kind, name, err);
            skipped += 1;
        }
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_options_win() {
        let base = Opts::new().stretch(1).text("a");
        let opts = base.merge(&Opts::new().text("b"));
        assert_eq!(opts.len(), 2);
        assert_eq!(opts.get("text"), Some(&Value::from("b")));
        assert_eq!(opts.get(STRETCH), Some(&Value::Int(1)));
    }

    #[test]
    fn linear_slots_use_the_ordinal() {
        let slot = Opts::new().stretch(2).cell(4, 4).slot(ContainerKind::VBox, 3);
        assert_eq!(slot.placement, Placement::Ordinal(3));
        assert_eq!(slot.stretch, 2);
    }

    #[test]
    fn grid_slots_use_cell_and_span() {
        let slot = Opts::new()
            .cell(1, 2)
            .span(0, 3)
            .align(Align::center())
            .slot(ContainerKind::Grid, 7);
        assert_eq!(
            slot.placement,
            Placement::Cell(Cell {
                row: 1,
                column: 2,
                row_span: 1,
                column_span: 3,
            })
        );
        assert_eq!(slot.align, Align::center());

        let default = Opts::new().slot(ContainerKind::Grid, 0);
        assert_eq!(default.placement, Placement::Cell(Cell::default()));
    }

    #[test]
    fn property_names_round_trip() {
        for property in PROPERTIES {
            assert_eq!(Property::from_name(property.name()), Some(*property));
        }
        assert_eq!(Property::from_name("wobble"), None);
    }

    #[test]
    fn capabilities() {
        let button = NodeKind::Leaf(LeafKind::Button);
        let grid = NodeKind::Container(ContainerKind::Grid);
        let hbox = NodeKind::Container(ContainerKind::HBox);

        assert!(Property::Text.supported_by(button));
        assert!(!Property::Checked.supported_by(button));
        assert!(Property::Checked.supported_by(NodeKind::Leaf(LeafKind::CheckBox)));
        assert!(Property::Decimals.supported_by(NodeKind::Leaf(LeafKind::DoubleSpinBox)));
        assert!(!Property::Decimals.supported_by(NodeKind::Leaf(LeafKind::SpinBox)));
        assert!(Property::HorizontalSpacing.supported_by(grid));
        assert!(!Property::HorizontalSpacing.supported_by(hbox));
        assert!(!Property::Enabled.supported_by(hbox));
    }

    #[test]
    fn value_shapes() {
        assert!(Property::Value.accepts(&Value::Float(0.5)));
        assert!(!Property::Text.accepts(&Value::Int(1)));
        assert!(Property::MinimumSize.accepts(&Value::Size(Vector2::new(1, 2))));

        let items = Opts::new().items(&["a", "b"]);
        let list = items.get(Property::Items.name()).unwrap();
        assert_eq!(list, &Value::List(vec!["a".to_string(), "b".to_string()]));
        assert!(Property::Items.accepts(list));
        assert!(Property::Items.supported_by(NodeKind::Leaf(LeafKind::ComboBox)));
        assert!(!Property::Items.supported_by(NodeKind::Leaf(LeafKind::Label)));
    }
}
