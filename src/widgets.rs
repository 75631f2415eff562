//! Typed widget declarations.
//!
//! Every widget takes a caller-assigned id, unique among the widgets of a frame, and an option
//! bag. Widgets that hold a value take it by mutable reference: if the user changed the value
//! since the last frame, the new value is written back and the widget returns true; otherwise the
//! caller’s value is pushed to the native widget.
//!
//! Declaration faults do not interrupt the caller; they are reported by [`Host::update`].

use crate::events::EventKind;
use crate::host::Host;
use crate::pixmap::PixmapInput;
use cgmath::Vector2;
use perch_core::{Axis, Backend, ContainerKind, Id, LeafKind, NodeKey, Opts, ScopeKind};

/// A rendering surface whose native object is owned outside of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface<H> {
    handle: H,
}

impl<H> Surface<H> {
    pub fn new(handle: H) -> Surface<H> {
        Surface { handle }
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }
}

impl<B: Backend> Host<B> {
    pub fn window_begin(&mut self, id: Id, title: &str, opts: &Opts) {
        let result = self.tree.begin_top_level(id, &opts.clone().title(title));
        if let Some(handle) = self.record(result) {
            self.window = Some(handle);
        }
    }

    pub fn window_end(&mut self) {
        let result = self.tree.end_scope(ScopeKind::TopLevel);
        self.record(result);
        self.window = None;
    }

    /// Returns true if the user asked to close the window whose scope is open.
    pub fn window_close_requested(&mut self) -> bool {
        let window = match &self.window {
            Some(window) => window.clone(),
            None => return false,
        };
        self.inbox
            .take(&window, |event| match event {
                EventKind::CloseRequested => Some(()),
                _ => None,
            })
            .is_some()
    }

    pub fn frame_begin(&mut self, id: Id, opts: &Opts) {
        self.widget_begin(id, LeafKind::Frame, opts.clone());
    }

    pub fn frame_end(&mut self) {
        self.widget_end();
    }

    pub fn group_box_begin(&mut self, id: Id, title: &str, opts: &Opts) {
        self.widget_begin(id, LeafKind::GroupBox, opts.clone().title(title));
    }

    pub fn group_box_end(&mut self) {
        self.widget_end();
    }

    /// Begins a fixed-size pixmap widget, and collects the pointer input it received since the
    /// last frame. See [`pixmap_input`](Host::pixmap_input).
    pub fn pixmap_begin(&mut self, id: Id, size: Vector2<i32>, opts: &Opts) {
        let opts = opts.clone().fixed_size(size.x, size.y);
        let handle = match self.widget_begin(id, LeafKind::Pixmap, opts) {
            Some(handle) => handle,
            None => return,
        };
        let events = self.inbox.drain(&handle, |event| match event {
            EventKind::Pointer(_) | EventKind::Resized(_) => Some(event.clone()),
            _ => None,
        });

        let input = self
            .pixmaps
            .entry(id)
            .or_insert_with(|| PixmapInput::new(size));
        input.advance();
        for event in &events {
            input.apply(event);
        }
    }

    /// Shows ARGB32 pixels, row by row, in a pixmap declared in this frame.
    pub fn pixmap_blit(&mut self, id: Id, size: Vector2<i32>, argb: &[u8]) {
        let result = self.tree.blit(id, size, argb);
        self.record(result);
    }

    pub fn pixmap_end(&mut self) {
        self.widget_end();
    }

    pub fn hbox_begin(&mut self, id: Id, opts: &Opts) {
        self.container_begin(id, ContainerKind::HBox, opts);
    }

    pub fn hbox_end(&mut self) {
        self.container_end();
    }

    pub fn vbox_begin(&mut self, id: Id, opts: &Opts) {
        self.container_begin(id, ContainerKind::VBox, opts);
    }

    pub fn vbox_end(&mut self) {
        self.container_end();
    }

    pub fn grid_begin(&mut self, id: Id, opts: &Opts) {
        self.container_begin(id, ContainerKind::Grid, opts);
    }

    pub fn grid_end(&mut self) {
        self.container_end();
    }

    pub fn label(&mut self, id: Id, text: &str, opts: &Opts) {
        self.leaf(id, LeafKind::Label, opts.clone().text(text));
    }

    pub fn h_separator(&mut self, id: Id, opts: &Opts) {
        self.leaf(id, LeafKind::Separator(Axis::Horizontal), opts.clone());
    }

    pub fn v_separator(&mut self, id: Id, opts: &Opts) {
        self.leaf(id, LeafKind::Separator(Axis::Vertical), opts.clone());
    }

    pub fn spacer(&mut self, id: Id, opts: &Opts) {
        self.leaf(id, LeafKind::Spacer, opts.clone());
    }

    /// Returns true if the button was clicked.
    pub fn button(&mut self, id: Id, text: &str, opts: &Opts) -> bool {
        let clicked = self.take_event(id, |event| match event {
            EventKind::Clicked => Some(()),
            _ => None,
        });
        self.leaf(id, LeafKind::Button, opts.clone().text(text));
        clicked.is_some()
    }

    pub fn toggle_button(&mut self, id: Id, text: &str, checked: &mut bool, opts: &Opts) -> bool {
        self.checkable(id, LeafKind::ToggleButton, text, checked, opts)
    }

    pub fn check_box(&mut self, id: Id, text: &str, checked: &mut bool, opts: &Opts) -> bool {
        self.checkable(id, LeafKind::CheckBox, text, checked, opts)
    }

    pub fn radio_button(&mut self, id: Id, text: &str, checked: &mut bool, opts: &Opts) -> bool {
        self.checkable(id, LeafKind::RadioButton, text, checked, opts)
    }

    pub fn h_slider(&mut self, id: Id, min: i32, max: i32, value: &mut i32, opts: &Opts) -> bool {
        self.ranged(id, LeafKind::Slider(Axis::Horizontal), min, max, value, opts)
    }

    pub fn v_slider(&mut self, id: Id, min: i32, max: i32, value: &mut i32, opts: &Opts) -> bool {
        self.ranged(id, LeafKind::Slider(Axis::Vertical), min, max, value, opts)
    }

    pub fn h_scroll_bar(&mut self, id: Id, min: i32, max: i32, value: &mut i32, opts: &Opts) -> bool {
        self.ranged(id, LeafKind::ScrollBar(Axis::Horizontal), min, max, value, opts)
    }

    pub fn v_scroll_bar(&mut self, id: Id, min: i32, max: i32, value: &mut i32, opts: &Opts) -> bool {
        self.ranged(id, LeafKind::ScrollBar(Axis::Vertical), min, max, value, opts)
    }

    pub fn spin_box(&mut self, id: Id, min: i32, max: i32, value: &mut i32, opts: &Opts) -> bool {
        self.ranged(id, LeafKind::SpinBox, min, max, value, opts)
    }

    pub fn double_spin_box(
        &mut self,
        id: Id,
        min: f64,
        max: f64,
        value: &mut f64,
        opts: &Opts,
    ) -> bool {
        let changed = self.take_event(id, |event| match event {
            EventKind::FloatChanged(value) => Some(*value),
            _ => None,
        });
        if let Some(new_value) = changed {
            *value = new_value;
        }
        *value = (*value).max(min).min(max);

        let opts = opts.clone().range(min, max).value(*value);
        self.leaf(id, LeafKind::DoubleSpinBox, opts);
        changed.is_some()
    }

    /// Returns true if the user chose an entry. The index is clamped to the entries.
    pub fn combo_box(&mut self, id: Id, items: &[&str], index: &mut usize, opts: &Opts) -> bool {
        let activated = self.take_event(id, |event| match event {
            EventKind::Activated(index) => Some(*index),
            _ => None,
        });
        if let Some(new_index) = activated {
            *index = new_index;
        }
        *index = (*index).min(items.len().saturating_sub(1));

        let opts = opts.clone().items(items).value(*index as i64);
        self.leaf(id, LeafKind::ComboBox, opts);
        activated.is_some()
    }

    /// Returns true if the user edited the text.
    pub fn line_edit(&mut self, id: Id, text: &mut String, opts: &Opts) -> bool {
        let edited = self.take_event(id, |event| match event {
            EventKind::TextEdited(text) => Some(text.clone()),
            _ => None,
        });
        let changed = edited.is_some();
        if let Some(edited) = edited {
            *text = edited;
        }
        self.leaf(id, LeafKind::LineEdit, opts.clone().text(text));
        changed
    }

    pub fn surface(&mut self, id: Id, surface: &Surface<B::Handle>, opts: &Opts) {
        let result = self
            .tree
            .adopt_surface(id, surface.handle().clone(), opts);
        self.record(result);
    }

    fn widget_begin(&mut self, id: Id, kind: LeafKind, opts: Opts) -> Option<B::Handle> {
        let result = self.tree.begin_widget(id, kind, &opts);
        self.record(result)
    }

    fn widget_end(&mut self) {
        let result = self.tree.end_scope(ScopeKind::Widget);
        self.record(result);
    }

    fn container_begin(&mut self, id: Id, kind: ContainerKind, opts: &Opts) {
        let result = self.tree.begin_container(id, kind, opts);
        self.record(result);
    }

    fn container_end(&mut self) {
        let result = self.tree.end_scope(ScopeKind::Container);
        self.record(result);
    }

    fn leaf(&mut self, id: Id, kind: LeafKind, opts: Opts) -> Option<B::Handle> {
        let result = self.tree.declare_leaf(id, kind, &opts);
        self.record(result)
    }

    /// Takes the latest event of a kind for the widget registered under a leaf id.
    fn take_event<T, F>(&mut self, id: Id, f: F) -> Option<T>
    where
        F: Fn(&EventKind) -> Option<T>,
    {
        let handle = self.tree.handle(NodeKey::Leaf(id))?.clone();
        self.inbox.take(&handle, f)
    }

    fn checkable(
        &mut self,
        id: Id,
        kind: LeafKind,
        text: &str,
        checked: &mut bool,
        opts: &Opts,
    ) -> bool {
        let toggled = self.take_event(id, |event| match event {
            EventKind::Toggled(checked) => Some(*checked),
            _ => None,
        });
        if let Some(new_value) = toggled {
            *checked = new_value;
        }
        self.leaf(id, kind, opts.clone().text(text).checked(*checked));
        toggled.is_some()
    }

    fn ranged(
        &mut self,
        id: Id,
        kind: LeafKind,
        min: i32,
        max: i32,
        value: &mut i32,
        opts: &Opts,
    ) -> bool {
        let changed = self.take_event(id, |event| match event {
            EventKind::ValueChanged(value) => Some(*value),
            _ => None,
        });
        if let Some(new_value) = changed {
            *value = new_value.max(i64::from(min)).min(i64::from(max)) as i32;
        }
        *value = (*value).max(min).min(max);

        let opts = opts.clone().range(min, max).value(*value);
        self.leaf(id, kind, opts);
        changed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{event_channel, EventSender, MouseButton, NativeEvent, Pointer};
    use cgmath::Point2;
    use perch_core::{HeadlessBackend, NativeHandle, Property, UsageFault, Value};

    fn host() -> (
        Host<HeadlessBackend>,
        HeadlessBackend,
        EventSender<NativeHandle>,
    ) {
        let _ = env_logger::builder().is_test(true).try_init();
        let (sender, receiver) = event_channel();
        let backend = HeadlessBackend::new();
        (Host::new(backend.clone(), receiver), backend, sender)
    }

    fn leaf_handle(host: &Host<HeadlessBackend>, id: Id) -> NativeHandle {
        *host.tree.handle(NodeKey::Leaf(id)).unwrap()
    }

    #[test]
    fn buttons_report_clicks_once() {
        let (mut host, _, sender) = host();
        let o = Opts::new();
        let frame = |host: &mut Host<HeadlessBackend>| {
            host.window_begin(1, "clicks", &o);
            host.vbox_begin(10, &o);
            let clicked = host.button(2, "press", &o);
            host.vbox_end();
            host.window_end();
            host.update().unwrap();
            clicked
        };

        assert!(!frame(&mut host));
        sender
            .send(NativeEvent::new(leaf_handle(&host, 2), EventKind::Clicked))
            .unwrap();
        assert!(!frame(&mut host), "events are delivered on the next update");
        assert!(frame(&mut host));
        assert!(!frame(&mut host));
    }

    #[test]
    fn checkable_values_follow_events() {
        let (mut host, backend, _) = host();
        let o = Opts::new();
        let mut checked = true;
        let frame = |host: &mut Host<HeadlessBackend>, checked: &mut bool| {
            host.window_begin(1, "check", &o);
            host.hbox_begin(10, &o);
            let toggled = host.check_box(2, "on", checked, &o);
            host.hbox_end();
            host.window_end();
            host.update().unwrap();
            toggled
        };

        assert!(!frame(&mut host, &mut checked));
        let check_box = leaf_handle(&host, 2);
        assert_eq!(
            backend.property(check_box, Property::Checked),
            Some(Value::Bool(true))
        );

        host.push_event(NativeEvent::new(check_box, EventKind::Toggled(false)));
        assert!(frame(&mut host, &mut checked));
        assert!(!checked);

        checked = true;
        assert!(!frame(&mut host, &mut checked));
        assert_eq!(
            backend.property(check_box, Property::Checked),
            Some(Value::Bool(true))
        );
    }

    #[test]
    fn sliders_clamp_values() {
        let (mut host, backend, _) = host();
        let o = Opts::new();
        let mut value = 50;
        host.window_begin(1, "slide", &o);
        host.grid_begin(10, &o);
        host.h_slider(2, 0, 10, &mut value, &Opts::new().cell(0, 1));
        host.grid_end();
        host.window_end();
        host.update().unwrap();
        assert_eq!(value, 10);

        let slider = leaf_handle(&host, 2);
        assert_eq!(backend.property(slider, Property::Value), Some(Value::Int(10)));
        assert_eq!(backend.property(slider, Property::Maximum), Some(Value::Int(10)));

        host.push_event(NativeEvent::new(slider, EventKind::ValueChanged(-4)));
        host.window_begin(1, "slide", &o);
        host.grid_begin(10, &o);
        assert!(host.h_slider(2, 0, 10, &mut value, &Opts::new().cell(0, 1)));
        host.grid_end();
        host.window_end();
        let report = host.update().unwrap();
        assert!(report.is_quiet());
        assert_eq!(value, 0);
    }

    #[test]
    fn line_edits_take_edited_text() {
        let (mut host, backend, _) = host();
        let o = Opts::new();
        let mut text = String::from("before");
        let frame = |host: &mut Host<HeadlessBackend>, text: &mut String| {
            host.window_begin(1, "edit", &o);
            host.vbox_begin(10, &o);
            let edited = host.line_edit(2, text, &o);
            host.vbox_end();
            host.window_end();
            host.update().unwrap();
            edited
        };

        assert!(!frame(&mut host, &mut text));
        let edit = leaf_handle(&host, 2);
        host.push_event(NativeEvent::new(edit, EventKind::TextEdited("after".into())));
        assert!(frame(&mut host, &mut text));
        assert_eq!(text, "after");
        assert_eq!(backend.property(edit, Property::Text), Some(Value::from("after")));
    }

    #[test]
    fn nested_widgets_and_surfaces() {
        let (mut host, backend, _) = host();
        let o = Opts::new();
        let surface = Surface::new(backend.create_surface());
        host.window_begin(1, "nested", &o);
        host.vbox_begin(10, &o);
        host.group_box_begin(2, "group", &o);
        host.grid_begin(20, &o);
        host.label(3, "a", &o);
        host.h_separator(4, &Opts::new().cell(1, 0));
        host.grid_end();
        host.group_box_end();
        host.pixmap_begin(5, Vector2::new(16, 16), &o);
        host.pixmap_end();
        host.surface(6, &surface, &o);
        host.spacer(7, &o);
        host.vbox_end();
        host.window_end();
        let report = host.update().unwrap();
        assert_eq!(report.created, 9);
        assert_eq!(host.tree.root(2), Some(20));
        assert_eq!(
            host.tree.children(10),
            Some(&[NodeKey::Leaf(2), NodeKey::Leaf(5), NodeKey::Leaf(6), NodeKey::Leaf(7)][..])
        );

        host.window_begin(1, "nested", &o);
        host.window_end();
        let report = host.update().unwrap();
        assert_eq!(report.hidden, 1);
        assert_eq!(report.destroyed, 7);
        assert!(backend.exists(*surface.handle()));
    }

    #[test]
    fn close_requests_target_the_window() {
        let (mut host, _, _) = host();
        let o = Opts::new();
        host.window_begin(1, "closable", &o);
        host.window_end();
        host.update().unwrap();

        let window = leaf_handle(&host, 1);
        host.push_event(NativeEvent::new(window, EventKind::CloseRequested));
        host.window_begin(1, "closable", &o);
        assert!(host.window_close_requested());
        assert!(!host.window_close_requested());
        host.window_end();
        host.update().unwrap();

        // only answered inside the window's scope
        host.push_event(NativeEvent::new(window, EventKind::CloseRequested));
        host.window_begin(1, "closable", &o);
        host.window_end();
        assert!(!host.window_close_requested());
        host.update().unwrap();
    }

    #[test]
    fn combo_boxes_follow_activation() {
        let (mut host, backend, _) = host();
        let o = Opts::new();
        let items = ["red", "green", "blue"];
        let mut index = 7;
        let frame = |host: &mut Host<HeadlessBackend>, index: &mut usize| {
            host.window_begin(1, "pick", &o);
            host.hbox_begin(10, &o);
            let chosen = host.combo_box(2, &items, index, &o);
            host.hbox_end();
            host.window_end();
            host.update().unwrap();
            chosen
        };

        assert!(!frame(&mut host, &mut index));
        assert_eq!(index, 2);
        let combo = leaf_handle(&host, 2);
        assert_eq!(backend.property(combo, Property::Value), Some(Value::Int(2)));
        assert_eq!(
            backend.property(combo, Property::Items),
            Some(Value::List(vec!["red".into(), "green".into(), "blue".into()]))
        );

        host.push_event(NativeEvent::new(combo, EventKind::Activated(0)));
        assert!(frame(&mut host, &mut index));
        assert_eq!(index, 0);
        assert_eq!(backend.property(combo, Property::Value), Some(Value::Int(0)));
        assert!(!frame(&mut host, &mut index));
    }

    #[test]
    fn pixmaps_track_pointer_input() {
        let (mut host, backend, sender) = host();
        let o = Opts::new();
        let size = Vector2::new(2, 2);
        let frame = |host: &mut Host<HeadlessBackend>| {
            host.window_begin(1, "paint", &o);
            host.vbox_begin(10, &o);
            host.pixmap_begin(2, size, &o);
            host.pixmap_blit(2, size, &[0x80; 16]);
            let input = host.pixmap_input(2).cloned();
            host.pixmap_end();
            host.vbox_end();
            host.window_end();
            host.update().unwrap();
            input.unwrap()
        };

        let input = frame(&mut host);
        assert_eq!(input.size(), size);
        assert!(!input.mouse_down(MouseButton::Left));
        let pixmap = leaf_handle(&host, 2);
        assert_eq!(backend.image(pixmap), Some((size, vec![0x80; 16])));

        let at = Point2::new(1, 1);
        let press = Pointer::Press(MouseButton::Left, at);
        sender.send(NativeEvent::new(pixmap, EventKind::Pointer(press))).unwrap();
        sender
            .send(NativeEvent::new(pixmap, EventKind::Resized(Vector2::new(3, 3))))
            .unwrap();
        host.poll();
        let input = frame(&mut host);
        assert!(input.mouse_down(MouseButton::Left));
        assert_eq!(input.position(), at);
        assert!(input.was_resized());
        assert_eq!(input.size(), Vector2::new(3, 3));

        let input = frame(&mut host);
        assert!(input.mouse_pressed(MouseButton::Left));
        assert!(!input.was_resized());

        let release = Pointer::Release(MouseButton::Left, Point2::new(0, 1));
        host.push_event(NativeEvent::new(pixmap, EventKind::Pointer(release)));
        host.push_event(NativeEvent::new(pixmap, EventKind::Pointer(Pointer::Wheel(-120))));
        let input = frame(&mut host);
        assert!(input.mouse_up(MouseButton::Left));
        assert_eq!(input.position(), Point2::new(0, 1));
        assert_eq!(input.wheel_delta(), -120);

        let input = frame(&mut host);
        assert!(!input.mouse_up(MouseButton::Left));
        assert!(!input.mouse_pressed(MouseButton::Left));
        assert_eq!(input.wheel_delta(), 0);

        host.window_begin(1, "paint", &o);
        host.window_end();
        host.update().unwrap();
        assert!(host.pixmap_input(2).is_none());
    }

    #[test]
    fn faults_surface_on_update() {
        let (mut host, _, _) = host();
        let o = Opts::new();
        host.window_begin(1, "faulty", &o);
        host.label(2, "no layout", &o);
        host.window_end();
        match host.update() {
            Err(perch_core::Error::Usage(UsageFault::NoContainer(key))) => {
                assert_eq!(key, NodeKey::Leaf(2))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
