//! Native events.
//!
//! A native backend reports user interaction by sending [`NativeEvent`]s, addressed by the native
//! handle of the widget they happened on, through a channel created with [`event_channel`]. The
//! [`Host`](crate::Host) collects them between frames into an [`EventInbox`], from which the
//! widget declarations of the next frame pick up the events that concern them.

use cgmath::{Point2, Vector2};
use crossbeam::channel::{self, Receiver, Sender};

/// What happened.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Clicked,
    Toggled(bool),
    ValueChanged(i64),
    FloatChanged(f64),
    TextEdited(String),
    /// A combo box entry was chosen.
    Activated(usize),
    Pointer(Pointer),
    /// The widget now has the given size.
    Resized(Vector2<i32>),
    CloseRequested,
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
    Middle = 2,
}

/// Pointer input on a widget. Locations are in the widget’s coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pointer {
    Press(MouseButton, Point2<i32>),
    Release(MouseButton, Point2<i32>),
    Move(Point2<i32>),
    /// Wheel rotation, in eighths of a degree.
    Wheel(i32),
}

/// An event on a native widget.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEvent<H> {
    pub target: H,
    pub kind: EventKind,
}

impl<H> NativeEvent<H> {
    pub fn new(target: H, kind: EventKind) -> NativeEvent<H> {
        NativeEvent { target, kind }
    }
}

pub type EventSender<H> = Sender<NativeEvent<H>>;
pub type EventReceiver<H> = Receiver<NativeEvent<H>>;

/// Creates a channel for native events.
pub fn event_channel<H>() -> (EventSender<H>, EventReceiver<H>) {
    channel::unbounded()
}

/// Events received since the last frame.
#[derive(Debug)]
pub struct EventInbox<H> {
    events: Vec<NativeEvent<H>>,
}

impl<H> Default for EventInbox<H> {
    fn default() -> EventInbox<H> {
        EventInbox { events: Vec::new() }
    }
}

impl<H: PartialEq> EventInbox<H> {
    pub fn new() -> EventInbox<H> {
        EventInbox::default()
    }

    pub fn push(&mut self, event: NativeEvent<H>) {
        self.events.push(event);
    }

    /// Removes all events for the target that `f` maps to a value, and returns the last value.
    pub fn take<T, F>(&mut self, target: &H, f: F) -> Option<T>
    where
        F: Fn(&EventKind) -> Option<T>,
    {
        let mut taken = None;
        self.events.retain(|event| {
            if event.target != *target {
                return true;
            }
            match f(&event.kind) {
                Some(value) => {
                    taken = Some(value);
                    false
                }
                None => true,
            }
        });
        taken
    }

    /// Removes all events for the target that `f` maps to a value, and returns the values in the
    /// order the events arrived.
    pub fn drain<T, F>(&mut self, target: &H, f: F) -> Vec<T>
    where
        F: Fn(&EventKind) -> Option<T>,
    {
        let mut taken = Vec::new();
        self.events.retain(|event| {
            if event.target != *target {
                return true;
            }
            match f(&event.kind) {
                Some(value) => {
                    taken.push(value);
                    false
                }
                None => true,
            }
        });
        taken
    }

    /// Keeps only events whose target satisfies the predicate.
    pub fn retain<F: Fn(&H) -> bool>(&mut self, f: F) {
        self.events.retain(|event| f(&event.target));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggled(kind: &EventKind) -> Option<bool> {
        match kind {
            EventKind::Toggled(on) => Some(*on),
            _ => None,
        }
    }

    #[test]
    fn take_returns_the_last_matching_event() {
        let mut inbox = EventInbox::new();
        inbox.push(NativeEvent::new(1, EventKind::Toggled(true)));
        inbox.push(NativeEvent::new(2, EventKind::Toggled(true)));
        inbox.push(NativeEvent::new(1, EventKind::Clicked));
        inbox.push(NativeEvent::new(1, EventKind::Toggled(false)));

        assert_eq!(inbox.take(&1, toggled), Some(false));
        assert_eq!(inbox.take(&1, toggled), None);
        assert_eq!(inbox.len(), 2);

        inbox.retain(|target| *target != 2);
        assert_eq!(inbox.events, vec![NativeEvent::new(1, EventKind::Clicked)]);
    }

    #[test]
    fn drain_keeps_arrival_order() {
        let mut inbox = EventInbox::new();
        inbox.push(NativeEvent::new(1, EventKind::ValueChanged(1)));
        inbox.push(NativeEvent::new(1, EventKind::Clicked));
        inbox.push(NativeEvent::new(2, EventKind::ValueChanged(2)));
        inbox.push(NativeEvent::new(1, EventKind::ValueChanged(3)));

        let values = inbox.drain(&1, |kind| match kind {
            EventKind::ValueChanged(value) => Some(*value),
            _ => None,
        });
        assert_eq!(values, vec![1, 3]);
        assert_eq!(inbox.len(), 2);
    }

    #[test]
    fn channel_delivers_in_order() {
        let (sender, receiver) = event_channel();
        sender.send(NativeEvent::new("a", EventKind::Clicked)).unwrap();
        sender
            .send(NativeEvent::new("a", EventKind::ValueChanged(3)))
            .unwrap();
        assert_eq!(receiver.try_recv().unwrap().kind, EventKind::Clicked);
        assert_eq!(
            receiver.try_recv().unwrap().kind,
            EventKind::ValueChanged(3)
        );
        assert!(receiver.try_recv().is_err());
    }
}
