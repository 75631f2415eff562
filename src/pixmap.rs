//! Pointer input on pixmaps.
//!
//! Pixmaps collect the pointer events sent for them and expose the result as per-frame state. A
//! button is *down* in the frame its press arrives and *pressed* in the frames after that, until
//! its release arrives: then it is *up* for one frame and *released* afterwards.

use crate::events::{EventKind, MouseButton, Pointer};
use cgmath::{Point2, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonState {
    Released,
    Down,
    Pressed,
    Up,
}

/// Pointer and size state of a pixmap in the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PixmapInput {
    buttons: [ButtonState; 3],
    position: Point2<i32>,
    wheel_delta: i32,
    size: Vector2<i32>,
    resized: bool,
}

impl PixmapInput {
    pub(crate) fn new(size: Vector2<i32>) -> PixmapInput {
        PixmapInput {
            buttons: [ButtonState::Released; 3],
            position: Point2::new(0, 0),
            wheel_delta: 0,
            size,
            resized: false,
        }
    }

    /// Moves on to the next frame.
    pub(crate) fn advance(&mut self) {
        for state in &mut self.buttons {
            *state = match *state {
                ButtonState::Down => ButtonState::Pressed,
                ButtonState::Up => ButtonState::Released,
                state => state,
            };
        }
        self.wheel_delta = 0;
        self.resized = false;
    }

    pub(crate) fn apply(&mut self, event: &EventKind) {
        match event {
            EventKind::Pointer(Pointer::Press(button, position)) => {
                self.buttons[*button as usize] = ButtonState::Down;
                self.position = *position;
            }
            EventKind::Pointer(Pointer::Release(button, position)) => {
                self.buttons[*button as usize] = ButtonState::Up;
                self.position = *position;
            }
            EventKind::Pointer(Pointer::Move(position)) => self.position = *position,
            EventKind::Pointer(Pointer::Wheel(delta)) => self.wheel_delta = *delta,
            EventKind::Resized(size) => {
                self.size = *size;
                self.resized = true;
            }
            _ => (),
        }
    }

    /// Whether the button went down since the last frame.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.buttons[button as usize] == ButtonState::Down
    }

    /// Whether the button has been held down since an earlier frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button as usize] == ButtonState::Pressed
    }

    /// Whether the button was released since the last frame.
    pub fn mouse_up(&self, button: MouseButton) -> bool {
        self.buttons[button as usize] == ButtonState::Up
    }

    /// The last known pointer location.
    pub fn position(&self) -> Point2<i32> {
        self.position
    }

    pub fn wheel_delta(&self) -> i32 {
        self.wheel_delta
    }

    pub fn size(&self) -> Vector2<i32> {
        self.size
    }

    pub fn was_resized(&self) -> bool {
        self.resized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_go_down_then_pressed_then_up() {
        let mut input = PixmapInput::new(Vector2::new(4, 4));
        let at = Point2::new(1, 2);

        input.advance();
        input.apply(&EventKind::Pointer(Pointer::Press(MouseButton::Right, at)));
        assert!(input.mouse_down(MouseButton::Right));
        assert!(!input.mouse_down(MouseButton::Left));
        assert_eq!(input.position(), at);

        input.advance();
        assert!(input.mouse_pressed(MouseButton::Right));
        input.advance();
        assert!(input.mouse_pressed(MouseButton::Right));

        input.apply(&EventKind::Pointer(Pointer::Release(MouseButton::Right, at)));
        assert!(input.mouse_up(MouseButton::Right));
        input.advance();
        assert!(!input.mouse_up(MouseButton::Right));
        assert!(!input.mouse_pressed(MouseButton::Right));
    }

    #[test]
    fn wheel_and_resize_last_one_frame() {
        let mut input = PixmapInput::new(Vector2::new(4, 4));
        input.apply(&EventKind::Pointer(Pointer::Wheel(120)));
        input.apply(&EventKind::Resized(Vector2::new(8, 6)));
        assert_eq!(input.wheel_delta(), 120);
        assert!(input.was_resized());

        input.advance();
        assert_eq!(input.wheel_delta(), 0);
        assert!(!input.was_resized());
        assert_eq!(input.size(), Vector2::new(8, 6));
    }
}
