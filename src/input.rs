use std::collections::HashSet;

use glam::Vec2;
use winit::event::{MouseButton as WinitMouseButton, MouseScrollDelta};

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

pub fn mouse_button_from_winit(button: WinitMouseButton) -> MouseButton {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Back => 3,
        WinitMouseButton::Forward => 4,
        WinitMouseButton::Other(value) => value.min(u8::MAX as u16) as u8,
    };
    MouseButton::new(index)
}

/// Converts a wheel event into dolly steps; scrolling up is positive.
pub fn scroll_steps(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
    }
}

const PIXELS_PER_LINE: f32 = 100.0;
const DOLLY_PIXELS_PER_STEP: f32 = 25.0;

/// Camera gesture recognised from raw pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Rotate(Vec2),
    Pan(Vec2),
    Dolly(f32),
}

/// Tracks pressed buttons and the cursor to turn drags into gestures:
/// left drag rotates, right drag pans, middle drag dollies.
#[derive(Debug, Default)]
pub struct PointerTracker {
    buttons: HashSet<MouseButton>,
    position: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button_down(&mut self, button: MouseButton) {
        self.buttons.insert(button);
    }

    pub fn button_up(&mut self, button: MouseButton) {
        self.buttons.remove(&button);
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn cursor_moved(&mut self, position: Vec2) -> Option<Gesture> {
        let previous = self.position.replace(position)?;
        let delta = position - previous;
        if delta == Vec2::ZERO {
            return None;
        }
        if self.is_down(MouseButton::LEFT) {
            Some(Gesture::Rotate(delta))
        } else if self.is_down(MouseButton::RIGHT) {
            Some(Gesture::Pan(delta))
        } else if self.is_down(MouseButton::MIDDLE) {
            // dragging down pushes the camera out, like scrolling down
            Some(Gesture::Dolly(-delta.y / DOLLY_PIXELS_PER_STEP))
        } else {
            None
        }
    }

    /// Forgets the cursor, e.g. when it leaves the window, so re-entry does
    /// not produce a jump.
    pub fn cursor_left(&mut self) {
        self.position = None;
        self.buttons.clear();
    }

    pub fn wheel(&mut self, steps: f32) -> Option<Gesture> {
        (steps != 0.0).then_some(Gesture::Dolly(steps))
    }
}
