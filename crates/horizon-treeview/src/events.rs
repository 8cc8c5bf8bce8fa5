//! Input events consumed by the tree view.
//!
//! The host toolkit translates its native events into these types. Pointer
//! positions are relative to the viewport's top-left corner, so `y == 0` is
//! the top visible pixel regardless of the scroll offset.

use std::time::Instant;

use horizon_treeview_core::Point;

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held (Cmd on macOS).
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Whether any modifier is held.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left,
    /// Secondary button (usually right).
    Right,
    /// Middle button (scroll wheel click).
    Middle,
}

/// A pointer press, motion, or release.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    /// Position relative to the viewport.
    pub pos: Point,
    /// The button that changed state. Ignored for motion.
    pub button: MouseButton,
    /// Modifiers held during the event.
    pub modifiers: KeyboardModifiers,
    /// 1 for a single click, 2 for a double click, as reported by the toolkit.
    pub click_count: u32,
    /// When the event happened. Auto-scroll timers are scheduled from this.
    pub time: Instant,
}

impl PointerEvent {
    /// A left-button event with no modifiers at the given viewport position.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Point::new(x, y),
            button: MouseButton::Left,
            modifiers: KeyboardModifiers::NONE,
            click_count: 1,
            time: Instant::now(),
        }
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: KeyboardModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }

    pub fn with_time(mut self, time: Instant) -> Self {
        self.time = time;
        self
    }
}

/// Keys the view reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    A,
    /// Any key the view does not handle.
    Other,
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: KeyboardModifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyboardModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
