// src/keys.rs

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Control-key state reported alongside a key record.
    ///
    /// Bit values follow the console input record's `dwControlKeyState`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ControlKeyState: u32 {
        const RIGHT_ALT = 0x0001;
        const LEFT_ALT = 0x0002;
        const RIGHT_CTRL = 0x0004;
        const LEFT_CTRL = 0x0008;
        const SHIFT = 0x0010;
        const NUM_LOCK = 0x0020;
        const SCROLL_LOCK = 0x0040;
        const CAPS_LOCK = 0x0080;
        const ENHANCED_KEY = 0x0100;
    }
}

impl ControlKeyState {
    pub fn alt(&self) -> bool {
        self.intersects(ControlKeyState::LEFT_ALT | ControlKeyState::RIGHT_ALT)
    }

    pub fn ctrl(&self) -> bool {
        self.intersects(ControlKeyState::LEFT_CTRL | ControlKeyState::RIGHT_CTRL)
    }
}

/// One key transition, detached from the OS record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// UTF-16 unit produced by the key, `0` for keys without text (Shift alone).
    pub unit: u16,
    pub virtual_key: u16,
    pub scan_code: u16,
    pub repeat_count: u16,
    pub modifiers: ControlKeyState,
}

impl KeyEvent {
    /// A key event carrying only a character unit.
    pub fn from_unit(unit: u16) -> Self {
        KeyEvent {
            unit,
            ..KeyEvent::default()
        }
    }
}

/// Normalized input event. Only key transitions survive normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyEvent),
    /// Kept distinct so callers can tell transitions apart; never produces output.
    KeyUp(KeyEvent),
}

impl InputEvent {
    /// The character unit of a key-down event that produced text.
    pub fn text_unit(&self) -> Option<u16> {
        match self {
            InputEvent::KeyDown(key) if key.unit != 0 => Some(key.unit),
            _ => None,
        }
    }
}

/// A decoded keystroke.
///
/// Usually a Unicode scalar value, but a lone low surrogate is passed through
/// unchanged, so this is not a `char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CodePoint(u32);

impl CodePoint {
    pub const REPLACEMENT: CodePoint = CodePoint(0xFFFD);

    pub const fn new(value: u32) -> Self {
        CodePoint(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// The code point as a `char`, or `None` for an unpaired surrogate.
    pub fn to_char(self) -> Option<char> {
        char::from_u32(self.0)
    }
}

impl From<char> for CodePoint {
    fn from(c: char) -> Self {
        CodePoint(c as u32)
    }
}

impl From<u16> for CodePoint {
    fn from(unit: u16) -> Self {
        CodePoint(u32::from(unit))
    }
}

impl fmt::Display for CodePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X}", self.0)
    }
}
