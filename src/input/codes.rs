//! Gamepad button and stick codes understood by the emulation core
//!
//! The numeric values are part of the core's input API and are also used as
//! the prefix of persisted layout keys (e.g. `0-X` for the A button), so they
//! must never be renumbered.

use serde::{Deserialize, Serialize};

/// Gamepad button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    A,
    B,
    X,
    Y,
    StickL,
    StickR,
    TriggerL,
    TriggerR,
    TriggerZl,
    TriggerZr,
    Plus,
    Minus,
    DpadLeft,
    DpadUp,
    DpadRight,
    DpadDown,
    Sl,
    Sr,
    Home,
    Capture,
}

impl ButtonType {
    /// All button codes in numeric order
    pub fn all() -> &'static [ButtonType] {
        &[
            ButtonType::A,
            ButtonType::B,
            ButtonType::X,
            ButtonType::Y,
            ButtonType::StickL,
            ButtonType::StickR,
            ButtonType::TriggerL,
            ButtonType::TriggerR,
            ButtonType::TriggerZl,
            ButtonType::TriggerZr,
            ButtonType::Plus,
            ButtonType::Minus,
            ButtonType::DpadLeft,
            ButtonType::DpadUp,
            ButtonType::DpadRight,
            ButtonType::DpadDown,
            ButtonType::Sl,
            ButtonType::Sr,
            ButtonType::Home,
            ButtonType::Capture,
        ]
    }

    /// Numeric code sent to the core
    pub fn code(self) -> i32 {
        match self {
            ButtonType::A => 0,
            ButtonType::B => 1,
            ButtonType::X => 2,
            ButtonType::Y => 3,
            ButtonType::StickL => 4,
            ButtonType::StickR => 5,
            ButtonType::TriggerL => 6,
            ButtonType::TriggerR => 7,
            ButtonType::TriggerZl => 8,
            ButtonType::TriggerZr => 9,
            ButtonType::Plus => 10,
            ButtonType::Minus => 11,
            ButtonType::DpadLeft => 12,
            ButtonType::DpadUp => 13,
            ButtonType::DpadRight => 14,
            ButtonType::DpadDown => 15,
            ButtonType::Sl => 16,
            ButtonType::Sr => 17,
            ButtonType::Home => 18,
            ButtonType::Capture => 19,
        }
    }

    /// Reverse lookup from a numeric code
    pub fn from_code(code: i32) -> Option<Self> {
        Self::all().iter().copied().find(|b| b.code() == code)
    }

    /// Short lowercase name for logs and asset lookup
    pub fn name(self) -> &'static str {
        match self {
            ButtonType::A => "a",
            ButtonType::B => "b",
            ButtonType::X => "x",
            ButtonType::Y => "y",
            ButtonType::StickL => "l3",
            ButtonType::StickR => "r3",
            ButtonType::TriggerL => "l",
            ButtonType::TriggerR => "r",
            ButtonType::TriggerZl => "zl",
            ButtonType::TriggerZr => "zr",
            ButtonType::Plus => "plus",
            ButtonType::Minus => "minus",
            ButtonType::DpadLeft => "dpad_left",
            ButtonType::DpadUp => "dpad_up",
            ButtonType::DpadRight => "dpad_right",
            ButtonType::DpadDown => "dpad_down",
            ButtonType::Sl => "sl",
            ButtonType::Sr => "sr",
            ButtonType::Home => "home",
            ButtonType::Capture => "capture",
        }
    }
}

impl std::fmt::Display for ButtonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Analog stick identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickType {
    Left,
    Right,
}

impl StickType {
    pub fn code(self) -> i32 {
        match self {
            StickType::Left => 0,
            StickType::Right => 1,
        }
    }

    /// Button code of the stick click
    pub fn click_button(self) -> ButtonType {
        match self {
            StickType::Left => ButtonType::StickL,
            StickType::Right => ButtonType::StickR,
        }
    }
}

impl std::fmt::Display for StickType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StickType::Left => write!(f, "stick_l"),
            StickType::Right => write!(f, "stick_r"),
        }
    }
}
