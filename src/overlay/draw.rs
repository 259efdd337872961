//! Draw list produced for the renderer
//!
//! The overlay only decides what is drawn where; sprites are referenced by
//! asset name and resolved by whoever renders the list.

use crate::controls::DpadDirections;
use crate::geometry::Rect;
use crate::input::{ButtonType, StickType};

/// One control's visual state
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Button {
        button: ButtonType,
        rect: Rect,
        pressed: bool,
    },
    Dpad {
        rect: Rect,
        directions: DpadDirections,
    },
    Joystick {
        stick: StickType,
        ring: Rect,
        knob: Rect,
        pressed: bool,
    },
}

/// A positioned image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub asset: String,
    pub rect: Rect,
}

impl DrawCommand {
    /// Touch rectangle (the ring for joysticks)
    pub fn rect(&self) -> Rect {
        match self {
            DrawCommand::Button { rect, .. } | DrawCommand::Dpad { rect, .. } => *rect,
            DrawCommand::Joystick { ring, .. } => *ring,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            DrawCommand::Button { pressed, .. } | DrawCommand::Joystick { pressed, .. } => *pressed,
            DrawCommand::Dpad { directions, .. } => !directions.is_neutral(),
        }
    }

    /// Sprites in paint order
    pub fn sprites(&self) -> Vec<Sprite> {
        match self {
            DrawCommand::Button {
                button,
                rect,
                pressed,
            } => vec![Sprite {
                asset: pressed_variant(&format!("button_{}", button.name()), *pressed),
                rect: *rect,
            }],
            DrawCommand::Dpad { rect, directions } => vec![Sprite {
                asset: dpad_asset(*directions),
                rect: *rect,
            }],
            DrawCommand::Joystick {
                ring, knob, pressed, ..
            } => vec![
                Sprite {
                    asset: "joystick_range".to_string(),
                    rect: *ring,
                },
                Sprite {
                    asset: pressed_variant("joystick", *pressed),
                    rect: *knob,
                },
            ],
        }
    }
}

fn pressed_variant(base: &str, pressed: bool) -> String {
    if pressed {
        format!("{}_pressed", base)
    } else {
        base.to_string()
    }
}

/// `dpad_idle`, `dpad_up`, `dpad_up_left`, ...
fn dpad_asset(directions: DpadDirections) -> String {
    if directions.is_neutral() {
        return "dpad_idle".to_string();
    }
    let parts: Vec<&str> = [
        (directions.up, "up"),
        (directions.down, "down"),
        (directions.left, "left"),
        (directions.right, "right"),
    ]
    .into_iter()
    .filter_map(|(active, name)| active.then_some(name))
    .collect();
    format!("dpad_{}", parts.join("_"))
}
