//! Persisted preference keys

use crate::geometry::Orientation;
use crate::input::ButtonType;

/// Set once default anchors have been written
pub const OVERLAY_INIT: &str = "OverlayInit";
pub const CONTROL_SCALE: &str = "controlScale";
pub const TOUCH_ENABLED: &str = "isTouchEnabled";
pub const SHOW_OVERLAY: &str = "showOverlay";
pub const DPAD_SLIDE: &str = "dpadSlideEnable";
pub const DPAD_TWO_DIRECTIONS: &str = "dpadTwoDirections";
pub const JOYSTICK_REL_CENTER: &str = "joystickRelCenter";

/// Number of toggleable controls
pub const TOGGLE_COUNT: usize = 15;

/// Anchor codes in toggle order: `buttonToggle{i}` enables `TOGGLE_ORDER[i]`
///
/// The dpad is represented by its up code and each stick by its click code.
pub const TOGGLE_ORDER: [ButtonType; TOGGLE_COUNT] = [
    ButtonType::A,
    ButtonType::B,
    ButtonType::X,
    ButtonType::Y,
    ButtonType::TriggerL,
    ButtonType::TriggerR,
    ButtonType::TriggerZl,
    ButtonType::TriggerZr,
    ButtonType::Plus,
    ButtonType::Minus,
    ButtonType::DpadUp,
    ButtonType::StickL,
    ButtonType::StickR,
    ButtonType::Home,
    ButtonType::Capture,
];

pub fn toggle_key(index: usize) -> String {
    format!("buttonToggle{}", index)
}

/// Toggle index of an anchor code, if it has one
pub fn toggle_index(code: ButtonType) -> Option<usize> {
    TOGGLE_ORDER.iter().position(|c| *c == code)
}

/// `(x_key, y_key)` holding the anchor of `code` in `orientation`
pub fn anchor_keys(code: ButtonType, orientation: Orientation) -> (String, String) {
    let base = format!("{}{}", code.code(), orientation.suffix());
    (format!("{}-X", base), format!("{}-Y", base))
}
