//! Persisted overlay layout and settings
//!
//! Everything the overlay needs to rebuild its control set lives in a
//! [`PreferenceStore`]: per-orientation anchors, per-control toggles and a
//! handful of behaviour settings.

pub mod defaults;
pub mod keys;
pub mod snapshot;
pub mod store;

pub use defaults::{seed_defaults, write_default_layout, LayoutDefaults, SwitchLayout};
pub use snapshot::LayoutSnapshot;
pub use store::{MemoryStore, PrefValue, PreferenceStore, SledStore, StoreError};

use crate::geometry::{Orientation, Point, ScreenMetrics, DEFAULT_CONTROL_SCALE};
use crate::input::ButtonType;
use keys::TOGGLE_COUNT;
use tracing::debug;

/// Behaviour settings read on every rebuild
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySettings {
    /// Overlay visible at all
    pub show: bool,
    /// Forward unclaimed pointers as raw touch
    pub touch_enabled: bool,
    /// User scale preference, 0..=100
    pub control_scale: i32,
    pub dpad_slide: bool,
    pub dpad_two_directions: bool,
    pub joystick_relative_center: bool,
    /// Indexed like [`keys::TOGGLE_ORDER`]
    pub toggles: [bool; TOGGLE_COUNT],
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            show: true,
            touch_enabled: true,
            control_scale: DEFAULT_CONTROL_SCALE,
            dpad_slide: true,
            dpad_two_directions: true,
            joystick_relative_center: false,
            toggles: [true; TOGGLE_COUNT],
        }
    }
}

impl OverlaySettings {
    /// Read settings, falling back to defaults for anything missing
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let defaults = Self::default();
        let mut toggles = defaults.toggles;
        for (i, enabled) in toggles.iter_mut().enumerate() {
            *enabled = store.get_bool(&keys::toggle_key(i), true);
        }

        Self {
            show: store.get_bool(keys::SHOW_OVERLAY, defaults.show),
            touch_enabled: store.get_bool(keys::TOUCH_ENABLED, defaults.touch_enabled),
            control_scale: store.get_i32(keys::CONTROL_SCALE, defaults.control_scale),
            dpad_slide: store.get_bool(keys::DPAD_SLIDE, defaults.dpad_slide),
            dpad_two_directions: store
                .get_bool(keys::DPAD_TWO_DIRECTIONS, defaults.dpad_two_directions),
            joystick_relative_center: store
                .get_bool(keys::JOYSTICK_REL_CENTER, defaults.joystick_relative_center),
            toggles,
        }
    }

    /// Whether the control anchored at `code` is enabled
    pub fn is_enabled(&self, code: ButtonType) -> bool {
        keys::toggle_index(code)
            .map(|i| self.toggles[i])
            .unwrap_or(false)
    }
}

/// Stored anchor of `code` in `orientation`
///
/// Missing anchors, and anchors that are not finite or fall off `screen`,
/// read as (0, 0).
pub fn load_anchor(
    store: &dyn PreferenceStore,
    code: ButtonType,
    screen: &ScreenMetrics,
    orientation: Orientation,
) -> Point {
    let (x_key, y_key) = keys::anchor_keys(code, orientation);
    let anchor = Point::new(store.get_f32(&x_key, 0.0), store.get_f32(&y_key, 0.0));
    if screen.holds_anchor(anchor, orientation) {
        anchor
    } else {
        debug!(
            "Ignoring off-screen anchor for {} [{}]: ({}, {})",
            code, orientation, anchor.x, anchor.y
        );
        Point::default()
    }
}

/// Buffer a new anchor for `code` in `orientation`
pub fn save_anchor(
    store: &dyn PreferenceStore,
    code: ButtonType,
    orientation: Orientation,
    anchor: Point,
) -> Result<(), StoreError> {
    let (x_key, y_key) = keys::anchor_keys(code, orientation);
    store.put(&x_key, PrefValue::Float(anchor.x))?;
    store.put(&y_key, PrefValue::Float(anchor.y))
}
