//! Default control placement and first-run seeding
//!
//! Default anchors are expressed in per-mille of the screen extent for the
//! orientation they belong to, so one table fits any resolution.

use tracing::{debug, info};

use super::keys::{self, TOGGLE_ORDER};
use super::store::{PrefValue, PreferenceStore, StoreError};
use crate::geometry::{Orientation, ScreenMetrics};
use crate::input::ButtonType;

/// Source of default control positions
pub trait LayoutDefaults: Send + Sync {
    /// Top-left anchor of `code` in `orientation`, in per-mille of
    /// `(max_x, max_y)` for that orientation
    fn per_mille(&self, code: ButtonType, orientation: Orientation) -> Option<(u16, u16)>;
}

/// Built-in layout for a Switch-style controller
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchLayout;

const LANDSCAPE: [(ButtonType, u16, u16); 15] = [
    (ButtonType::A, 900, 520),
    (ButtonType::B, 845, 640),
    (ButtonType::X, 845, 400),
    (ButtonType::Y, 790, 520),
    (ButtonType::TriggerL, 40, 210),
    (ButtonType::TriggerR, 880, 210),
    (ButtonType::TriggerZl, 40, 20),
    (ButtonType::TriggerZr, 880, 20),
    (ButtonType::Plus, 520, 900),
    (ButtonType::Minus, 440, 900),
    (ButtonType::DpadUp, 170, 700),
    (ButtonType::StickL, 40, 400),
    (ButtonType::StickR, 650, 700),
    (ButtonType::Home, 600, 900),
    (ButtonType::Capture, 360, 900),
];

const PORTRAIT: [(ButtonType, u16, u16); 15] = [
    (ButtonType::A, 820, 720),
    (ButtonType::B, 710, 770),
    (ButtonType::X, 710, 670),
    (ButtonType::Y, 600, 720),
    (ButtonType::TriggerL, 20, 610),
    (ButtonType::TriggerR, 800, 610),
    (ButtonType::TriggerZl, 20, 520),
    (ButtonType::TriggerZr, 800, 520),
    (ButtonType::Plus, 460, 640),
    (ButtonType::Minus, 380, 640),
    (ButtonType::DpadUp, 30, 740),
    (ButtonType::StickL, 60, 870),
    (ButtonType::StickR, 600, 870),
    (ButtonType::Home, 540, 640),
    (ButtonType::Capture, 300, 640),
];

impl LayoutDefaults for SwitchLayout {
    fn per_mille(&self, code: ButtonType, orientation: Orientation) -> Option<(u16, u16)> {
        let table = match orientation {
            Orientation::Landscape => &LANDSCAPE,
            Orientation::Portrait => &PORTRAIT,
        };
        table
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, x, y)| (*x, *y))
    }
}

/// Write default anchors for every control in both orientations
///
/// Buffered only; callers decide when to commit.
pub fn write_default_layout(
    store: &dyn PreferenceStore,
    defaults: &dyn LayoutDefaults,
    screen: ScreenMetrics,
) -> Result<(), StoreError> {
    for orientation in Orientation::all() {
        let (max_x, max_y) = screen.extent_for(*orientation);
        for code in TOGGLE_ORDER {
            let Some((px, py)) = defaults.per_mille(code, *orientation) else {
                continue;
            };
            let (x_key, y_key) = keys::anchor_keys(code, *orientation);
            store.put(&x_key, PrefValue::Float(px as f32 / 1000.0 * max_x))?;
            store.put(&y_key, PrefValue::Float(py as f32 / 1000.0 * max_y))?;
        }
        debug!("Default {} layout written", orientation);
    }
    Ok(())
}

/// Seed default anchors on first run
///
/// Does nothing once `OverlayInit` is set. Commits synchronously so the
/// first rebuild sees the seeded values. Returns whether seeding ran.
pub fn seed_defaults(
    store: &dyn PreferenceStore,
    defaults: &dyn LayoutDefaults,
    screen: ScreenMetrics,
) -> Result<bool, StoreError> {
    if store.get_bool(keys::OVERLAY_INIT, false) {
        return Ok(false);
    }

    write_default_layout(store, defaults, screen)?;
    store.put(keys::OVERLAY_INIT, PrefValue::Bool(true))?;
    store.commit()?;
    info!(
        "🎯 Seeded default overlay layout for {}x{}",
        screen.width, screen.height
    );
    Ok(true)
}
