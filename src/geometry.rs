//! Placement and scale math for overlay controls
//!
//! Every control is a square sized from the smaller screen dimension so the
//! same control has the same physical size in portrait and landscape. The
//! stored anchor is the top-left corner in the current orientation's
//! coordinate space.

use serde::{Deserialize, Serialize};

use crate::input::ButtonType;

/// Ratio between the joystick ring image and its touch bounds
pub const JOYSTICK_OUTER_SCALE: f32 = 1.3;

/// Knob side relative to the joystick bounds side
pub const JOYSTICK_KNOB_RATIO: f32 = 0.5;

/// Default user scale preference (maps to a multiplier of 1.0)
pub const DEFAULT_CONTROL_SCALE: i32 = 50;

/// Screen-space point in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`
    pub fn offset_from(self, origin: Point) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned pixel rectangle; `right`/`bottom` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Square of side `size` with its top-left at (`left`, `top`)
    pub const fn square(left: i32, top: i32, size: i32) -> Self {
        Self::new(left, top, left.saturating_add(size), top.saturating_add(size))
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left as f32 + self.right as f32) / 2.0,
            (self.top as f32 + self.bottom as f32) / 2.0,
        )
    }

    /// Half extents, used to normalise offsets from the centre
    pub fn half_size(&self) -> (f32, f32) {
        (self.width() as f32 / 2.0, self.height() as f32 / 2.0)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.left as f32, self.top as f32)
    }

    /// Hit test with exclusive right/bottom edges
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left as f32
            && p.x < self.right as f32
            && p.y >= self.top as f32
            && p.y < self.bottom as f32
    }

    /// Same size, moved so its top-left is at (`left`, `top`)
    pub fn moved_to(&self, left: i32, top: i32) -> Rect {
        Rect::new(
            left,
            top,
            left.saturating_add(self.width()),
            top.saturating_add(self.height()),
        )
    }

    /// Same size, moved so its centre is at `center`
    pub fn centered_on(&self, center: Point) -> Rect {
        let left = (center.x - self.width() as f32 / 2.0).round() as i32;
        let top = (center.y - self.height() as f32 / 2.0).round() as i32;
        self.moved_to(left, top)
    }

    /// Square of side `size` sharing this rectangle's centre
    pub fn concentric_square(&self, size: i32) -> Rect {
        Rect::square(0, 0, size).centered_on(self.center())
    }
}

/// Screen orientation; portrait and landscape layouts are stored separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Suffix appended to persisted anchor keys
    pub fn suffix(self) -> &'static str {
        match self {
            Orientation::Landscape => "",
            Orientation::Portrait => "-Portrait",
        }
    }

    pub fn all() -> &'static [Orientation] {
        &[Orientation::Landscape, Orientation::Portrait]
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
        }
    }
}

/// Current drawable surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenMetrics {
    pub width: f32,
    pub height: f32,
}

impl ScreenMetrics {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn max_dimension(&self) -> f32 {
        self.width.max(self.height)
    }

    pub fn orientation(&self) -> Orientation {
        if self.height > self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    /// Extent `(max_x, max_y)` of the screen when held in `orientation`,
    /// independent of how it is held right now
    pub fn extent_for(&self, orientation: Orientation) -> (f32, f32) {
        match orientation {
            Orientation::Landscape => (self.max_dimension(), self.min_dimension()),
            Orientation::Portrait => (self.min_dimension(), self.max_dimension()),
        }
    }

    /// Whether `anchor` lies on the screen held in `orientation`
    pub fn holds_anchor(&self, anchor: Point, orientation: Orientation) -> bool {
        let (max_x, max_y) = self.extent_for(orientation);
        anchor.is_finite()
            && (0.0..=max_x).contains(&anchor.x)
            && (0.0..=max_y).contains(&anchor.y)
    }

    /// Top-left for `rect` moved towards (`left`, `top`) but kept fully on
    /// screen; controls larger than the screen pin to the origin
    pub fn clamp_top_left(&self, rect: Rect, left: f32, top: f32) -> (i32, i32) {
        let max_left = (self.width as i32).saturating_sub(rect.width()).max(0);
        let max_top = (self.height as i32).saturating_sub(rect.height()).max(0);
        // `as` saturates and maps NaN to 0
        ((left as i32).clamp(0, max_left), (top as i32).clamp(0, max_top))
    }
}

/// Size class of a control; decides its base scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlClass {
    /// Home, Capture, Plus, Minus
    Utility,
    /// A, B, X, Y and anything else without a dedicated class
    Face,
    /// L, R, ZL, ZR
    Trigger,
    Dpad,
    Joystick,
}

impl ControlClass {
    pub fn of_button(button: ButtonType) -> Self {
        match button {
            ButtonType::Home | ButtonType::Capture | ButtonType::Plus | ButtonType::Minus => {
                ControlClass::Utility
            }
            ButtonType::TriggerL
            | ButtonType::TriggerR
            | ButtonType::TriggerZl
            | ButtonType::TriggerZr => ControlClass::Trigger,
            _ => ControlClass::Face,
        }
    }

    /// Fraction of the smaller screen dimension at multiplier 1.0
    pub fn base_scale(self) -> f32 {
        match self {
            ControlClass::Utility => 0.08,
            ControlClass::Face => 0.11,
            ControlClass::Trigger => 0.18,
            ControlClass::Dpad => 0.23,
            ControlClass::Joystick => 0.275,
        }
    }
}

/// Map the 0..=100 user scale preference to a size multiplier
///
/// Out-of-range preferences are clamped first.
pub fn scale_multiplier(control_scale: i32) -> f32 {
    (control_scale.clamp(0, 100) + 50) as f32 / 100.0
}

/// Side length in whole pixels of a square control
pub fn control_size(base_scale: f32, multiplier: f32, min_dimension: f32) -> i32 {
    (min_dimension * base_scale * multiplier) as i32
}

/// Screen rectangle of a control anchored at `anchor`
pub fn compute_rect(anchor: Point, base_scale: f32, multiplier: f32, min_dimension: f32) -> Rect {
    let size = control_size(base_scale, multiplier, min_dimension);
    Rect::square(anchor.x as i32, anchor.y as i32, size)
}

/// Derived rectangles of a joystick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickGeometry {
    /// Touch bounds; the anchor is its top-left
    pub bounds: Rect,
    /// Drawn ring, larger than the bounds and centred on them
    pub ring: Rect,
    /// Knob at rest
    pub knob: Rect,
}

pub fn joystick_geometry(anchor: Point, multiplier: f32, min_dimension: f32) -> JoystickGeometry {
    let ring_size = control_size(
        ControlClass::Joystick.base_scale(),
        multiplier,
        min_dimension,
    );
    let bounds_size = (ring_size as f32 / JOYSTICK_OUTER_SCALE) as i32;
    let bounds = Rect::square(anchor.x as i32, anchor.y as i32, bounds_size);
    let knob_size = (bounds_size as f32 * JOYSTICK_KNOB_RATIO) as i32;

    JoystickGeometry {
        bounds,
        ring: bounds.concentric_square(ring_size),
        knob: bounds.concentric_square(knob_size),
    }
}
