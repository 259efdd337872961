//! Directional pad
//!
//! The pointer's offset from the pad centre, normalised by the pad's half
//! size, is mapped to one of nine zones: a central deadzone, four edges and
//! four corners. Zones are angular. With two-direction diagonals enabled a
//! corner is any direction within 22.5° of a diagonal and activates both
//! adjacent directions; otherwise the nearer single direction wins and an
//! exact 45° tie resolves to the vertical direction.
//!
//! Presses only land on the disc drawn inside the bounds; a slide may
//! leave it and keeps tracking.

use tracing::debug;

use super::Control;
use crate::geometry::{Point, Rect};
use crate::input::{ButtonType, PointerId, TouchFrame};

/// Normalised radius below which no direction is active
pub const DPAD_DEADZONE: f32 = 0.35;

/// tan(22.5°): minor/major component ratio at which a diagonal begins
const DIAGONAL_RATIO: f32 = 0.414_213_56;

/// The four binary sub-states of a dpad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DpadDirections {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DpadDirections {
    pub const NEUTRAL: DpadDirections = DpadDirections {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    /// Number of active directions (0, 1 or 2)
    pub fn count(&self) -> usize {
        [self.up, self.down, self.left, self.right]
            .iter()
            .filter(|d| **d)
            .count()
    }

    /// Zone for a normalised offset (screen coordinates, y grows downward)
    pub fn from_offset(dx: f32, dy: f32, two_directions: bool) -> Self {
        let magnitude = (dx * dx + dy * dy).sqrt();
        if !(magnitude >= DPAD_DEADZONE) {
            return Self::NEUTRAL;
        }

        let (ax, ay) = (dx.abs(), dy.abs());
        let diagonal = two_directions && ax.min(ay) >= ax.max(ay) * DIAGONAL_RATIO;
        let vertical = diagonal || ay >= ax;
        let horizontal = diagonal || ax > ay;

        DpadDirections {
            up: vertical && dy < 0.0,
            down: vertical && dy > 0.0,
            left: horizontal && dx < 0.0,
            right: horizontal && dx > 0.0,
        }
    }
}

/// Button codes reported for each direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DpadCodes {
    pub up: ButtonType,
    pub down: ButtonType,
    pub left: ButtonType,
    pub right: ButtonType,
}

impl Default for DpadCodes {
    fn default() -> Self {
        Self {
            up: ButtonType::DpadUp,
            down: ButtonType::DpadDown,
            left: ButtonType::DpadLeft,
            right: ButtonType::DpadRight,
        }
    }
}

/// On-screen directional pad
#[derive(Debug, Clone)]
pub struct DpadControl {
    codes: DpadCodes,
    bounds: Rect,
    owner: Option<PointerId>,
    directions: DpadDirections,
    /// Follow the pointer after the initial press
    slide: bool,
    two_directions: bool,
}

impl DpadControl {
    pub fn new(codes: DpadCodes, bounds: Rect, slide: bool, two_directions: bool) -> Self {
        Self {
            codes,
            bounds,
            owner: None,
            directions: DpadDirections::NEUTRAL,
            slide,
            two_directions,
        }
    }

    pub fn codes(&self) -> DpadCodes {
        self.codes
    }

    pub fn directions(&self) -> DpadDirections {
        self.directions
    }

    pub fn up(&self) -> bool {
        self.directions.up
    }

    pub fn down(&self) -> bool {
        self.directions.down
    }

    pub fn left(&self) -> bool {
        self.directions.left
    }

    pub fn right(&self) -> bool {
        self.directions.right
    }

    /// Directions that differ from `before`, as `(code, pressed)` pairs
    pub fn transitions_from(&self, before: DpadDirections) -> Vec<(ButtonType, bool)> {
        let now = self.directions;
        [
            (self.codes.up, before.up, now.up),
            (self.codes.down, before.down, now.down),
            (self.codes.left, before.left, now.left),
            (self.codes.right, before.right, now.right),
        ]
        .into_iter()
        .filter(|(_, old, new)| old != new)
        .map(|(code, _, new)| (code, new))
        .collect()
    }

    /// Feed one frame; returns true when any direction flipped
    pub fn update(&mut self, frame: &TouchFrame, claimable: bool) -> bool {
        if frame.is_press() {
            let Some(pointer) = frame.action_pointer() else {
                return false;
            };
            if self.owner.is_some() || !claimable || !self.hit_test(pointer.position()) {
                return false;
            }
            debug!("Dpad claimed by pointer {}", pointer.id);
            self.owner = Some(pointer.id);
            return self.track(pointer.position());
        }

        if frame.is_release() {
            return match frame.action_pointer() {
                Some(pointer) if self.owner == Some(pointer.id) => self.release(),
                _ => false,
            };
        }

        if frame.is_move() && self.slide {
            if let Some(pointer) = self.owner.and_then(|id| frame.pointer(id)) {
                return self.track(pointer.position());
            }
        }

        false
    }

    fn track(&mut self, position: Point) -> bool {
        if !position.is_finite() {
            return false;
        }
        let center = self.bounds.center();
        let (half_w, half_h) = self.bounds.half_size();
        let next = if half_w > 0.0 && half_h > 0.0 {
            let (dx, dy) = position.offset_from(center);
            DpadDirections::from_offset(dx / half_w, dy / half_h, self.two_directions)
        } else {
            DpadDirections::NEUTRAL
        };

        let changed = next != self.directions;
        self.directions = next;
        changed
    }
}

impl Control for DpadControl {
    fn anchor_code(&self) -> ButtonType {
        self.codes.up
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Inside the circle inscribed in the bounds
    fn hit_test(&self, point: Point) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }
        let (half_w, half_h) = self.bounds.half_size();
        let (dx, dy) = point.offset_from(self.bounds.center());
        let (nx, ny) = (dx / half_w, dy / half_h);
        nx * nx + ny * ny <= 1.0
    }

    fn owner(&self) -> Option<PointerId> {
        self.owner
    }

    fn release(&mut self) -> bool {
        if let Some(owner) = self.owner.take() {
            debug!("Dpad released by pointer {}", owner);
        }
        let changed = !self.directions.is_neutral();
        self.directions = DpadDirections::NEUTRAL;
        changed
    }

    fn move_to(&mut self, left: i32, top: i32) {
        self.bounds = self.bounds.moved_to(left, top);
    }
}
