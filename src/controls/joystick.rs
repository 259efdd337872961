//! Analog stick
//!
//! The axis value is the pointer's offset from the centre of the stick's
//! virtual bounds divided by the half size, with the magnitude clamped to
//! 1.0. There is no deadzone: the response is linear from the centre. A touch
//! that starts inside the small click region around the resting centre also
//! holds the stick button for the duration of the touch.

use tracing::{debug, trace};

use super::Control;
use crate::geometry::{JoystickGeometry, Point, Rect};
use crate::input::{ButtonType, PointerId, StickType, TouchFrame};

/// Click region radius as a fraction of the bounds side
pub const CLICK_REGION_RATIO: f32 = 0.125;

/// On-screen analog stick
#[derive(Debug, Clone)]
pub struct JoystickControl {
    stick: StickType,
    button: ButtonType,
    /// Touch bounds at rest (what the anchor describes)
    bounds: Rect,
    /// Centre the axis is measured from; moves to the press point when
    /// `relative_center` is set
    virtual_center: Point,
    ring: Rect,
    knob_size: i32,
    owner: Option<PointerId>,
    x_axis: f32,
    y_axis: f32,
    clicked: bool,
    relative_center: bool,
}

impl JoystickControl {
    pub fn new(stick: StickType, geometry: JoystickGeometry, relative_center: bool) -> Self {
        Self {
            stick,
            button: stick.click_button(),
            bounds: geometry.bounds,
            virtual_center: geometry.bounds.center(),
            ring: geometry.ring,
            knob_size: geometry.knob.width(),
            owner: None,
            x_axis: 0.0,
            y_axis: 0.0,
            clicked: false,
            relative_center,
        }
    }

    pub fn stick(&self) -> StickType {
        self.stick
    }

    pub fn button(&self) -> ButtonType {
        self.button
    }

    pub fn x_axis(&self) -> f32 {
        self.x_axis
    }

    pub fn y_axis(&self) -> f32 {
        self.y_axis
    }

    pub fn axis(&self) -> (f32, f32) {
        (self.x_axis, self.y_axis)
    }

    /// Stick click sub-state
    pub fn is_clicked(&self) -> bool {
        self.clicked
    }

    /// Whether a pointer is currently driving the stick
    pub fn is_pressed(&self) -> bool {
        self.owner.is_some()
    }

    pub fn ring(&self) -> Rect {
        self.ring
    }

    pub fn virtual_center(&self) -> Point {
        self.virtual_center
    }

    /// Bounds the axis is currently measured against
    pub fn virtual_bounds(&self) -> Rect {
        self.bounds.centered_on(self.virtual_center)
    }

    /// Knob rectangle at the current axis position
    pub fn knob(&self) -> Rect {
        let center = self.virtual_center;
        let (half_w, half_h) = self.bounds.half_size();
        Rect::square(0, 0, self.knob_size).centered_on(Point::new(
            center.x + self.x_axis * half_w,
            center.y + self.y_axis * half_h,
        ))
    }

    fn in_click_region(&self, position: Point) -> bool {
        let (dx, dy) = position.offset_from(self.bounds.center());
        let radius = self.bounds.width() as f32 * CLICK_REGION_RATIO;
        dx * dx + dy * dy <= radius * radius
    }

    /// Feed one frame; returns true when the axis or the click state changed
    pub fn update(&mut self, frame: &TouchFrame, claimable: bool) -> bool {
        if frame.is_press() {
            let Some(pointer) = frame.action_pointer() else {
                return false;
            };
            let position = pointer.position();
            if self.owner.is_some() || !claimable || !self.hit_test(position) {
                return false;
            }
            debug!("Stick {} claimed by pointer {}", self.stick, pointer.id);
            self.owner = Some(pointer.id);
            if self.relative_center {
                self.virtual_center = position;
            }
            let clicked = self.in_click_region(position);
            let click_changed = clicked != self.clicked;
            self.clicked = clicked;
            let axis_changed = self.track(position);
            return click_changed || axis_changed;
        }

        if frame.is_release() {
            return match frame.action_pointer() {
                Some(pointer) if self.owner == Some(pointer.id) => self.release(),
                _ => false,
            };
        }

        if frame.is_move() {
            if let Some(pointer) = self.owner.and_then(|id| frame.pointer(id)) {
                return self.track(pointer.position());
            }
        }

        false
    }

    /// Point the stick at `position`; samples with no finite offset from
    /// the centre leave the axes where they were
    fn track(&mut self, position: Point) -> bool {
        let center = self.virtual_center;
        let (half_w, half_h) = self.bounds.half_size();
        let (x, y) = if half_w > 0.0 && half_h > 0.0 {
            let (dx, dy) = position.offset_from(center);
            let (nx, ny) = (dx / half_w, dy / half_h);
            if !(nx.is_finite() && ny.is_finite()) {
                trace!("Stick {} ignoring sample at ({}, {})", self.stick, position.x, position.y);
                return false;
            }
            clamp_to_unit_circle(nx, ny)
        } else {
            (0.0, 0.0)
        };

        let changed = x != self.x_axis || y != self.y_axis;
        self.x_axis = x;
        self.y_axis = y;
        changed
    }
}

/// Scale `(x, y)` back onto the unit circle when it lies outside it
pub fn clamp_to_unit_circle(x: f32, y: f32) -> (f32, f32) {
    let magnitude = x.hypot(y);
    if magnitude > 1.0 {
        (x / magnitude, y / magnitude)
    } else {
        (x, y)
    }
}

impl Control for JoystickControl {
    fn anchor_code(&self) -> ButtonType {
        self.button
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn owner(&self) -> Option<PointerId> {
        self.owner
    }

    fn release(&mut self) -> bool {
        if let Some(owner) = self.owner.take() {
            debug!("Stick {} released by pointer {}", self.stick, owner);
        }
        let changed = self.clicked || self.x_axis != 0.0 || self.y_axis != 0.0;
        self.x_axis = 0.0;
        self.y_axis = 0.0;
        self.clicked = false;
        self.virtual_center = self.bounds.center();
        changed
    }

    fn move_to(&mut self, left: i32, top: i32) {
        self.bounds = self.bounds.moved_to(left, top);
        self.virtual_center = self.bounds.center();
        self.ring = self.ring.centered_on(self.virtual_center);
    }
}
