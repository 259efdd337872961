//! Binary button

use tracing::debug;

use super::Control;
use crate::geometry::Rect;
use crate::input::{ButtonType, PointerId, TouchFrame};

/// On-screen button: pressed while its owning pointer is down
///
/// Sliding off the button does not release it; only the owning pointer's
/// release (or loss) does.
#[derive(Debug, Clone)]
pub struct ButtonControl {
    button: ButtonType,
    bounds: Rect,
    owner: Option<PointerId>,
    pressed: bool,
}

impl ButtonControl {
    pub fn new(button: ButtonType, bounds: Rect) -> Self {
        Self {
            button,
            bounds,
            owner: None,
            pressed: false,
        }
    }

    pub fn button(&self) -> ButtonType {
        self.button
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed one frame; returns true when the pressed state flipped
    pub fn update(&mut self, frame: &TouchFrame, claimable: bool) -> bool {
        let Some(pointer) = frame.action_pointer() else {
            return false;
        };

        if frame.is_press() {
            if self.owner.is_some() || !claimable || !self.hit_test(pointer.position()) {
                return false;
            }
            debug!("Button {} claimed by pointer {}", self.button, pointer.id);
            self.owner = Some(pointer.id);
            let changed = !self.pressed;
            self.pressed = true;
            return changed;
        }

        if frame.is_release() && self.owner == Some(pointer.id) {
            return self.release();
        }

        false
    }
}

impl Control for ButtonControl {
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
            debug!("Button {} released by pointer {}", self.button, owner);
        }
        std::mem::replace(&mut self.pressed, false)
    }

    fn move_to(&mut self, left: i32, top: i32) {
        self.bounds = self.bounds.moved_to(left, top);
    }
}
