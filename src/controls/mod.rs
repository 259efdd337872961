//! Interactive overlay controls and their touch state machines
//!
//! Each control owns its activation state and the id of the pointer driving
//! it. A control only claims a pointer on a press that lands inside its
//! bounds while it is unowned *and* the dispatcher says the pointer is still
//! claimable; after that it follows that pointer until release.

pub mod button;
pub mod dpad;
pub mod joystick;

pub use button::ButtonControl;
pub use dpad::{DpadControl, DpadDirections};
pub use joystick::JoystickControl;

use crate::geometry::{Point, Rect};
use crate::input::{ButtonType, PointerId};

/// Capabilities shared by every discrete control
pub trait Control {
    /// Code whose orientation-qualified keys hold this control's anchor
    fn anchor_code(&self) -> ButtonType;

    /// Touch bounds
    fn bounds(&self) -> Rect;

    fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Pointer currently driving the control
    fn owner(&self) -> Option<PointerId>;

    /// Drop ownership and return to the neutral state.
    ///
    /// Returns true if the discrete state changed.
    fn release(&mut self) -> bool;

    /// Reposition (edit mode); size is preserved
    fn move_to(&mut self, left: i32, top: i32);
}
