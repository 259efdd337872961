//! Input model shared by the overlay and its collaborators
//!
//! Touch frames coming in, gamepad codes and sinks going out.

pub mod codes;
pub mod sink;
pub mod touch;

pub use codes::{ButtonType, StickType};
pub use sink::{InputSink, LoggingSink, RecordingSink, SinkEvent};
pub use touch::{PointerId, TouchAction, TouchFrame, TouchPointer};
