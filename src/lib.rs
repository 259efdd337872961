//! Touch Overlay
//!
//! On-screen gamepad controls for touchscreens: turns multi-touch frames into
//! button, stick and touch pass-through events for an emulation core.

pub mod config;
pub mod controls;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod overlay;
pub mod paths;
pub mod visualizer;

pub use input::{ButtonType, InputSink, PointerId, StickType, TouchFrame};
pub use overlay::{DrawCommand, InputOverlay, PointerOwner};
