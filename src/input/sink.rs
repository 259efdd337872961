//! Emulation input sinks
//!
//! The overlay never talks to the core directly; it reports discrete events
//! to an [`InputSink`]. Methods take `&self` so a sink can be shared behind an
//! `Arc`; implementations use interior mutability for their own state.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::codes::{ButtonType, StickType};
use super::touch::PointerId;

/// Receiver of the discrete events produced by the overlay
pub trait InputSink: Send + Sync {
    /// A gamepad button changed state
    fn on_button_event(&self, device: i32, button: ButtonType, pressed: bool);

    /// A stick moved; both axes are in [-1.0, 1.0]
    fn on_axis_event(&self, device: i32, stick: StickType, x: f32, y: f32);

    /// A pass-through pointer touched the emulated touchscreen
    fn on_touch_pressed(&self, pointer: PointerId, x: f32, y: f32);

    /// A pass-through pointer moved
    fn on_touch_moved(&self, pointer: PointerId, x: f32, y: f32);

    /// A pass-through pointer left the emulated touchscreen
    fn on_touch_released(&self, pointer: PointerId);
}

/// One call made on a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkEvent {
    Button {
        device: i32,
        button: ButtonType,
        pressed: bool,
    },
    Axis {
        device: i32,
        stick: StickType,
        x: f32,
        y: f32,
    },
    TouchPressed {
        pointer: PointerId,
        x: f32,
        y: f32,
    },
    TouchMoved {
        pointer: PointerId,
        x: f32,
        y: f32,
    },
    TouchReleased {
        pointer: PointerId,
    },
}

impl std::fmt::Display for SinkEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkEvent::Button {
                device,
                button,
                pressed,
            } => write!(
                f,
                "dev{} button {} {}",
                device,
                button,
                if *pressed { "pressed" } else { "released" }
            ),
            SinkEvent::Axis { device, stick, x, y } => {
                write!(f, "dev{} {} ({:.3}, {:.3})", device, stick, x, y)
            }
            SinkEvent::TouchPressed { pointer, x, y } => {
                write!(f, "touch {} pressed at ({:.0}, {:.0})", pointer, x, y)
            }
            SinkEvent::TouchMoved { pointer, x, y } => {
                write!(f, "touch {} moved to ({:.0}, {:.0})", pointer, x, y)
            }
            SinkEvent::TouchReleased { pointer } => write!(f, "touch {} released", pointer),
        }
    }
}

/// Sink that records every call in a shared log
///
/// Cloning yields another handle to the same log, so a test (or the preview
/// window) can keep one handle while the overlay owns the other.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: SinkEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Remove and return the recorded events
    pub fn drain(&self) -> Vec<SinkEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }

    /// Recorded button events as `(button, pressed)` pairs
    pub fn button_events(&self) -> Vec<(ButtonType, bool)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Button {
                    button, pressed, ..
                } => Some((button, pressed)),
                _ => None,
            })
            .collect()
    }

    /// Most recent axis value reported for a stick
    pub fn last_axis(&self, stick: StickType) -> Option<(f32, f32)> {
        self.events().into_iter().rev().find_map(|e| match e {
            SinkEvent::Axis { stick: s, x, y, .. } if s == stick => Some((x, y)),
            _ => None,
        })
    }
}

impl InputSink for RecordingSink {
    fn on_button_event(&self, device: i32, button: ButtonType, pressed: bool) {
        self.push(SinkEvent::Button {
            device,
            button,
            pressed,
        });
    }

    fn on_axis_event(&self, device: i32, stick: StickType, x: f32, y: f32) {
        self.push(SinkEvent::Axis { device, stick, x, y });
    }

    fn on_touch_pressed(&self, pointer: PointerId, x: f32, y: f32) {
        self.push(SinkEvent::TouchPressed { pointer, x, y });
    }

    fn on_touch_moved(&self, pointer: PointerId, x: f32, y: f32) {
        self.push(SinkEvent::TouchMoved { pointer, x, y });
    }

    fn on_touch_released(&self, pointer: PointerId) {
        self.push(SinkEvent::TouchReleased { pointer });
    }
}

/// Sink that logs every event, for running without a core attached
#[derive(Default)]
pub struct LoggingSink {
    event_count: AtomicU64,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::Relaxed)
    }

    fn log(&self, event: SinkEvent) {
        let n = self.event_count.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            "🎮 [{}] {} [event #{}]",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            event,
            n
        );
        debug!(event = ?event, "LoggingSink event");
    }
}

impl InputSink for LoggingSink {
    fn on_button_event(&self, device: i32, button: ButtonType, pressed: bool) {
        self.log(SinkEvent::Button {
            device,
            button,
            pressed,
        });
    }

    fn on_axis_event(&self, device: i32, stick: StickType, x: f32, y: f32) {
        self.log(SinkEvent::Axis { device, stick, x, y });
    }

    fn on_touch_pressed(&self, pointer: PointerId, x: f32, y: f32) {
        self.log(SinkEvent::TouchPressed { pointer, x, y });
    }

    fn on_touch_moved(&self, pointer: PointerId, x: f32, y: f32) {
        self.log(SinkEvent::TouchMoved { pointer, x, y });
    }

    fn on_touch_released(&self, pointer: PointerId) {
        self.log(SinkEvent::TouchReleased { pointer });
    }
}
