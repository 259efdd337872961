//! Raw touch pass-through for pointers no control claimed

use std::collections::BTreeSet;

use tracing::debug;

use crate::input::{InputSink, PointerId, TouchFrame};

/// Pointers currently forwarded to the emulated touchscreen
///
/// Only pointers the surface reported as pressed are ever reported as moved
/// or released, so a pointer driving a control never leaks a touch release.
#[derive(Debug, Default)]
pub struct TouchSurface {
    owned: BTreeSet<PointerId>,
}

impl TouchSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owns(&self, pointer: PointerId) -> bool {
        self.owned.contains(&pointer)
    }

    pub fn pointers(&self) -> impl Iterator<Item = PointerId> + '_ {
        self.owned.iter().copied()
    }

    /// Forward one frame; `claimed` says whether a pointer belongs to a
    /// discrete control
    pub fn route(
        &mut self,
        frame: &TouchFrame,
        claimed: impl Fn(PointerId) -> bool,
        sink: &dyn InputSink,
    ) {
        if frame.is_press() {
            if let Some(pointer) = frame.action_pointer() {
                if !claimed(pointer.id) && self.owned.insert(pointer.id) {
                    debug!("Touch surface took pointer {}", pointer.id);
                    sink.on_touch_pressed(pointer.id, pointer.x, pointer.y);
                }
            }
        } else if frame.is_release() {
            if let Some(pointer) = frame.action_pointer() {
                if self.owned.remove(&pointer.id) {
                    sink.on_touch_released(pointer.id);
                }
            }
        } else if frame.is_move() {
            for pointer in frame.pointers.iter().filter(|p| self.owned.contains(&p.id)) {
                sink.on_touch_moved(pointer.id, pointer.x, pointer.y);
            }
        }
    }

    /// Release `pointer` if owned; returns whether it was
    pub fn release(&mut self, pointer: PointerId, sink: &dyn InputSink) -> bool {
        if !self.owned.remove(&pointer) {
            return false;
        }
        debug!("Touch surface lost pointer {}", pointer);
        sink.on_touch_released(pointer);
        true
    }

    pub fn release_all(&mut self, sink: &dyn InputSink) {
        for pointer in std::mem::take(&mut self.owned) {
            sink.on_touch_released(pointer);
        }
    }
}
