//! Mapping between the preview area and emulated screen coordinates, and
//! conversion of mouse input into single-pointer touch frames.

use crate::geometry::{Point, Rect, ScreenMetrics};
use crate::input::{TouchFrame, TouchPointer};

/// Pointer id used for the mouse
pub const MOUSE_POINTER: u32 = 0;

/// Uniform scale from screen pixels into the preview area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    origin: egui::Pos2,
    scale: f32,
}

impl PreviewTransform {
    /// Largest transform that fits `screen` inside `available`, top-left aligned
    pub fn fit(available: egui::Rect, screen: ScreenMetrics) -> Self {
        let scale = (available.width() / screen.width)
            .min(available.height() / screen.height)
            .max(f32::EPSILON);
        Self {
            origin: available.min,
            scale,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_view(&self, p: Point) -> egui::Pos2 {
        egui::pos2(self.origin.x + p.x * self.scale, self.origin.y + p.y * self.scale)
    }

    pub fn rect_to_view(&self, r: Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.to_view(Point::new(r.left as f32, r.top as f32)),
            self.to_view(Point::new(r.right as f32, r.bottom as f32)),
        )
    }

    pub fn to_screen(&self, pos: egui::Pos2) -> Point {
        Point::new(
            (pos.x - self.origin.x) / self.scale,
            (pos.y - self.origin.y) / self.scale,
        )
    }

    /// Preview area covered by the whole screen
    pub fn screen_rect(&self, screen: ScreenMetrics) -> egui::Rect {
        egui::Rect::from_min_size(
            self.origin,
            egui::vec2(screen.width * self.scale, screen.height * self.scale),
        )
    }
}

/// Turns primary-button mouse state into Down/Move/Up frames for pointer 0
#[derive(Debug, Default)]
pub struct MouseTracker {
    last: Option<Point>,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_down(&self) -> bool {
        self.last.is_some()
    }

    /// Feed one UI frame of mouse state
    ///
    /// `position` is in screen coordinates; `inside` tells whether it lies in
    /// the preview. Presses outside the preview are ignored, but a held
    /// pointer keeps tracking after leaving it.
    pub fn update(
        &mut self,
        pressed: bool,
        released: bool,
        position: Option<Point>,
        inside: bool,
    ) -> Option<TouchFrame> {
        match self.last {
            None => {
                let p = position.filter(|_| pressed && inside)?;
                self.last = Some(p);
                Some(TouchFrame::down(MOUSE_POINTER, p.x, p.y))
            }
            Some(last) if released => {
                let p = position.unwrap_or(last);
                self.last = None;
                Some(TouchFrame::up(MOUSE_POINTER, p.x, p.y))
            }
            Some(last) => {
                let p = position.filter(|p| *p != last)?;
                self.last = Some(p);
                Some(TouchFrame::moved(vec![TouchPointer::new(MOUSE_POINTER, p.x, p.y)]))
            }
        }
    }

    /// Forget a held pointer, returning the Cancel frame to send
    pub fn cancel(&mut self) -> Option<TouchFrame> {
        self.last.take().map(|_| TouchFrame::cancel())
    }
}
