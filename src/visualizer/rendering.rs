//! Painting of the overlay draw list
//!
//! Sprites are stood in for by simple shapes: buttons are rounded boxes with
//! their name, the dpad is a cross with lit arms, sticks are a ring and a knob.

use egui::{Align2, Color32, FontId, Painter, Stroke};

use crate::controls::DpadDirections;
use crate::overlay::DrawCommand;

use super::input::PreviewTransform;

const IDLE_FILL: Color32 = Color32::from_gray(60);
const ACTIVE_FILL: Color32 = Color32::from_rgb(100, 150, 255);
const OUTLINE: Color32 = Color32::from_gray(140);
const EDIT_OUTLINE: Color32 = Color32::from_rgb(255, 200, 100);

/// Paint the emulated screen background
pub fn paint_screen(painter: &Painter, screen_rect: egui::Rect) {
    painter.rect_filled(screen_rect, 4.0, Color32::from_gray(20));
    painter.rect_stroke(screen_rect, 4.0, Stroke::new(1.0, Color32::from_gray(80)));
}

/// Paint every command in list order
pub fn paint_commands(
    painter: &Painter,
    transform: &PreviewTransform,
    commands: &[DrawCommand],
    edit_mode: bool,
) {
    for command in commands {
        paint_command(painter, transform, command);

        if edit_mode {
            painter.rect_stroke(
                transform.rect_to_view(command.rect()),
                0.0,
                Stroke::new(1.5, EDIT_OUTLINE),
            );
        }
    }
}

fn fill_for(active: bool) -> Color32 {
    if active {
        ACTIVE_FILL
    } else {
        IDLE_FILL
    }
}

fn paint_command(painter: &Painter, transform: &PreviewTransform, command: &DrawCommand) {
    match command {
        DrawCommand::Button {
            button,
            rect,
            pressed,
        } => {
            let rect = transform.rect_to_view(*rect);
            let rounding = rect.width().min(rect.height()) * 0.3;
            painter.rect_filled(rect, rounding, fill_for(*pressed));
            painter.rect_stroke(rect, rounding, Stroke::new(1.0, OUTLINE));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                button.name(),
                FontId::proportional((rect.height() * 0.35).clamp(8.0, 18.0)),
                Color32::from_gray(220),
            );
        }
        DrawCommand::Dpad { rect, directions } => {
            paint_dpad(painter, transform.rect_to_view(*rect), *directions);
        }
        DrawCommand::Joystick {
            ring,
            knob,
            pressed,
            ..
        } => {
            let ring = transform.rect_to_view(*ring);
            let knob = transform.rect_to_view(*knob);
            painter.circle_filled(ring.center(), ring.width() / 2.0, Color32::from_gray(30));
            painter.circle_stroke(ring.center(), ring.width() / 2.0, Stroke::new(1.0, OUTLINE));
            painter.circle_filled(knob.center(), knob.width() / 2.0, fill_for(*pressed));
            painter.circle_stroke(knob.center(), knob.width() / 2.0, Stroke::new(1.0, OUTLINE));
        }
    }
}

/// Cross split in thirds; the centre cell is never lit
fn paint_dpad(painter: &Painter, rect: egui::Rect, directions: DpadDirections) {
    let third = rect.width() / 3.0;
    let cell = |col: f32, row: f32| {
        egui::Rect::from_min_size(
            egui::pos2(rect.min.x + col * third, rect.min.y + row * third),
            egui::vec2(third, third),
        )
    };

    let arms = [
        (cell(1.0, 0.0), directions.up),
        (cell(1.0, 2.0), directions.down),
        (cell(0.0, 1.0), directions.left),
        (cell(2.0, 1.0), directions.right),
        (cell(1.0, 1.0), false),
    ];
    for (arm, lit) in arms {
        painter.rect_filled(arm, 2.0, fill_for(lit));
        painter.rect_stroke(arm, 2.0, Stroke::new(1.0, OUTLINE));
    }
}
