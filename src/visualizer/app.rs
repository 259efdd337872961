//! Preview window application
//!
//! Renders the overlay's draw list scaled into the window, drives it with the
//! mouse as pointer 0, and lists every event the overlay reports.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::input::{MouseTracker, PreviewTransform};
use super::rendering::{paint_commands, paint_screen};
use crate::config::ConfigWatcher;
use crate::input::RecordingSink;
use crate::layout::PreferenceStore;
use crate::overlay::InputOverlay;

/// Number of event log lines kept
const LOG_CAPACITY: usize = 500;

/// Idle repaint interval, so config reloads are picked up without input
const IDLE_REPAINT: Duration = Duration::from_millis(100);

pub struct OverlayPreviewApp {
    overlay: InputOverlay,
    events: RecordingSink,
    store: Arc<dyn PreferenceStore>,
    watcher: Option<ConfigWatcher>,
    mouse: MouseTracker,
    log: VecDeque<String>,
    edit_mode: bool,
}

impl OverlayPreviewApp {
    /// `events` must share its log with the sink the overlay reports to
    pub fn new(
        overlay: InputOverlay,
        events: RecordingSink,
        store: Arc<dyn PreferenceStore>,
        watcher: Option<ConfigWatcher>,
    ) -> Self {
        Self {
            overlay,
            events,
            store,
            watcher,
            mouse: MouseTracker::new(),
            log: VecDeque::with_capacity(LOG_CAPACITY),
            edit_mode: false,
        }
    }

    /// Apply the latest reloaded config, if any
    fn poll_config(&mut self) {
        let Some(config) = self
            .watcher
            .as_mut()
            .and_then(|w| w.apply_pending(&*self.store))
        else {
            return;
        };
        self.overlay.set_device_id(config.device_id);
        self.overlay.set_screen(config.screen.metrics());
    }

    fn collect_events(&mut self) {
        for event in self.events.drain() {
            if self.log.len() == LOG_CAPACITY {
                self.log.pop_front();
            }
            self.log.push_back(format!(
                "[{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                event
            ));
        }
    }

    fn render_side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading(egui::RichText::new("Overlay Preview").size(18.0).strong());

        let screen = self.overlay.screen();
        let settings = self.overlay.settings();
        ui.label(
            egui::RichText::new(format!(
                "{}x{} ({}), scale {}, device {}",
                screen.width,
                screen.height,
                self.overlay.orientation(),
                settings.control_scale,
                self.overlay.device_id()
            ))
            .color(egui::Color32::from_gray(180))
            .size(12.0),
        );
        if !settings.show {
            ui.label(
                egui::RichText::new("Overlay hidden")
                    .color(egui::Color32::from_rgb(255, 200, 100)),
            );
        }
        if let Some(watcher) = &self.watcher {
            ui.label(
                egui::RichText::new(format!("Watching {}", watcher.path().display()))
                    .color(egui::Color32::from_rgb(150, 150, 200))
                    .size(11.0),
            );
        }

        ui.add_space(8.0);

        if ui.checkbox(&mut self.edit_mode, "Edit mode").changed() {
            self.mouse.cancel();
            self.overlay.set_edit_mode(self.edit_mode);
        }
        ui.horizontal(|ui| {
            if ui.button("Reset placement").clicked() {
                self.mouse.cancel();
                self.overlay.reset_button_placement();
            }
            if ui.button("Refresh").clicked() {
                self.mouse.cancel();
                self.overlay.refresh();
            }
        });

        ui.add_space(8.0);

        ui.label(egui::RichText::new("Pointers").strong());
        let owners = self.overlay.owners();
        if owners.is_empty() {
            ui.label(egui::RichText::new("none").color(egui::Color32::from_gray(120)));
        }
        for (pointer, owner) in owners {
            ui.label(
                egui::RichText::new(format!("{} → {}", pointer, owner))
                    .family(egui::FontFamily::Monospace),
            );
        }

        ui.add_space(8.0);

        egui::CollapsingHeader::new("Draw list").show(ui, |ui| {
            for command in self.overlay.build_frame() {
                for sprite in command.sprites() {
                    let r = sprite.rect;
                    ui.label(
                        egui::RichText::new(format!(
                            "{:<22} [{}, {}, {}, {}]",
                            sprite.asset, r.left, r.top, r.right, r.bottom
                        ))
                        .family(egui::FontFamily::Monospace)
                        .size(11.0),
                    );
                }
            }
        });

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Events").strong());
            if ui.small_button("Clear").clicked() {
                self.log.clear();
            }
        });
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.log {
                    ui.label(
                        egui::RichText::new(line)
                            .family(egui::FontFamily::Monospace)
                            .size(11.0)
                            .color(egui::Color32::from_rgb(150, 200, 255)),
                    );
                }
            });
    }

    fn render_preview(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        let screen = self.overlay.screen();
        let transform = PreviewTransform::fit(response.rect, screen);
        let screen_rect = transform.screen_rect(screen);

        paint_screen(&painter, screen_rect);
        paint_commands(
            &painter,
            &transform,
            &self.overlay.build_frame(),
            self.overlay.is_edit_mode(),
        );

        let (pressed, released, latest) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.latest_pos(),
            )
        });
        let inside = latest.is_some_and(|p| screen_rect.contains(p));
        let position = latest.map(|p| transform.to_screen(p));

        if let Some(frame) = self.mouse.update(pressed, released, position, inside) {
            self.overlay.handle_touch_frame(&frame);
        }
    }
}

impl eframe::App for OverlayPreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_config();

        // Losing focus mid-press never delivers the release
        if !ctx.input(|i| i.focused) {
            if let Some(frame) = self.mouse.cancel() {
                self.overlay.handle_touch_frame(&frame);
            }
        }

        egui::SidePanel::right("preview_side_panel")
            .min_width(280.0)
            .show(ctx, |ui| {
                self.collect_events();
                self.render_side_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_preview(ui);
        });

        if self.overlay.take_redraw_request() || self.mouse.is_down() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }
}
