//! Overlay Preview - native window for trying the overlay with a mouse
//!
//! Draws the control layout at the configured screen size and shows the
//! events the overlay would send to the core.

mod app;
pub mod input;
mod rendering;

pub use app::OverlayPreviewApp;

/// Open the preview window
///
/// Blocks until the window is closed.
pub fn run_visualizer(app: OverlayPreviewApp) -> anyhow::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Touch Overlay - Preview")
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Touch Overlay Preview",
        native_options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Preview window failed: {}", e))
}
