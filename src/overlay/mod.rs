//! Overlay surface
//!
//! Owns the control arenas, runs every touch frame through them and reports
//! the resulting discrete events to the [`InputSink`]. The control set is
//! rebuilt wholesale from the [`PreferenceStore`] whenever the screen or the
//! settings change.
//!
//! Dispatch priority is Button, then Dpad, then Joystick; inside a kind the
//! earlier arena entry wins. A pointer that no control claims goes to the
//! [`TouchSurface`] when touch pass-through is enabled.

pub mod draw;
pub mod surface;

#[cfg(test)]
mod tests;

pub use draw::{DrawCommand, Sprite};
pub use surface::TouchSurface;

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::controls::dpad::DpadCodes;
use crate::controls::{ButtonControl, Control, DpadControl, JoystickControl};
use crate::geometry::{
    compute_rect, joystick_geometry, scale_multiplier, ControlClass, Orientation, Point,
    ScreenMetrics,
};
use crate::input::{ButtonType, InputSink, PointerId, StickType, TouchAction, TouchFrame};
use crate::layout::keys::TOGGLE_ORDER;
use crate::layout::{self, LayoutDefaults, OverlaySettings, PreferenceStore, SwitchLayout};

/// Current holder of a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOwner {
    Button(ButtonType),
    Dpad,
    Joystick(StickType),
    Surface,
}

impl std::fmt::Display for PointerOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointerOwner::Button(button) => write!(f, "button {}", button),
            PointerOwner::Dpad => write!(f, "dpad"),
            PointerOwner::Joystick(stick) => write!(f, "{}", stick),
            PointerOwner::Surface => write!(f, "touch surface"),
        }
    }
}

/// Arena position of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlSlot {
    Button(usize),
    Dpad(usize),
    Joystick(usize),
}

/// Edit-mode drag in progress
#[derive(Debug, Clone, Copy)]
struct Grab {
    slot: ControlSlot,
    pointer: PointerId,
    /// Pointer position relative to the control's top-left at grab time
    offset: (f32, f32),
}

/// The on-screen control layer
pub struct InputOverlay {
    store: Arc<dyn PreferenceStore>,
    sink: Arc<dyn InputSink>,
    defaults: Box<dyn LayoutDefaults>,
    screen: ScreenMetrics,
    device_id: i32,
    settings: OverlaySettings,

    buttons: Vec<ButtonControl>,
    dpads: Vec<DpadControl>,
    joysticks: Vec<JoystickControl>,
    surface: TouchSurface,

    edit_mode: bool,
    grab: Option<Grab>,
    redraw_requested: bool,
}

impl InputOverlay {
    /// Create the overlay with the built-in default layout
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        sink: Arc<dyn InputSink>,
        screen: ScreenMetrics,
    ) -> Self {
        Self::with_defaults(store, sink, screen, Box::new(SwitchLayout))
    }

    /// Create the overlay, seeding `defaults` on first run and building the
    /// initial control set
    pub fn with_defaults(
        store: Arc<dyn PreferenceStore>,
        sink: Arc<dyn InputSink>,
        screen: ScreenMetrics,
        defaults: Box<dyn LayoutDefaults>,
    ) -> Self {
        let mut overlay = Self {
            store,
            sink,
            defaults,
            screen,
            device_id: 0,
            settings: OverlaySettings::default(),
            buttons: Vec::new(),
            dpads: Vec::new(),
            joysticks: Vec::new(),
            surface: TouchSurface::new(),
            edit_mode: false,
            grab: None,
            redraw_requested: false,
        };

        if let Err(e) = layout::seed_defaults(&*overlay.store, &*overlay.defaults, screen) {
            warn!("Failed to seed default layout: {}", e);
        }
        overlay.refresh();
        overlay
    }

    pub fn device_id(&self) -> i32 {
        self.device_id
    }

    /// Controller index reported with button and axis events
    pub fn set_device_id(&mut self, device_id: i32) {
        self.device_id = device_id;
    }

    pub fn screen(&self) -> ScreenMetrics {
        self.screen
    }

    pub fn orientation(&self) -> Orientation {
        self.screen.orientation()
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn buttons(&self) -> &[ButtonControl] {
        &self.buttons
    }

    pub fn dpads(&self) -> &[DpadControl] {
        &self.dpads
    }

    pub fn joysticks(&self) -> &[JoystickControl] {
        &self.joysticks
    }

    pub fn button(&self, button: ButtonType) -> Option<&ButtonControl> {
        self.buttons.iter().find(|b| b.button() == button)
    }

    pub fn joystick(&self, stick: StickType) -> Option<&JoystickControl> {
        self.joysticks.iter().find(|j| j.stick() == stick)
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Handle one touch frame
    pub fn handle_touch_frame(&mut self, frame: &TouchFrame) {
        trace!(
            "Touch frame {:?} with {} pointer(s)",
            frame.action,
            frame.pointers.len()
        );
        self.redraw_requested = true;

        if self.edit_mode {
            self.handle_edit_frame(frame);
            return;
        }

        // Owners missing from the frame lost their pointer without a release
        self.release_where(|id| !frame.contains(id));
        if frame.action == TouchAction::Cancel {
            return;
        }

        let action_id = frame.action_pointer().map(|p| p.id);
        let mut claimed = match action_id {
            Some(id) => self.pointer_owner(id).is_some(),
            None => true,
        };
        let took = |owner: Option<PointerId>| action_id.is_some() && owner == action_id;
        let device = self.device_id;
        let sink = &*self.sink;

        for button in &mut self.buttons {
            if button.update(frame, !claimed) {
                sink.on_button_event(device, button.button(), button.is_pressed());
            }
            claimed |= took(button.owner());
        }

        for dpad in &mut self.dpads {
            let before = dpad.directions();
            if dpad.update(frame, !claimed) {
                for (code, pressed) in dpad.transitions_from(before) {
                    sink.on_button_event(device, code, pressed);
                }
            }
            claimed |= took(dpad.owner());
        }

        for stick in &mut self.joysticks {
            let was_clicked = stick.is_clicked();
            if stick.update(frame, !claimed) {
                report_stick(sink, device, stick, was_clicked);
            }
            claimed |= took(stick.owner());
        }

        if self.settings.touch_enabled {
            let (buttons, dpads, joysticks) = (&self.buttons, &self.dpads, &self.joysticks);
            self.surface.route(
                frame,
                |id| control_owner(buttons, dpads, joysticks, id).is_some(),
                sink,
            );
        }
    }

    /// Release every owner whose pointer matches `lost`, reporting the
    /// resulting transitions
    fn release_where(&mut self, lost: impl Fn(PointerId) -> bool) {
        let is_lost = |owner: Option<PointerId>| owner.is_some_and(&lost);
        let device = self.device_id;
        let sink = &*self.sink;

        for button in self.buttons.iter_mut().filter(|b| is_lost(b.owner())) {
            debug!("Releasing button {} (pointer lost)", button.button());
            if button.release() {
                sink.on_button_event(device, button.button(), false);
            }
        }

        for dpad in self.dpads.iter_mut().filter(|d| is_lost(d.owner())) {
            debug!("Releasing dpad (pointer lost)");
            let before = dpad.directions();
            if dpad.release() {
                for (code, pressed) in dpad.transitions_from(before) {
                    sink.on_button_event(device, code, pressed);
                }
            }
        }

        for stick in self.joysticks.iter_mut().filter(|j| is_lost(j.owner())) {
            debug!("Releasing {} (pointer lost)", stick.stick());
            let was_clicked = stick.is_clicked();
            if stick.release() {
                report_stick(sink, device, stick, was_clicked);
            }
        }

        let lost_touches: Vec<PointerId> = self.surface.pointers().filter(|id| lost(*id)).collect();
        for pointer in lost_touches {
            self.surface.release(pointer, sink);
        }
    }

    /// Rebuild the control set from the store
    ///
    /// Anything still held is released through the sink first.
    pub fn refresh(&mut self) {
        self.release_where(|_| true);
        self.grab = None;
        self.buttons.clear();
        self.dpads.clear();
        self.joysticks.clear();

        self.settings = OverlaySettings::load(&*self.store);
        if self.settings.show {
            self.build_controls();
        }
        self.redraw_requested = true;

        info!(
            "🔄 Overlay rebuilt: {} buttons, {} dpad, {} sticks ({}, scale {})",
            self.buttons.len(),
            self.dpads.len(),
            self.joysticks.len(),
            self.orientation(),
            self.settings.control_scale
        );
    }

    fn build_controls(&mut self) {
        let orientation = self.orientation();
        let multiplier = scale_multiplier(self.settings.control_scale);
        let min_dimension = self.screen.min_dimension();

        for code in TOGGLE_ORDER {
            if !self.settings.is_enabled(code) {
                continue;
            }
            let anchor = layout::load_anchor(&*self.store, code, &self.screen, orientation);

            match code {
                ButtonType::DpadUp => {
                    let rect = compute_rect(
                        anchor,
                        ControlClass::Dpad.base_scale(),
                        multiplier,
                        min_dimension,
                    );
                    self.dpads.push(DpadControl::new(
                        DpadCodes::default(),
                        rect,
                        self.settings.dpad_slide,
                        self.settings.dpad_two_directions,
                    ));
                }
                ButtonType::StickL | ButtonType::StickR => {
                    let stick = if code == ButtonType::StickL {
                        StickType::Left
                    } else {
                        StickType::Right
                    };
                    self.joysticks.push(JoystickControl::new(
                        stick,
                        joystick_geometry(anchor, multiplier, min_dimension),
                        self.settings.joystick_relative_center,
                    ));
                }
                _ => {
                    let rect = compute_rect(
                        anchor,
                        ControlClass::of_button(code).base_scale(),
                        multiplier,
                        min_dimension,
                    );
                    self.buttons.push(ButtonControl::new(code, rect));
                }
            }
        }
    }

    /// New screen size or orientation
    pub fn set_screen(&mut self, screen: ScreenMetrics) {
        if screen != self.screen {
            debug!(
                "Screen changed to {}x{} ({})",
                screen.width,
                screen.height,
                screen.orientation()
            );
        }
        self.screen = screen;
        self.refresh();
    }

    /// Enter or leave drag-to-reposition mode
    pub fn set_edit_mode(&mut self, enabled: bool) {
        if self.edit_mode == enabled {
            return;
        }
        self.release_where(|_| true);
        self.grab = None;
        self.edit_mode = enabled;
        self.redraw_requested = true;
        info!(
            "✏️ Edit mode {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Restore default positions in both orientations and rebuild
    pub fn reset_button_placement(&mut self) {
        let result = layout::write_default_layout(&*self.store, &*self.defaults, self.screen)
            .and_then(|_| self.store.commit());
        match result {
            Ok(()) => info!("↩️ Control placement reset to defaults"),
            Err(e) => warn!("Failed to reset control placement: {}", e),
        }
        self.refresh();
    }

    /// Draw list: buttons, then the dpad, then sticks
    pub fn build_frame(&self) -> Vec<DrawCommand> {
        let buttons = self.buttons.iter().map(|b| DrawCommand::Button {
            button: b.button(),
            rect: b.bounds(),
            pressed: b.is_pressed(),
        });
        let dpads = self.dpads.iter().map(|d| DrawCommand::Dpad {
            rect: d.bounds(),
            directions: d.directions(),
        });
        let joysticks = self.joysticks.iter().map(|j| DrawCommand::Joystick {
            stick: j.stick(),
            ring: j.ring(),
            knob: j.knob(),
            pressed: j.is_pressed(),
        });
        buttons.chain(dpads).chain(joysticks).collect()
    }

    /// Consume the pending redraw request
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Whether a discrete control holds `pointer`
    pub fn is_pointer_consumed(&self, pointer: PointerId) -> bool {
        control_owner(&self.buttons, &self.dpads, &self.joysticks, pointer).is_some()
    }

    pub fn pointer_owner(&self, pointer: PointerId) -> Option<PointerOwner> {
        control_owner(&self.buttons, &self.dpads, &self.joysticks, pointer).or_else(|| {
            self.surface
                .owns(pointer)
                .then_some(PointerOwner::Surface)
        })
    }

    /// Every held pointer with its owner, one entry per owner
    pub fn owners(&self) -> Vec<(PointerId, PointerOwner)> {
        let buttons = self
            .buttons
            .iter()
            .filter_map(|b| b.owner().map(|id| (id, PointerOwner::Button(b.button()))));
        let dpads = self
            .dpads
            .iter()
            .filter_map(|d| d.owner().map(|id| (id, PointerOwner::Dpad)));
        let joysticks = self
            .joysticks
            .iter()
            .filter_map(|j| j.owner().map(|id| (id, PointerOwner::Joystick(j.stick()))));
        let surface = self.surface.pointers().map(|id| (id, PointerOwner::Surface));
        buttons.chain(dpads).chain(joysticks).chain(surface).collect()
    }

    fn handle_edit_frame(&mut self, frame: &TouchFrame) {
        match frame.action {
            TouchAction::Down | TouchAction::PointerDown => {
                if self.grab.is_some() {
                    return;
                }
                let Some(pointer) = frame.action_pointer() else {
                    return;
                };
                let position = pointer.position();
                let Some(slot) = self.slot_at(position) else {
                    return;
                };
                let Some(control) = self.control(slot) else {
                    return;
                };
                let offset = position.offset_from(control.bounds().top_left());
                debug!("Grabbed {} with pointer {}", control.anchor_code(), pointer.id);
                self.grab = Some(Grab {
                    slot,
                    pointer: pointer.id,
                    offset,
                });
            }
            TouchAction::Move => {
                let Some(grab) = self.grab else {
                    return;
                };
                let Some(pointer) = frame.pointer(grab.pointer) else {
                    return;
                };
                let screen = self.screen;
                if let Some(control) = self.control_mut(grab.slot) {
                    let (left, top) = screen.clamp_top_left(
                        control.bounds(),
                        pointer.x - grab.offset.0,
                        pointer.y - grab.offset.1,
                    );
                    control.move_to(left, top);
                }
            }
            TouchAction::Up | TouchAction::PointerUp => {
                if let (Some(grab), Some(pointer)) = (self.grab, frame.action_pointer()) {
                    if pointer.id == grab.pointer {
                        self.finish_grab(grab);
                    }
                }
            }
            TouchAction::Cancel => {
                if let Some(grab) = self.grab {
                    self.finish_grab(grab);
                }
            }
        }
    }

    /// Persist the dragged control's anchor for the current orientation
    fn finish_grab(&mut self, grab: Grab) {
        self.grab = None;
        let orientation = self.orientation();
        let Some(control) = self.control(grab.slot) else {
            return;
        };
        let code = control.anchor_code();
        let anchor = control.bounds().top_left();

        match layout::save_anchor(&*self.store, code, orientation, anchor) {
            Ok(()) => info!(
                "📌 Moved {} to ({}, {}) [{}]",
                code, anchor.x, anchor.y, orientation
            ),
            Err(e) => warn!("Failed to save position of {}: {}", code, e),
        }
    }

    /// Topmost control under `position`, in dispatch priority
    fn slot_at(&self, position: Point) -> Option<ControlSlot> {
        self.buttons
            .iter()
            .position(|c| c.hit_test(position))
            .map(ControlSlot::Button)
            .or_else(|| {
                self.dpads
                    .iter()
                    .position(|c| c.hit_test(position))
                    .map(ControlSlot::Dpad)
            })
            .or_else(|| {
                self.joysticks
                    .iter()
                    .position(|c| c.hit_test(position))
                    .map(ControlSlot::Joystick)
            })
    }

    fn control(&self, slot: ControlSlot) -> Option<&dyn Control> {
        match slot {
            ControlSlot::Button(i) => self.buttons.get(i).map(|c| c as &dyn Control),
            ControlSlot::Dpad(i) => self.dpads.get(i).map(|c| c as &dyn Control),
            ControlSlot::Joystick(i) => self.joysticks.get(i).map(|c| c as &dyn Control),
        }
    }

    fn control_mut(&mut self, slot: ControlSlot) -> Option<&mut dyn Control> {
        match slot {
            ControlSlot::Button(i) => self.buttons.get_mut(i).map(|c| c as &mut dyn Control),
            ControlSlot::Dpad(i) => self.dpads.get_mut(i).map(|c| c as &mut dyn Control),
            ControlSlot::Joystick(i) => self.joysticks.get_mut(i).map(|c| c as &mut dyn Control),
        }
    }
}

fn control_owner(
    buttons: &[ButtonControl],
    dpads: &[DpadControl],
    joysticks: &[JoystickControl],
    pointer: PointerId,
) -> Option<PointerOwner> {
    let held = Some(pointer);
    buttons
        .iter()
        .find(|b| b.owner() == held)
        .map(|b| PointerOwner::Button(b.button()))
        .or_else(|| dpads.iter().any(|d| d.owner() == held).then_some(PointerOwner::Dpad))
        .or_else(|| {
            joysticks
                .iter()
                .find(|j| j.owner() == held)
                .map(|j| PointerOwner::Joystick(j.stick()))
        })
}

/// Axis event, plus a click event when the click sub-state flipped
fn report_stick(sink: &dyn InputSink, device: i32, stick: &JoystickControl, was_clicked: bool) {
    let (x, y) = stick.axis();
    sink.on_axis_event(device, stick.stick(), x, y);
    if stick.is_clicked() != was_clicked {
        sink.on_button_event(device, stick.button(), stick.is_clicked());
    }
}
