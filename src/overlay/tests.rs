//! Tests for the overlay dispatch loop

use super::*;
use crate::controls::DpadDirections;
use crate::geometry::Rect;
use crate::input::{RecordingSink, SinkEvent, TouchPointer};
use crate::layout::keys::{self, TOGGLE_ORDER};
use crate::layout::{MemoryStore, PrefValue};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Landscape, min dimension 1000: face 110px, trigger 180px, utility 80px,
// dpad 230px, stick bounds 211px
const SCREEN: ScreenMetrics = ScreenMetrics::new(2000.0, 1000.0);

/// Store with only `controls` enabled, anchored where given
fn store_with(controls: &[(ButtonType, f32, f32)]) -> MemoryStore {
    let store = MemoryStore::new();
    store.put(keys::OVERLAY_INIT, PrefValue::Bool(true)).unwrap();
    for (i, code) in TOGGLE_ORDER.iter().enumerate() {
        let enabled = controls.iter().any(|(c, _, _)| c == code);
        store
            .put(&keys::toggle_key(i), PrefValue::Bool(enabled))
            .unwrap();
    }
    for (code, x, y) in controls {
        layout::save_anchor(&store, *code, Orientation::Landscape, Point::new(*x, *y)).unwrap();
    }
    store
}

fn overlay_with(store: &MemoryStore) -> (InputOverlay, RecordingSink) {
    let sink = RecordingSink::new();
    let overlay = InputOverlay::new(Arc::new(store.clone()), Arc::new(sink.clone()), SCREEN);
    sink.drain();
    (overlay, sink)
}

fn fixture(controls: &[(ButtonType, f32, f32)]) -> (InputOverlay, RecordingSink, MemoryStore) {
    let store = store_with(controls);
    let (overlay, sink) = overlay_with(&store);
    (overlay, sink, store)
}

#[test]
fn test_default_layout_seeded_on_construction() {
    let store = MemoryStore::new();
    let (overlay, _sink) = overlay_with(&store);

    assert!(store.get_bool(keys::OVERLAY_INIT, false));
    assert_eq!(overlay.buttons().len(), 12);
    assert_eq!(overlay.dpads().len(), 1);
    assert_eq!(overlay.joysticks().len(), 2);

    let a = overlay.button(ButtonType::A).unwrap();
    assert_eq!(a.bounds().left, store.get_f32("0-X", -1.0) as i32);
    assert_eq!(a.bounds().top, store.get_f32("0-Y", -1.0) as i32);
    assert!(store.get("0-Portrait-X").is_some());
}

#[test]
fn test_seeding_runs_once_across_rebuilds() {
    let store = MemoryStore::new();
    let (mut overlay, _sink) = overlay_with(&store);

    store.put("0-X", PrefValue::Float(42.0)).unwrap();
    overlay.refresh();
    assert_eq!(store.get_f32("0-X", 0.0), 42.0);
    assert_eq!(overlay.button(ButtonType::A).unwrap().bounds().left, 42);

    // A second overlay on the same store does not reseed either
    let (overlay, _sink) = overlay_with(&store);
    assert_eq!(overlay.button(ButtonType::A).unwrap().bounds().left, 42);
}

#[test]
fn test_button_press_and_release() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::A, 100.0, 100.0)]);
    assert_eq!(
        overlay.button(ButtonType::A).unwrap().bounds(),
        Rect::new(100, 100, 210, 210)
    );

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    assert_eq!(
        sink.events(),
        vec![SinkEvent::Button {
            device: 0,
            button: ButtonType::A,
            pressed: true
        }]
    );
    assert!(overlay.is_pointer_consumed(PointerId(0)));

    overlay.handle_touch_frame(&TouchFrame::up(0, 150.0, 150.0));
    assert_eq!(
        sink.button_events(),
        vec![(ButtonType::A, true), (ButtonType::A, false)]
    );
    assert!(!overlay.is_pointer_consumed(PointerId(0)));
}

#[test]
fn test_device_id_is_reported() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::B, 100.0, 100.0)]);
    overlay.set_device_id(3);
    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    assert_eq!(
        sink.events(),
        vec![SinkEvent::Button {
            device: 3,
            button: ButtonType::B,
            pressed: true
        }]
    );
}

#[test]
fn test_button_beats_overlapping_dpad() {
    // Dpad covers 100..330; A covers 150..260 on top of it
    let (mut overlay, sink, _) = fixture(&[
        (ButtonType::A, 150.0, 150.0),
        (ButtonType::DpadUp, 100.0, 100.0),
    ]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 200.0, 160.0));
    assert_eq!(overlay.pointer_owner(PointerId(0)), Some(PointerOwner::Button(ButtonType::A)));
    assert_eq!(overlay.dpads()[0].owner(), None);

    // Sliding over the dpad area does not hand the pointer over
    let moved = TouchFrame::moved(vec![TouchPointer::new(0, 110.0, 215.0)]);
    overlay.handle_touch_frame(&moved);
    assert!(overlay.dpads()[0].directions().is_neutral());
    assert_eq!(sink.button_events(), vec![(ButtonType::A, true)]);
}

#[test]
fn test_overlapping_buttons_first_in_arena_wins() {
    let (mut overlay, sink, _) = fixture(&[
        (ButtonType::A, 100.0, 100.0),
        (ButtonType::B, 120.0, 120.0),
    ]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    assert_eq!(sink.button_events(), vec![(ButtonType::A, true)]);
    assert!(!overlay.button(ButtonType::B).unwrap().is_pressed());
}

#[test]
fn test_multi_touch_independent_buttons() {
    let (mut overlay, sink, _) = fixture(&[
        (ButtonType::A, 100.0, 100.0),
        (ButtonType::B, 400.0, 100.0),
    ]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    overlay.handle_touch_frame(&TouchFrame::pointer_down(
        vec![
            TouchPointer::new(0, 150.0, 150.0),
            TouchPointer::new(1, 450.0, 150.0),
        ],
        1,
    ));
    overlay.handle_touch_frame(&TouchFrame::pointer_up(
        vec![
            TouchPointer::new(0, 150.0, 150.0),
            TouchPointer::new(1, 450.0, 150.0),
        ],
        0,
    ));

    assert_eq!(
        sink.button_events(),
        vec![
            (ButtonType::A, true),
            (ButtonType::B, true),
            (ButtonType::A, false)
        ]
    );
    assert!(overlay.button(ButtonType::B).unwrap().is_pressed());
}

#[test]
fn test_dpad_slide_reports_flipped_directions() {
    // Centre (215, 215), half size 115
    let (mut overlay, sink, _) = fixture(&[(ButtonType::DpadUp, 100.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 215.0, 120.0));
    let moved = TouchFrame::moved(vec![TouchPointer::new(0, 120.0, 215.0)]);
    overlay.handle_touch_frame(&moved);
    overlay.handle_touch_frame(&TouchFrame::up(0, 120.0, 215.0));

    assert_eq!(
        sink.button_events(),
        vec![
            (ButtonType::DpadUp, true),
            (ButtonType::DpadUp, false),
            (ButtonType::DpadLeft, true),
            (ButtonType::DpadLeft, false),
        ]
    );
}

#[test]
fn test_dpad_corner_passes_through() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::DpadUp, 100.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 105.0, 105.0));
    assert_eq!(overlay.pointer_owner(PointerId(0)), Some(PointerOwner::Surface));
    assert_eq!(overlay.dpads()[0].owner(), None);
    assert!(sink.button_events().is_empty());
}

#[test]
fn test_dpad_diagonal_modes() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::DpadUp, 100.0, 100.0)]);
    overlay.handle_touch_frame(&TouchFrame::down(0, 295.0, 135.0));
    assert_eq!(
        sink.button_events(),
        vec![(ButtonType::DpadUp, true), (ButtonType::DpadRight, true)]
    );

    let store = store_with(&[(ButtonType::DpadUp, 100.0, 100.0)]);
    store
        .put(keys::DPAD_TWO_DIRECTIONS, PrefValue::Bool(false))
        .unwrap();
    let (mut overlay, sink) = overlay_with(&store);
    overlay.handle_touch_frame(&TouchFrame::down(0, 295.0, 135.0));
    assert_eq!(sink.button_events(), vec![(ButtonType::DpadUp, true)]);
}

#[test]
fn test_dpad_slide_disabled() {
    let store = store_with(&[(ButtonType::DpadUp, 100.0, 100.0)]);
    store.put(keys::DPAD_SLIDE, PrefValue::Bool(false)).unwrap();
    let (mut overlay, sink) = overlay_with(&store);

    overlay.handle_touch_frame(&TouchFrame::down(0, 215.0, 120.0));
    let moved = TouchFrame::moved(vec![TouchPointer::new(0, 120.0, 215.0)]);
    overlay.handle_touch_frame(&moved);
    assert_eq!(sink.button_events(), vec![(ButtonType::DpadUp, true)]);
}

#[test]
fn test_joystick_axis_and_reset() {
    // Bounds 500..711, centre 605.5, half size 105.5
    let (mut overlay, sink, _) = fixture(&[(ButtonType::StickL, 500.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 658.25, 205.5));
    assert_eq!(sink.last_axis(StickType::Left), Some((0.5, 0.0)));

    let moved = TouchFrame::moved(vec![TouchPointer::new(0, 1900.0, 205.5)]);
    overlay.handle_touch_frame(&moved);
    assert_eq!(sink.last_axis(StickType::Left), Some((1.0, 0.0)));

    overlay.handle_touch_frame(&TouchFrame::up(0, 1900.0, 205.5));
    assert_eq!(sink.last_axis(StickType::Left), Some((0.0, 0.0)));
    // No click was involved
    assert!(sink.button_events().is_empty());
}

#[test]
fn test_joystick_ignores_non_finite_pointer() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::StickL, 500.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 658.25, 205.5));
    let moved = TouchFrame::moved(vec![TouchPointer::new(0, f32::INFINITY, 200.0)]);
    overlay.handle_touch_frame(&moved);
    assert_eq!(sink.last_axis(StickType::Left), Some((0.5, 0.0)));
    assert_eq!(overlay.joystick(StickType::Left).unwrap().owner(), Some(PointerId(0)));

    overlay.handle_touch_frame(&TouchFrame::up(0, f32::INFINITY, 200.0));
    assert_eq!(sink.last_axis(StickType::Left), Some((0.0, 0.0)));
}

#[test]
fn test_joystick_click() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::StickR, 500.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 605.5, 205.5));
    assert_eq!(sink.button_events(), vec![(ButtonType::StickR, true)]);
    assert_eq!(sink.last_axis(StickType::Right), Some((0.0, 0.0)));

    overlay.handle_touch_frame(&TouchFrame::up(0, 605.5, 205.5));
    assert_eq!(
        sink.button_events(),
        vec![(ButtonType::StickR, true), (ButtonType::StickR, false)]
    );
}

#[test]
fn test_unclaimed_pointer_passes_through() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::A, 100.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 1500.0, 800.0));
    overlay.handle_touch_frame(&TouchFrame::up(0, 1500.0, 800.0));

    assert_eq!(
        sink.events(),
        vec![
            SinkEvent::TouchPressed {
                pointer: PointerId(0),
                x: 1500.0,
                y: 800.0
            },
            SinkEvent::TouchReleased {
                pointer: PointerId(0)
            },
        ]
    );
}

#[test]
fn test_pass_through_suppressed_when_touch_disabled() {
    let store = store_with(&[(ButtonType::A, 100.0, 100.0)]);
    store.put(keys::TOUCH_ENABLED, PrefValue::Bool(false)).unwrap();
    let (mut overlay, sink) = overlay_with(&store);

    overlay.handle_touch_frame(&TouchFrame::down(0, 1500.0, 800.0));
    let moved = TouchFrame::moved(vec![TouchPointer::new(0, 1510.0, 810.0)]);
    overlay.handle_touch_frame(&moved);
    overlay.handle_touch_frame(&TouchFrame::up(0, 1510.0, 810.0));

    assert!(sink.events().is_empty());
    // Controls still work
    overlay.handle_touch_frame(&TouchFrame::down(1, 150.0, 150.0));
    assert_eq!(sink.button_events(), vec![(ButtonType::A, true)]);
}

#[test]
fn test_control_pointer_never_reaches_surface() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::A, 100.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    let moved = TouchFrame::moved(vec![TouchPointer::new(0, 1500.0, 800.0)]);
    overlay.handle_touch_frame(&moved);
    overlay.handle_touch_frame(&TouchFrame::up(0, 1500.0, 800.0));

    assert!(sink.events().iter().all(|e| matches!(e, SinkEvent::Button { .. })));
}

#[test]
fn test_lost_pointer_is_released() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::A, 100.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    // Pointer 0 vanished without an up event
    let moved = TouchFrame::moved(vec![TouchPointer::new(1, 1500.0, 800.0)]);
    overlay.handle_touch_frame(&moved);

    assert_eq!(
        sink.button_events(),
        vec![(ButtonType::A, true), (ButtonType::A, false)]
    );
    assert_eq!(overlay.pointer_owner(PointerId(0)), None);
}

#[test]
fn test_cancel_releases_everything() {
    let (mut overlay, sink, _) = fixture(&[
        (ButtonType::A, 100.0, 100.0),
        (ButtonType::StickL, 500.0, 100.0),
    ]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    overlay.handle_touch_frame(&TouchFrame::pointer_down(
        vec![
            TouchPointer::new(0, 150.0, 150.0),
            TouchPointer::new(1, 658.25, 205.5),
        ],
        1,
    ));
    overlay.handle_touch_frame(&TouchFrame::pointer_down(
        vec![
            TouchPointer::new(0, 150.0, 150.0),
            TouchPointer::new(1, 658.25, 205.5),
            TouchPointer::new(2, 1500.0, 800.0),
        ],
        2,
    ));
    sink.drain();

    overlay.handle_touch_frame(&TouchFrame::cancel());

    let events = sink.events();
    assert!(events.contains(&SinkEvent::Button {
        device: 0,
        button: ButtonType::A,
        pressed: false
    }));
    assert_eq!(sink.last_axis(StickType::Left), Some((0.0, 0.0)));
    assert!(events.contains(&SinkEvent::TouchReleased {
        pointer: PointerId(2)
    }));
    assert!(overlay.owners().is_empty());
}

#[test]
fn test_refresh_releases_held_controls() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::A, 100.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    overlay.refresh();

    assert_eq!(
        sink.button_events(),
        vec![(ButtonType::A, true), (ButtonType::A, false)]
    );
    assert!(!overlay.button(ButtonType::A).unwrap().is_pressed());

    // Refresh is idempotent
    let before = overlay.build_frame();
    overlay.refresh();
    assert_eq!(overlay.build_frame(), before);
}

#[test]
fn test_hidden_overlay_builds_nothing() {
    let store = store_with(&[(ButtonType::A, 100.0, 100.0)]);
    store.put(keys::SHOW_OVERLAY, PrefValue::Bool(false)).unwrap();
    let (mut overlay, sink) = overlay_with(&store);

    assert!(overlay.build_frame().is_empty());
    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    assert!(sink.button_events().is_empty());
}

#[test]
fn test_control_scale_changes_sizes() {
    let store = store_with(&[(ButtonType::A, 100.0, 100.0)]);
    let (mut overlay, _sink) = overlay_with(&store);
    assert_eq!(overlay.button(ButtonType::A).unwrap().bounds().width(), 110);

    store.put(keys::CONTROL_SCALE, PrefValue::Int(100)).unwrap();
    overlay.refresh();
    assert_eq!(overlay.button(ButtonType::A).unwrap().bounds().width(), 165);
}

#[test]
fn test_portrait_uses_portrait_anchors() {
    let store = store_with(&[(ButtonType::A, 100.0, 100.0)]);
    layout::save_anchor(
        &store,
        ButtonType::A,
        Orientation::Portrait,
        Point::new(300.0, 1500.0),
    )
    .unwrap();
    let (mut overlay, _sink) = overlay_with(&store);

    overlay.set_screen(ScreenMetrics::new(1000.0, 2000.0));
    assert_eq!(overlay.orientation(), Orientation::Portrait);
    let rect = overlay.button(ButtonType::A).unwrap().bounds();
    assert_eq!((rect.left, rect.top), (300, 1500));
    // Same physical size in both orientations
    assert_eq!(rect.width(), 110);
}

#[test]
fn test_edit_mode_drag_persists_anchor() {
    let (mut overlay, sink, store) = fixture(&[(ButtonType::A, 100.0, 100.0)]);
    overlay.set_edit_mode(true);

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    let moved = TouchFrame::moved(vec![TouchPointer::new(0, 450.0, 350.0)]);
    overlay.handle_touch_frame(&moved);
    assert_eq!(
        overlay.button(ButtonType::A).unwrap().bounds(),
        Rect::new(400, 300, 510, 410)
    );
    overlay.handle_touch_frame(&TouchFrame::up(0, 450.0, 350.0));

    assert_eq!(store.get_f32("0-X", 0.0), 400.0);
    assert_eq!(store.get_f32("0-Y", 0.0), 300.0);
    // Nothing reaches the core while editing
    assert!(sink.events().is_empty());

    // The new position survives a rebuild
    overlay.set_edit_mode(false);
    overlay.refresh();
    assert_eq!(overlay.button(ButtonType::A).unwrap().bounds().left, 400);
}

#[test]
fn test_edit_mode_drags_joystick_by_click_code() {
    let (mut overlay, _sink, store) = fixture(&[(ButtonType::StickL, 500.0, 100.0)]);
    overlay.set_edit_mode(true);

    overlay.handle_touch_frame(&TouchFrame::down(0, 600.0, 200.0));
    let moved = TouchFrame::moved(vec![TouchPointer::new(0, 700.0, 300.0)]);
    overlay.handle_touch_frame(&moved);
    overlay.handle_touch_frame(&TouchFrame::up(0, 700.0, 300.0));

    assert_eq!(store.get_f32("4-X", 0.0), 600.0);
    assert_eq!(store.get_f32("4-Y", 0.0), 200.0);
    let stick = overlay.joystick(StickType::Left).unwrap();
    assert_eq!(stick.ring().center(), stick.bounds().center());
}

#[test]
fn test_edit_mode_drag_stays_on_screen() {
    let (mut overlay, _sink, store) = fixture(&[(ButtonType::A, 100.0, 100.0)]);
    overlay.set_edit_mode(true);

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    let moved = TouchFrame::moved(vec![TouchPointer::new(0, 3.0e9, -3.0e9)]);
    overlay.handle_touch_frame(&moved);
    assert_eq!(
        overlay.button(ButtonType::A).unwrap().bounds(),
        Rect::new(1890, 0, 2000, 110)
    );

    let moved = TouchFrame::moved(vec![TouchPointer::new(0, f32::NAN, f32::INFINITY)]);
    overlay.handle_touch_frame(&moved);
    assert_eq!(
        overlay.button(ButtonType::A).unwrap().bounds(),
        Rect::new(0, 890, 110, 1000)
    );
    overlay.handle_touch_frame(&TouchFrame::up(0, 0.0, 0.0));

    assert_eq!(store.get_f32("0-X", -1.0), 0.0);
    assert_eq!(store.get_f32("0-Y", -1.0), 890.0);
}

#[test]
fn test_off_screen_anchor_rebuilds_at_origin() {
    let (mut overlay, _sink, store) = fixture(&[
        (ButtonType::A, 100.0, 100.0),
        (ButtonType::StickL, 500.0, 100.0),
    ]);

    store.put("0-X", PrefValue::Float(3.0e9)).unwrap();
    store.put("4-Y", PrefValue::Float(f32::NEG_INFINITY)).unwrap();
    overlay.refresh();

    assert_eq!(
        overlay.button(ButtonType::A).unwrap().bounds(),
        Rect::new(0, 0, 110, 110)
    );
    let stick = overlay.joystick(StickType::Left).unwrap();
    assert_eq!((stick.bounds().left, stick.bounds().top), (0, 0));
    // The stored value is left for the user to fix by dragging
    assert_eq!(store.get_f32("0-X", 0.0), 3.0e9);
}

#[test]
fn test_entering_edit_mode_releases_controls() {
    let (mut overlay, sink, _) = fixture(&[(ButtonType::A, 100.0, 100.0)]);

    overlay.handle_touch_frame(&TouchFrame::down(0, 150.0, 150.0));
    overlay.set_edit_mode(true);
    assert!(overlay.is_edit_mode());
    assert_eq!(
        sink.button_events(),
        vec![(ButtonType::A, true), (ButtonType::A, false)]
    );
}

#[test]
fn test_reset_button_placement() {
    let store = MemoryStore::new();
    let (mut overlay, _sink) = overlay_with(&store);
    let seeded = store.get_f32("0-X", 0.0);

    store.put("0-X", PrefValue::Float(5.0)).unwrap();
    overlay.refresh();
    assert_eq!(overlay.button(ButtonType::A).unwrap().bounds().left, 5);

    overlay.reset_button_placement();
    assert_eq!(store.get_f32("0-X", 0.0), seeded);
    assert_eq!(
        overlay.button(ButtonType::A).unwrap().bounds().left,
        seeded as i32
    );
}

#[test]
fn test_redraw_requests() {
    let (mut overlay, _sink, _) = fixture(&[(ButtonType::A, 100.0, 100.0)]);
    assert!(overlay.take_redraw_request());
    assert!(!overlay.take_redraw_request());

    overlay.handle_touch_frame(&TouchFrame::down(0, 1500.0, 800.0));
    assert!(overlay.take_redraw_request());
}

#[test]
fn test_build_frame_order() {
    let store = MemoryStore::new();
    let (overlay, _sink) = overlay_with(&store);

    let kinds: Vec<u8> = overlay
        .build_frame()
        .iter()
        .map(|cmd| match cmd {
            DrawCommand::Button { .. } => 0,
            DrawCommand::Dpad { .. } => 1,
            DrawCommand::Joystick { .. } => 2,
        })
        .collect();
    let mut sorted = kinds.clone();
    sorted.sort();
    assert_eq!(kinds, sorted);
    assert_eq!(kinds.len(), 15);
}

#[test]
fn test_draw_reflects_state() {
    let (mut overlay, _sink, _) = fixture(&[(ButtonType::DpadUp, 100.0, 100.0)]);
    overlay.handle_touch_frame(&TouchFrame::down(0, 215.0, 120.0));

    assert_eq!(
        overlay.build_frame(),
        vec![DrawCommand::Dpad {
            rect: Rect::new(100, 100, 330, 330),
            directions: DpadDirections {
                up: true,
                ..DpadDirections::NEUTRAL
            },
        }]
    );
}

// Random multi-touch sessions over the default layout

#[derive(Debug, Clone)]
enum Op {
    Press(u32, f32, f32),
    Move(u32, f32, f32),
    Release(u32),
    /// Pointer disappears without a release event
    Lose(u32),
    Cancel,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u32..4, 0f32..2000.0, 0f32..1000.0).prop_map(|(id, x, y)| Op::Press(id, x, y)),
        4 => (0u32..4, 0f32..2000.0, 0f32..1000.0).prop_map(|(id, x, y)| Op::Move(id, x, y)),
        3 => (0u32..4).prop_map(Op::Release),
        1 => (0u32..4).prop_map(Op::Lose),
        1 => Just(Op::Cancel),
    ]
}

/// Pointers currently on the glass
#[derive(Default)]
struct Fingers(Vec<TouchPointer>);

impl Fingers {
    fn index(&self, id: u32) -> Option<usize> {
        self.0.iter().position(|p| p.id == PointerId(id))
    }

    fn ids(&self) -> BTreeSet<PointerId> {
        self.0.iter().map(|p| p.id).collect()
    }

    /// Apply `op`; returns the frame it produces, if any
    fn apply(&mut self, op: &Op) -> Option<TouchFrame> {
        match *op {
            Op::Press(id, x, y) => {
                if self.index(id).is_some() {
                    return None;
                }
                self.0.push(TouchPointer::new(id, x, y));
                if self.0.len() == 1 {
                    Some(TouchFrame::down(id, x, y))
                } else {
                    Some(TouchFrame::pointer_down(self.0.clone(), self.0.len() - 1))
                }
            }
            Op::Move(id, x, y) => {
                let i = self.index(id)?;
                self.0[i] = TouchPointer::new(id, x, y);
                Some(TouchFrame::moved(self.0.clone()))
            }
            Op::Release(id) => {
                let i = self.index(id)?;
                let frame = if self.0.len() == 1 {
                    let p = self.0[0];
                    TouchFrame::up(id, p.x, p.y)
                } else {
                    TouchFrame::pointer_up(self.0.clone(), i)
                };
                self.0.remove(i);
                Some(frame)
            }
            Op::Lose(id) => {
                let i = self.index(id)?;
                self.0.remove(i);
                None
            }
            Op::Cancel => {
                self.0.clear();
                Some(TouchFrame::cancel())
            }
        }
    }
}

/// Every press must be followed by a release before the next press
fn assert_paired(events: &[SinkEvent]) -> Result<(), TestCaseError> {
    let mut buttons: HashMap<ButtonType, bool> = HashMap::new();
    let mut touches: BTreeSet<PointerId> = BTreeSet::new();

    for event in events {
        match event {
            SinkEvent::Button {
                button, pressed, ..
            } => {
                let held = buttons.entry(*button).or_insert(false);
                prop_assert_ne!(*held, *pressed, "duplicate transition: {}", event);
                *held = *pressed;
            }
            SinkEvent::Axis { x, y, .. } => {
                prop_assert!((x * x + y * y).sqrt() <= 1.0 + 1e-5, "axis out of range: {}", event);
            }
            SinkEvent::TouchPressed { pointer, .. } => {
                prop_assert!(touches.insert(*pointer), "duplicate touch press: {}", event);
            }
            SinkEvent::TouchMoved { pointer, .. } => {
                prop_assert!(touches.contains(pointer), "move of unpressed touch: {}", event);
            }
            SinkEvent::TouchReleased { pointer } => {
                prop_assert!(touches.remove(pointer), "release of unpressed touch: {}", event);
            }
        }
    }

    prop_assert!(buttons.values().all(|held| !held), "stuck buttons: {:?}", buttons);
    prop_assert!(touches.is_empty(), "stuck touches: {:?}", touches);
    Ok(())
}

proptest! {
    #[test]
    fn prop_ownership_is_exclusive(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (mut overlay, _sink) = overlay_with(&MemoryStore::new());
        let mut fingers = Fingers::default();

        for op in &ops {
            let Some(frame) = fingers.apply(op) else { continue };
            overlay.handle_touch_frame(&frame);

            let owners = overlay.owners();
            let ids: BTreeSet<PointerId> = owners.iter().map(|(id, _)| *id).collect();
            prop_assert_eq!(ids.len(), owners.len(), "pointer owned twice: {:?}", owners);
            prop_assert!(ids.is_subset(&fingers.ids()), "stale owner: {:?}", owners);
        }
    }

    #[test]
    fn prop_presses_and_releases_pair_up(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (mut overlay, sink) = overlay_with(&MemoryStore::new());
        let mut fingers = Fingers::default();

        for op in &ops {
            if let Some(frame) = fingers.apply(op) {
                overlay.handle_touch_frame(&frame);
            }
        }
        overlay.handle_touch_frame(&TouchFrame::cancel());

        assert_paired(&sink.events())?;
    }
}
