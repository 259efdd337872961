//! Multi-touch frame model
//!
//! A [`TouchFrame`] mirrors what a platform touch listener delivers: one
//! primary action (the pointer at `action_index` went down, moved, or went up)
//! plus the full list of pointers currently in contact, including the one the
//! action refers to.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Platform-assigned identifier of one continuous contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub u32);

impl std::fmt::Display for PointerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Primary action of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchAction {
    /// First pointer touched the screen
    Down,
    /// An additional pointer touched the screen
    PointerDown,
    /// One or more pointers moved
    Move,
    /// Last pointer left the screen
    Up,
    /// A non-last pointer left the screen
    PointerUp,
    /// The gesture was aborted by the platform; every pointer is gone
    Cancel,
}

impl TouchAction {
    pub fn is_press(self) -> bool {
        matches!(self, TouchAction::Down | TouchAction::PointerDown)
    }

    pub fn is_release(self) -> bool {
        matches!(self, TouchAction::Up | TouchAction::PointerUp)
    }
}

/// One pointer sample within a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPointer {
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
}

impl TouchPointer {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id: PointerId(id),
            x,
            y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A single multi-touch event as delivered by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchFrame {
    pub action: TouchAction,
    /// Index into `pointers` of the pointer the action refers to
    #[serde(default)]
    pub action_index: usize,
    pub pointers: Vec<TouchPointer>,
}

impl TouchFrame {
    /// First contact of a gesture
    pub fn down(id: u32, x: f32, y: f32) -> Self {
        Self {
            action: TouchAction::Down,
            action_index: 0,
            pointers: vec![TouchPointer::new(id, x, y)],
        }
    }

    /// Additional contact; `pointers[index]` is the new one
    pub fn pointer_down(pointers: Vec<TouchPointer>, index: usize) -> Self {
        Self {
            action: TouchAction::PointerDown,
            action_index: index,
            pointers,
        }
    }

    /// Movement frame carrying every active pointer
    pub fn moved(pointers: Vec<TouchPointer>) -> Self {
        Self {
            action: TouchAction::Move,
            action_index: 0,
            pointers,
        }
    }

    /// Last contact lifted
    pub fn up(id: u32, x: f32, y: f32) -> Self {
        Self {
            action: TouchAction::Up,
            action_index: 0,
            pointers: vec![TouchPointer::new(id, x, y)],
        }
    }

    /// Non-last contact lifted; `pointers[index]` is the one leaving
    pub fn pointer_up(pointers: Vec<TouchPointer>, index: usize) -> Self {
        Self {
            action: TouchAction::PointerUp,
            action_index: index,
            pointers,
        }
    }

    pub fn cancel() -> Self {
        Self {
            action: TouchAction::Cancel,
            action_index: 0,
            pointers: Vec::new(),
        }
    }

    /// Pointer the primary action refers to
    pub fn action_pointer(&self) -> Option<&TouchPointer> {
        self.pointers.get(self.action_index)
    }

    /// Look up a pointer sample by id
    pub fn pointer(&self, id: PointerId) -> Option<&TouchPointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    /// Whether `id` is still in contact according to this frame
    pub fn contains(&self, id: PointerId) -> bool {
        self.action != TouchAction::Cancel && self.pointer(id).is_some()
    }

    pub fn is_press(&self) -> bool {
        self.action.is_press()
    }

    pub fn is_release(&self) -> bool {
        self.action.is_release()
    }

    pub fn is_move(&self) -> bool {
        self.action == TouchAction::Move
    }
}
