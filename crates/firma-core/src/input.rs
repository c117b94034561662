//! Input abstraction layer.
//!
//! Normalizes mouse and touch events into a unified `InputEvent` enum
//! consumed by the signature pad. Coordinates stay in client space; the pad
//! maps them against the surface box it measured last.

use kurbo::Point;
use smallvec::SmallVec;

/// Which device produced a sample. Touch samples carry the platform's
/// touch identifier so a stroke can follow the finger that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch { id: i32 },
}

/// One pointer position in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub client: Point,
    pub source: PointerSource,
}

impl PointerSample {
    pub fn mouse(client_x: f64, client_y: f64) -> Self {
        Self {
            client: Point::new(client_x, client_y),
            source: PointerSource::Mouse,
        }
    }

    pub fn touch(id: i32, client_x: f64, client_y: f64) -> Self {
        Self {
            client: Point::new(client_x, client_y),
            source: PointerSource::Touch { id },
        }
    }
}

/// A single entry of a `TouchList`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub id: i32,
    pub client_x: f64,
    pub client_y: f64,
}

impl Touch {
    pub fn sample(&self) -> PointerSample {
        PointerSample::touch(self.id, self.client_x, self.client_y)
    }
}

/// Touch lists are almost always one or two fingers long.
pub type TouchList = SmallVec<[Touch; 2]>;

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    Down(PointerSample),

    /// Pointer moved (mouse move, touch move).
    Move(PointerSample),

    /// Pointer released (mouse up, or touch end for the given finger).
    Up(PointerSource),

    /// Mouse left the surface.
    Leave,

    /// Touch cancelled by the platform.
    Cancel,
}

impl InputEvent {
    /// Build a `Down` from a `touchstart` list. Only the first active touch
    /// counts; returns `None` for an empty list.
    pub fn from_touch_start(touches: &[Touch]) -> Option<Self> {
        touches.first().map(|t| Self::Down(t.sample()))
    }

    /// Build a `Move` from a `touchmove` list, following the touch with the
    /// given identity. Falls back to the first touch when no identity is known.
    pub fn from_touch_move(touches: &[Touch], active: Option<i32>) -> Option<Self> {
        let touch = match active {
            Some(id) => find_touch(touches, id),
            None => touches.first(),
        };
        touch.map(|t| Self::Move(t.sample()))
    }

    /// Extract the sample if this event carries a position.
    pub fn sample(&self) -> Option<&PointerSample> {
        match self {
            Self::Down(s) | Self::Move(s) => Some(s),
            _ => None,
        }
    }
}

/// Look up a touch by identifier.
pub fn find_touch(touches: &[Touch], id: i32) -> Option<&Touch> {
    touches.iter().find(|t| t.id == id)
}
