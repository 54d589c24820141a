//! Pointer input normalization for mouse and touch.
//!
//! Hosts feed raw [`PointerInput`] values; everything downstream sees a
//! single [`PointerEvent`] type carrying a phase, a client-space position and
//! the [`ButtonClass`] the event belongs to.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Touch event phases, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Raw pointer input from the host, in client coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerInput {
    MouseDown { position: Point, button: MouseButton },
    MouseMove { position: Point },
    MouseUp { position: Point, button: MouseButton },
    Touch {
        phase: TouchPhase,
        /// Contacts still on the surface after this event.
        touches: Vec<Point>,
        /// Contacts that changed in this event.
        #[serde(default)]
        changed: Vec<Point>,
    },
}

/// Which kind of press a gesture follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonClass {
    /// Left mouse button or a single touch contact.
    Primary,
    /// Middle mouse button or a two-finger touch.
    Secondary,
}

/// Phase of a normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Down,
    Move,
    Up,
}

/// Device-independent pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: Phase,
    /// Client coordinates.
    pub position: Point,
    /// `None` for events not tied to a button class (mouse moves, right
    /// button, three-finger touches).
    pub class: Option<ButtonClass>,
}

impl PointerEvent {
    pub fn new(phase: Phase, position: Point, class: Option<ButtonClass>) -> Self {
        Self {
            phase,
            position,
            class,
        }
    }

    /// Whether this event may drive the move step of a `class` gesture.
    pub fn is_move_for(&self, class: ButtonClass) -> bool {
        self.phase == Phase::Move && self.class.is_none_or(|c| c == class)
    }

    /// Whether this event terminates a `class` gesture.
    pub fn is_stop_for(&self, class: ButtonClass) -> bool {
        self.phase == Phase::Up && self.class == Some(class)
    }

    /// Whether this event starts a `class` gesture.
    pub fn is_start_for(&self, class: ButtonClass) -> bool {
        self.phase == Phase::Down && self.class == Some(class)
    }
}

fn mouse_class(button: MouseButton) -> Option<ButtonClass> {
    match button {
        MouseButton::Left => Some(ButtonClass::Primary),
        MouseButton::Middle => Some(ButtonClass::Secondary),
        MouseButton::Right => None,
    }
}

fn touch_class(contacts: usize) -> Option<ButtonClass> {
    match contacts {
        1 => Some(ButtonClass::Primary),
        2 => Some(ButtonClass::Secondary),
        _ => None,
    }
}

/// Centroid of the contacts; the origin when there are none.
fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    let n = points.len() as f64;
    let (x, y) = points
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    Point::new(x / n, y / n)
}

impl PointerInput {
    /// Normalize into a [`PointerEvent`].
    ///
    /// A touch end classifies by what was lifted: the last contact ends a
    /// primary gesture, going from two contacts to one ends a secondary one.
    /// A touch cancel is treated as an end.
    pub fn normalize(&self) -> PointerEvent {
        match self {
            PointerInput::MouseDown { position, button } => {
                PointerEvent::new(Phase::Down, *position, mouse_class(*button))
            }
            PointerInput::MouseMove { position } => PointerEvent::new(Phase::Move, *position, None),
            PointerInput::MouseUp { position, button } => {
                PointerEvent::new(Phase::Up, *position, mouse_class(*button))
            }
            PointerInput::Touch {
                phase,
                touches,
                changed,
            } => match phase {
                TouchPhase::Start => {
                    PointerEvent::new(Phase::Down, centroid(touches), touch_class(touches.len()))
                }
                TouchPhase::Move => {
                    PointerEvent::new(Phase::Move, centroid(touches), touch_class(touches.len()))
                }
                TouchPhase::End | TouchPhase::Cancel => {
                    let position = if changed.is_empty() {
                        centroid(touches)
                    } else {
                        centroid(changed)
                    };
                    PointerEvent::new(Phase::Up, position, touch_class(touches.len() + 1))
                }
            },
        }
    }
}
