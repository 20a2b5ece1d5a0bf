//! Provides [`InteractionMode`], the state of the input state machine, and the [`DragSession`]
//! that lives while a pointer or touch is held.

use bevy_math::DVec2;
use bevy_reflect::prelude::*;

/// What the controller is currently doing with pointer and touch input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum InteractionMode {
    /// No drag is active.
    #[default]
    Idle,
    /// Primary button drag: orbit around the focus.
    Orbit,
    /// Middle button drag. Reserved: dragging produces no motion, wheel and keyboard zoom still
    /// work.
    Dolly,
    /// Secondary button drag: pan the focus in the view plane.
    Pan,
    /// One finger drag: orbit.
    TouchOrbit,
    /// Two finger pinch: dolly toward the pinch center.
    TouchDolly,
    /// Three finger drag: pan.
    TouchPan,
    /// Primary button drag with shift or a WASD key held: turn the camera in place.
    FirstPersonLook,
    /// Reserved for keyboard driven walking. Never entered.
    FirstPersonNavigate,
}

impl InteractionMode {
    /// Returns `true` if the camera is orbiting the focus.
    pub fn is_orbiting(&self) -> bool {
        matches!(self, Self::Orbit | Self::TouchOrbit)
    }

    /// Returns `true` if the focus is being panned.
    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Pan | Self::TouchPan)
    }
}

/// The pointer buttons the state machine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum PointerButton {
    /// Usually the left mouse button.
    Primary,
    /// Usually the wheel button.
    Middle,
    /// Usually the right mouse button.
    Secondary,
}

/// Transient state captured when a drag begins and updated by every move event.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Position of the pointer, or of the first touch, at the last event.
    pub last_position: DVec2,
    /// Size of the input surface when the drag began, in the same units as positions.
    pub surface_size: DVec2,
    /// Distance between the first two touches at the last event, while pinching.
    pub pinch_distance: Option<f64>,
}

impl DragSession {
    /// Start a session at `position`.
    pub fn new(position: DVec2, surface_size: DVec2) -> Self {
        Self {
            last_position: position,
            surface_size,
            pinch_distance: None,
        }
    }

    /// Record a new pointer position, returning how far it moved since the last one, measured
    /// as previous minus current.
    pub fn advance(&mut self, position: DVec2) -> DVec2 {
        let delta = self.last_position - position;
        self.last_position = position;
        delta
    }
}

/// Euclidean distance between the first two touches, if there are at least two.
pub fn pinch_distance(touches: &[DVec2]) -> Option<f64> {
    match touches {
        [a, b, ..] => Some(a.distance(*b)),
        _ => None,
    }
}
