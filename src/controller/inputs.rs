//! Provides [`InputSurface`], the capability the controller uses to start and stop listening for
//! input, and [`WindowSurface`], its implementation for a Bevy window.

use std::f64::consts::TAU;

use bevy_log::prelude::*;
use bevy_math::DVec2;

use super::{
    component::{CameraControls, DampingPhase},
    keyboard::{KeyState, NavKey},
    motion::{pinch_distance, DragSession, InteractionMode, PointerButton},
};

/// Whether a listener is bound to the input element or to the whole application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerScope {
    /// Only receives input that starts over the element.
    Element,
    /// Receives input anywhere, so drags keep working after the pointer leaves the element.
    Global,
}

/// An input stream the controller can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    /// Pointer button presses.
    PointerDown,
    /// First contact of one or more touches.
    TouchStart,
    /// Scroll wheel and trackpad scrolling.
    Wheel,
    /// Context menu requests, suppressed while the controller is enabled.
    ContextMenu,
    /// Pointer movement during a drag.
    PointerMove,
    /// Touch movement during a drag.
    TouchMove,
    /// Pointer button releases during a drag.
    PointerUp,
    /// Touch releases during a drag.
    TouchEnd,
}

impl Listener {
    /// Listeners held for the whole lifetime of the controller.
    pub const ELEMENT: [Listener; 4] = [
        Listener::PointerDown,
        Listener::TouchStart,
        Listener::Wheel,
        Listener::ContextMenu,
    ];

    /// Listeners held only while a drag session is active.
    pub const DRAG: [Listener; 4] = [
        Listener::PointerMove,
        Listener::TouchMove,
        Listener::PointerUp,
        Listener::TouchEnd,
    ];

    /// Where this listener is attached.
    pub fn scope(&self) -> ListenerScope {
        match self {
            Listener::PointerDown
            | Listener::TouchStart
            | Listener::Wheel
            | Listener::ContextMenu => ListenerScope::Element,
            Listener::PointerMove
            | Listener::TouchMove
            | Listener::PointerUp
            | Listener::TouchEnd => ListenerScope::Global,
        }
    }
}

/// The host side of input subscription.
///
/// The controller guarantees that every [`Listener`] it subscribes is unsubscribed exactly once,
/// either when the drag that needed it ends or when the controller is disposed.
pub trait InputSurface: Send + Sync + 'static {
    /// Start delivering events of this kind to the controller.
    fn subscribe(&mut self, listener: Listener);
    /// Stop delivering events of this kind to the controller.
    fn unsubscribe(&mut self, listener: Listener);
    /// Is this kind of event currently being delivered?
    fn is_subscribed(&self, listener: Listener) -> bool;
}

/// Routes Bevy window input to a controller. The input systems consult it before forwarding each
/// kind of event.
#[derive(Debug, Clone, Default)]
pub struct WindowSurface {
    active: Vec<Listener>,
}

impl WindowSurface {
    /// Listeners currently subscribed, in subscription order.
    pub fn active(&self) -> &[Listener] {
        &self.active
    }
}

impl InputSurface for WindowSurface {
    fn subscribe(&mut self, listener: Listener) {
        if self.active.contains(&listener) {
            warn!("{listener:?} subscribed twice");
            return;
        }
        trace!("subscribed {listener:?} ({:?})", listener.scope());
        self.active.push(listener);
    }

    fn unsubscribe(&mut self, listener: Listener) {
        let before = self.active.len();
        self.active.retain(|l| *l != listener);
        if self.active.len() == before {
            warn!("{listener:?} unsubscribed without a matching subscribe");
        } else {
            trace!("unsubscribed {listener:?}");
        }
    }

    fn is_subscribed(&self, listener: Listener) -> bool {
        self.active.contains(&listener)
    }
}

/// The input state machine. Each handler corresponds to one kind of host input event.
///
/// Positions are in the same units as [`CameraControls::set_viewport_size`], with the origin at the
/// top left of the surface and y pointing down.
impl CameraControls {
    fn accepts_input(&self) -> bool {
        self.enabled && !self.disposed
    }

    /// A pointer button was pressed over the surface.
    pub fn pointer_down(&mut self, button: PointerButton, position: DVec2, keys: &dyn KeyState) {
        if !self.accepts_input() {
            return;
        }
        let mode = match button {
            PointerButton::Primary
                if keys.is_pressed(NavKey::Shift) || keys.any_pressed(&NavKey::WASD) =>
            {
                InteractionMode::FirstPersonLook
            }
            PointerButton::Primary => InteractionMode::Orbit,
            PointerButton::Middle => InteractionMode::Dolly,
            PointerButton::Secondary => InteractionMode::Pan,
        };
        self.enter_mode(mode, position, None);
    }

    /// One or more touches started. `touches` holds every active touch, first touch first.
    pub fn touch_start(&mut self, touches: &[DVec2]) {
        if !self.accepts_input() {
            return;
        }
        let mode = match touches.len() {
            1 => InteractionMode::TouchOrbit,
            2 => InteractionMode::TouchDolly,
            3 => InteractionMode::TouchPan,
            count => {
                trace!("Ignoring touch start with {count} touches");
                return;
            }
        };
        self.enter_mode(mode, touches[0], pinch_distance(touches));
    }

    /// The pointer moved. Only has an effect during a drag.
    pub fn pointer_move(&mut self, position: DVec2) {
        self.drag_to(position, &[]);
    }

    /// Touches moved. `touches` holds every active touch, first touch first.
    pub fn touch_move(&mut self, touches: &[DVec2]) {
        if let Some(first) = touches.first() {
            self.drag_to(*first, touches);
        }
    }

    /// A pointer button was released. Ends the drag even when the controller is disabled.
    pub fn pointer_up(&mut self) {
        self.end_drag();
    }

    /// A touch ended. Ends the drag even when the controller is disabled.
    pub fn touch_end(&mut self) {
        self.end_drag();
    }

    /// The wheel scrolled at `cursor`. Negative deltas zoom in, positive deltas zoom out, by one
    /// step regardless of magnitude. Works in any mode.
    pub fn wheel(&mut self, delta: f64, cursor: DVec2) {
        if !self.accepts_input() || delta == 0.0 || !delta.is_finite() {
            return;
        }
        let Some(ndc) = self.to_ndc(cursor) else {
            warn_once!("Wheel input before the viewport size is known");
            return;
        };
        if delta < 0.0 {
            self.dolly_in(ndc, 1.0);
        } else {
            self.dolly_out(ndc, 1.0);
        }
    }

    /// A context menu was requested over the surface. Returns `true` if the host should suppress
    /// it.
    pub fn context_menu(&self) -> bool {
        self.accepts_input()
    }

    /// Convert a surface position to normalized device coordinates.
    pub fn to_ndc(&self, position: DVec2) -> Option<DVec2> {
        let size = self.viewport;
        (size.x > 0.0 && size.y > 0.0).then(|| {
            DVec2::new(
                position.x / size.x * 2.0 - 1.0,
                -(position.y / size.y) * 2.0 + 1.0,
            )
        })
    }

    fn enter_mode(&mut self, mode: InteractionMode, position: DVec2, pinch: Option<f64>) {
        let previous = std::mem::replace(&mut self.mode, mode);
        if previous != mode {
            debug!("Camera controls {previous:?} -> {mode:?}");
        }
        match self.drag.as_mut() {
            // A second button or finger changes what the drag does, not the session itself.
            Some(drag) => {
                if mode == InteractionMode::TouchDolly {
                    drag.pinch_distance = pinch;
                }
            }
            None => self.start_drag(position, pinch),
        }
    }

    fn start_drag(&mut self, position: DVec2, pinch: Option<f64>) {
        let mut drag = DragSession::new(position, self.viewport);
        if self.mode == InteractionMode::TouchDolly {
            drag.pinch_distance = pinch;
        }
        self.drag = Some(drag);
        self.damping_phase = DampingPhase::Dragging;
        for listener in Listener::DRAG {
            self.surface.subscribe(listener);
        }
        debug!("Drag started at {position} in {:?}", self.mode);
    }

    pub(super) fn end_drag(&mut self) {
        if self.drag.take().is_none() {
            return;
        }
        if self.damping.restore_on_release {
            self.damping_phase = DampingPhase::Settle;
        }
        for listener in Listener::DRAG {
            self.surface.unsubscribe(listener);
        }
        debug!("Drag ended in {:?}", self.mode);
        self.mode = InteractionMode::Idle;
    }

    fn drag_to(&mut self, position: DVec2, touches: &[DVec2]) {
        if !self.accepts_input() {
            return;
        }
        let mode = self.mode;
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let delta = drag.advance(position);
        let size = drag.surface_size;

        match mode {
            InteractionMode::Orbit | InteractionMode::TouchOrbit => {
                let Some(size) = usable_size(size) else {
                    return;
                };
                self.rotate(TAU * delta.x / size.x, TAU * delta.y / size.y, true);
            }
            InteractionMode::Dolly => (),
            InteractionMode::TouchDolly => self.pinch(touches),
            InteractionMode::Pan | InteractionMode::TouchPan => {
                let Some(size) = usable_size(size) else {
                    return;
                };
                let offset = self.camera.position - self.current.focus;
                // Half the field of view spans the center of the screen to its top edge.
                let half_height = offset.length() * (self.lens.fov * 0.5).tan();
                let limit = DVec2::splat(self.pan.max_step);
                let step = (delta * self.pan.speed * half_height / size.y)
                    .min(limit)
                    .max(-limit);
                self.pan(step.x, step.y, true);
            }
            InteractionMode::FirstPersonLook => self.rotate_first_person(delta.x, delta.y),
            InteractionMode::Idle | InteractionMode::FirstPersonNavigate => (),
        }
    }

    fn pinch(&mut self, touches: &[DVec2]) {
        let Some(distance) = pinch_distance(touches) else {
            return;
        };
        let Some(previous) = self
            .drag
            .as_mut()
            .and_then(|drag| drag.pinch_distance.replace(distance))
        else {
            return;
        };
        let Some(center) = self.to_ndc((touches[0] + touches[1]) * 0.5) else {
            return;
        };
        let shrink = previous - distance;
        if shrink > 0.0 {
            self.dolly_out(center, 1.0);
        } else if shrink < 0.0 {
            self.dolly_in(center, 1.0);
        }
    }
}

fn usable_size(size: DVec2) -> Option<DVec2> {
    if size.x > 0.0 && size.y > 0.0 {
        Some(size)
    } else {
        warn_once!("Drag started before the viewport size is known");
        None
    }
}
