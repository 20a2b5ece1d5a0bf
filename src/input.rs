//! Forwards Bevy input to every [`CameraControls`] in the world.
//!
//! Each kind of event is only forwarded while the controller is subscribed to it, which is how the
//! drag-only move and release listeners are honored.

use bevy_ecs::prelude::*;
use bevy_input::{
    keyboard::KeyCode,
    mouse::{MouseButton, MouseScrollUnit, MouseWheel},
    touch::{Touch, Touches},
    ButtonInput,
};
use bevy_math::{DVec2, Vec2};
use bevy_render::prelude::*;
use bevy_window::{CursorMoved, PrimaryWindow, Window};

use crate::controller::{component::CameraControls, inputs::Listener, motion::PointerButton};

/// Pixels a single wheel line is worth, used to put line and pixel scrolling on the same scale.
const PIXELS_PER_LINE: f64 = 40.0;

const BUTTONS: [(MouseButton, PointerButton); 3] = [
    (MouseButton::Left, PointerButton::Primary),
    (MouseButton::Middle, PointerButton::Middle),
    (MouseButton::Right, PointerButton::Secondary),
];

/// Feed this frame's mouse, touch, and wheel input into every active controller.
pub fn forward_inputs(
    mut cameras: Query<(&mut CameraControls, Option<&Camera>)>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    touches: Res<Touches>,
    mut wheel: EventReader<MouseWheel>,
    mut cursor_moved: EventReader<CursorMoved>,
) {
    let window = windows.single().ok();
    let cursor = window
        .and_then(Window::cursor_position)
        .map(|cursor| cursor.as_dvec2());
    let window_size = window.map(|w| DVec2::new(w.width() as f64, w.height() as f64));

    let moves: Vec<DVec2> = cursor_moved
        .read()
        .map(|moved| moved.position.as_dvec2())
        .collect();
    let scrolls: Vec<f64> = wheel
        .read()
        .map(|scroll| match scroll.unit {
            // Bevy reports scrolling up as positive, the controller zooms in on negative deltas.
            MouseScrollUnit::Line => -scroll.y as f64 * PIXELS_PER_LINE,
            MouseScrollUnit::Pixel => -scroll.y as f64,
        })
        .collect();

    let mut active: Vec<&Touch> = touches.iter().collect();
    active.sort_by_key(|touch| touch.id());
    let touch_positions: Vec<DVec2> = active
        .iter()
        .map(|touch| touch.position().as_dvec2())
        .collect();
    let touch_started = touches.iter_just_pressed().next().is_some();
    let touch_moved = active.iter().any(|touch| touch.delta() != Vec2::ZERO);
    let touch_ended = touches.iter_just_released().next().is_some()
        || touches.iter_just_canceled().next().is_some();

    for (mut controls, camera) in cameras.iter_mut() {
        if camera.is_some_and(|camera| !camera.is_active) {
            continue;
        }
        let viewport = camera
            .and_then(Camera::logical_viewport_size)
            .map(|size| size.as_dvec2())
            .or(window_size);
        if let Some(size) = viewport {
            if controls.viewport_size() != size {
                controls.set_viewport_size(size);
            }
        }

        if let Some(cursor) = cursor {
            if controls.is_listening(Listener::PointerDown) {
                for (button, pointer) in BUTTONS {
                    if mouse.just_pressed(button) {
                        controls.pointer_down(pointer, cursor, &*keys);
                    }
                }
            }
            if controls.is_listening(Listener::Wheel) {
                for delta in &scrolls {
                    controls.wheel(*delta, cursor);
                }
            }
        }
        if controls.is_listening(Listener::PointerMove) {
            for position in &moves {
                controls.pointer_move(*position);
            }
        }
        if controls.is_listening(Listener::PointerUp)
            && mouse.any_just_released(BUTTONS.map(|(button, _)| button))
        {
            controls.pointer_up();
        }

        if touch_started && controls.is_listening(Listener::TouchStart) {
            controls.touch_start(&touch_positions);
        }
        if touch_moved && controls.is_listening(Listener::TouchMove) {
            controls.touch_move(&touch_positions);
        }
        if touch_ended && controls.is_listening(Listener::TouchEnd) {
            controls.touch_end();
        }
    }
}
