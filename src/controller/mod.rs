//! Camera controller implementation.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::InputSystem;
use bevy_window::{CursorMoved, RequestRedraw};

use crate::input::forward_inputs;

pub mod component;
pub mod inputs;
pub mod keyboard;
pub mod motion;
pub mod rig;
pub mod spherical;
pub mod zoom;

/// Adds [`component::CameraControls`] functionality to the app: input forwarding and the
/// per-frame tick.
pub struct CameraControlsPlugin;

impl Plugin for CameraControlsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RequestRedraw>()
            .add_event::<CursorMoved>()
            .add_systems(
                PreUpdate,
                (
                    forward_inputs,
                    component::CameraControls::update_camera_transforms,
                )
                    .chain()
                    .after(InputSystem),
            )
            .register_type::<component::OrbitLimits>()
            .register_type::<component::Damping>()
            .register_type::<component::PanSettings>()
            .register_type::<zoom::ZoomStep>()
            .register_type::<rig::Lens>()
            .register_type::<rig::FocusPose>()
            .register_type::<motion::InteractionMode>();
    }
}

#[cfg(test)]
mod tests {
    use bevy_input::{keyboard::KeyCode, ButtonInput, InputPlugin};
    use bevy_math::{DVec3, Vec3};
    use bevy_time::TimePlugin;
    use bevy_transform::prelude::*;

    use super::{component::CameraControls, inputs::WindowSurface, *};

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((TimePlugin, InputPlugin, CameraControlsPlugin));
        app
    }

    #[test]
    fn plugin_places_camera() {
        let mut app = app();
        let mut controls = CameraControls::new(DVec3::new(0.0, 3.0, 4.0), WindowSurface::default());
        controls.move_to(DVec3::new(1.0, 0.0, 0.0), false);
        let camera = app
            .world_mut()
            .spawn((controls, Transform::default()))
            .id();

        app.update();

        let transform = app.world().get::<Transform>(camera).copied().unwrap_or_default();
        assert!(transform.translation.distance(Vec3::new(1.0, 3.0, 4.0)) < 1e-5);
        assert!(transform.forward().dot(Vec3::new(0.0, -0.6, -0.8)) > 0.9999);
    }

    #[test]
    fn held_keys_reach_the_controller() {
        let mut app = app();
        let camera = app
            .world_mut()
            .spawn((
                CameraControls::new(DVec3::new(0.0, 0.0, 10.0), WindowSurface::default()),
                Transform::default(),
            ))
            .id();
        app.update();

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyW);
        app.update();

        let Some(controls) = app.world().get::<CameraControls>(camera) else {
            panic!("controller removed");
        };
        assert!(controls.target().spherical.radius < 10.0);
    }
}
