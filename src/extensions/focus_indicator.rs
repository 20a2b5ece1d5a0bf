//! A `bevy_focus_cam` extension that draws an indicator in the scene at the focus point while the
//! camera is orbiting or panning, so it is obvious what the camera is moving around.

use bevy_app::prelude::*;
use bevy_color::Color;
use bevy_ecs::prelude::*;
use bevy_gizmos::prelude::*;
use bevy_math::{Isometry3d, Vec3};
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use crate::prelude::*;

/// See the [module](self) docs.
pub struct FocusIndicatorPlugin;

impl Plugin for FocusIndicatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            draw_focus.after(bevy_transform::TransformSystem::TransformPropagate),
        )
        .register_type::<FocusIndicator>();
    }
}

/// Optional. Configures whether or not a [`CameraControls`] should show a focus indicator when the
/// camera is orbiting or panning. The indicator will be enabled if this component is not present.
#[derive(Debug, Component, Reflect)]
pub struct FocusIndicator {
    /// Should the indicator be visible on this camera?
    pub enabled: bool,
}

impl Default for FocusIndicator {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Use gizmos to draw the focus point in world space.
pub fn draw_focus(
    cameras: Query<(&CameraControls, &GlobalTransform, Option<&FocusIndicator>)>,
    mut gizmos: Gizmos,
) {
    for (controls, cam_transform, _) in cameras
        .iter()
        .filter(|(.., indicator)| indicator.map(|i| i.enabled).unwrap_or(true))
    {
        let mode = controls.state();
        if !mode.is_orbiting() && !mode.is_panning() {
            continue;
        }

        let current = controls.current();
        let focus = current.focus.as_vec3();
        let scale = (current.spherical.radius as f32 * controls.lens.fov as f32 * 0.01).max(1e-4);

        // Shift the indicator toward the camera to prevent it clipping objects near parallel
        let shift = (cam_transform.translation() - focus).normalize_or_zero() * scale;
        let focus = focus + shift;

        let color = Color::WHITE;
        let (_, rotation, _) = cam_transform.to_scale_rotation_translation();
        gizmos.circle(Isometry3d::new(focus, rotation), scale, color);

        if mode.is_orbiting() {
            let offset = 1.5 * scale;
            let arm_length = 0.4;
            let arms: [Vec3; 4] = [
                cam_transform.left().into(),
                cam_transform.right().into(),
                cam_transform.up().into(),
                cam_transform.down().into(),
            ];
            for arm in arms {
                gizmos.ray(focus + offset * arm, offset * arm_length * arm, color);
            }
        }
    }
}
