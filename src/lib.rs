//! A camera controller that orbits, pans, looks around, and zooms toward the cursor, gliding
//! smoothly between poses.
//!
//! ## Usage
//!
//! Add [`DefaultCameraControlsPlugins`], then add a [`CameraControls`](prelude::CameraControls)
//! component to a camera entity:
//!
//! ```ignore
//! commands.spawn((
//!     Camera3d::default(),
//!     Transform::from_xyz(0.0, 2.0, 8.0),
//!     CameraControls::new(DVec3::new(0.0, 2.0, 8.0), WindowSurface::default()),
//! ));
//! ```
//!
//! ## Controls
//!
//! - Left drag: orbit. With shift or a WASD key held: look around in place.
//! - Right drag: pan.
//! - Scroll: zoom toward the point under the cursor.
//! - One, two, and three finger touch: orbit, pinch zoom, pan.
//! - W/S: move forward and back. A/D: strafe. Arrow keys: look around. Shift: faster.
//!
//! ## How it works
//!
//! The controller keeps two poses, each a spherical offset around a focus point. Input only ever
//! changes the *target* pose. Once per frame the *current* pose moves a damped step toward the
//! target, and the camera transform is derived from it. Zooming moves the camera along the ray
//! under the cursor and then slides the focus point so the world point under the cursor stays put.

#![warn(missing_docs)]

use bevy_app::{PluginGroup, PluginGroupBuilder};

pub mod controller;
pub mod extensions;
pub mod input;

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            component::{CameraControls, Damping, OrbitLimits, PanSettings},
            inputs::{InputSurface, Listener, WindowSurface},
            keyboard::{KeyState, NavKey, NoKeys},
            motion::{InteractionMode, PointerButton},
            rig::{CameraTransform, FocusPose, Lens},
            spherical::Spherical,
            zoom::ZoomStep,
            CameraControlsPlugin,
        },
        DefaultCameraControlsPlugins,
    };
}

/// Adds all the plugins needed for the camera controller to work.
pub struct DefaultCameraControlsPlugins;

impl PluginGroup for DefaultCameraControlsPlugins {
    #[allow(clippy::let_and_return)]
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>().add(controller::CameraControlsPlugin);

        #[cfg(feature = "extension_focus_indicator")]
        let group = group.add(extensions::focus_indicator::FocusIndicatorPlugin);

        group
    }
}
