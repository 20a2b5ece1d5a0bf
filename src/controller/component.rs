//! The primary [`Component`] of the controller, [`CameraControls`].

use std::f64::consts::{PI, TAU};

use bevy_ecs::prelude::*;
use bevy_input::{keyboard::KeyCode, ButtonInput};
use bevy_log::prelude::*;
use bevy_math::{DQuat, DVec2, DVec3};
use bevy_reflect::prelude::*;
use bevy_render::prelude::*;
use bevy_time::prelude::*;
use bevy_transform::prelude::*;
use bevy_window::RequestRedraw;

use super::{
    inputs::{InputSurface, Listener},
    keyboard::{KeyState, NavKey},
    motion::{DragSession, InteractionMode},
    rig::{CameraTransform, FocusPose, Lens, Plane},
    spherical::{wrap_into, wrap_toward, Spherical},
    zoom::ZoomStep,
};

/// Differences between current and target below this are snapped away instead of damped.
const SETTLE_EPSILON: f64 = 0.001;

/// Frame duration the damping factors are tuned for.
const REFERENCE_FRAME_SECONDS: f64 = 0.016;

/// Tracks all state of a camera's controller: its settings, the current and target poses, and the
/// drag in progress.
///
/// # Current and target
///
/// Every motion writes into a *target* [`FocusPose`]. Each call to [`CameraControls::tick`] moves
/// the *current* pose a damped step toward the target and derives the camera transform from it.
/// Passing `allow_transition = false` to a motion also writes the result into the current pose,
/// skipping the glide.
///
/// # Moving the Camera
///
/// The [`CameraControlsPlugin`](crate::controller::CameraControlsPlugin) forwards Bevy input and
/// ticks every controller once per frame. To drive the controller yourself:
///
/// 1. Forward input with [`CameraControls::pointer_down`], [`CameraControls::pointer_move`],
///    [`CameraControls::pointer_up`], the touch equivalents, and [`CameraControls::wheel`], or call
///    the motion methods such as [`CameraControls::rotate`] directly.
/// 2. Call [`CameraControls::tick`] once per frame and redraw when it returns `true`.
/// 3. Place the camera at [`CameraControls::camera_transform`].
#[derive(Component)]
pub struct CameraControls {
    /// When `false`, input is ignored. Pending glides still finish.
    pub enabled: bool,
    /// Bounds on distance and angles.
    pub limits: OrbitLimits,
    /// How quickly the current pose follows the target.
    pub damping: Damping,
    /// Size of a single zoom step.
    pub zoom: ZoomStep,
    /// Pointer pan settings.
    pub pan: PanSettings,
    /// Radians of first person rotation per pixel of drag.
    pub rotation_speed: f64,
    /// Poll WASD and the arrow keys every tick.
    pub keyboard_navigation: bool,
    /// Projection parameters. Kept in sync with the camera's [`Projection`] by the plugin.
    pub lens: Lens,
    pub(super) current: FocusPose,
    pub(super) target: FocusPose,
    pub(super) home: FocusPose,
    pub(super) mode: InteractionMode,
    pub(super) drag: Option<DragSession>,
    pub(super) damping_phase: DampingPhase,
    pub(super) viewport: DVec2,
    pub(super) camera: CameraTransform,
    pub(super) needs_update: bool,
    pub(super) surface: Box<dyn InputSurface>,
    pub(super) disposed: bool,
}

impl std::fmt::Debug for CameraControls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraControls")
            .field("enabled", &self.enabled)
            .field("limits", &self.limits)
            .field("damping", &self.damping)
            .field("zoom", &self.zoom)
            .field("pan", &self.pan)
            .field("rotation_speed", &self.rotation_speed)
            .field("keyboard_navigation", &self.keyboard_navigation)
            .field("lens", &self.lens)
            .field("current", &self.current)
            .field("target", &self.target)
            .field("mode", &self.mode)
            .field("drag", &self.drag)
            .field("surface", &"<input surface>")
            .finish_non_exhaustive()
    }
}

impl CameraControls {
    /// Create a controller for a camera at `camera_position`, orbiting the origin.
    ///
    /// The position becomes both the starting pose and the pose [`CameraControls::reset`] returns
    /// to. The element listeners are subscribed on `surface` immediately.
    pub fn new(camera_position: DVec3, surface: impl InputSurface) -> Self {
        Self::from_camera(camera_position, DVec3::ZERO, surface)
    }

    /// Create a controller for a camera at `camera_position`, orbiting `focus`.
    pub fn from_camera(camera_position: DVec3, focus: DVec3, surface: impl InputSurface) -> Self {
        let pose = FocusPose::from_positions(camera_position, focus);
        let mut controls = Self {
            enabled: true,
            limits: OrbitLimits::default(),
            damping: Damping::default(),
            zoom: ZoomStep::default(),
            pan: PanSettings::default(),
            rotation_speed: 0.005,
            keyboard_navigation: true,
            lens: Lens::default(),
            current: pose,
            target: pose,
            home: pose,
            mode: InteractionMode::Idle,
            drag: None,
            damping_phase: DampingPhase::Settle,
            viewport: DVec2::ZERO,
            camera: CameraTransform::from_pose(&pose),
            needs_update: true,
            surface: Box::new(surface),
            disposed: false,
        };
        for listener in Listener::ELEMENT {
            controls.surface.subscribe(listener);
        }
        controls.advance(None);
        controls
    }

    /// The current interaction mode.
    pub fn state(&self) -> InteractionMode {
        self.mode
    }

    /// The pose being rendered.
    pub fn current(&self) -> &FocusPose {
        &self.current
    }

    /// The pose the current pose is gliding toward.
    pub fn target(&self) -> &FocusPose {
        &self.target
    }

    /// The pose [`CameraControls::reset`] returns to.
    pub fn home(&self) -> &FocusPose {
        &self.home
    }

    /// The camera transform derived from the current pose on the last tick.
    pub fn camera_transform(&self) -> CameraTransform {
        self.camera
    }

    /// The active drag session, if a pointer or touch is held.
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// The damping factor the next tick will use.
    pub fn active_damping(&self) -> f64 {
        match self.damping_phase {
            DampingPhase::Settle => self.damping.settle,
            DampingPhase::Dragging => self.damping.dragging,
        }
    }

    /// The input surface this controller subscribes through.
    pub fn surface(&self) -> &dyn InputSurface {
        self.surface.as_ref()
    }

    /// Is the controller currently listening for this kind of input?
    pub fn is_listening(&self, listener: Listener) -> bool {
        !self.disposed && self.surface.is_subscribed(listener)
    }

    /// Size of the input surface, in the units pointer positions are reported in.
    pub fn viewport_size(&self) -> DVec2 {
        self.viewport
    }

    /// Report the size of the input surface. Drags capture this size when they begin.
    pub fn set_viewport_size(&mut self, size: DVec2) {
        self.viewport = size;
    }

    /// Orbit by the given angles in radians, relative to the target pose.
    pub fn rotate(&mut self, delta_azimuth: f64, delta_polar: f64, allow_transition: bool) {
        self.rotate_to(
            self.target.spherical.azimuth + delta_azimuth,
            self.target.spherical.polar + delta_polar,
            allow_transition,
        );
    }

    /// Orbit to the given angles in radians, clamped to [`CameraControls::limits`].
    pub fn rotate_to(&mut self, azimuth: f64, polar: f64, allow_transition: bool) {
        let target = &mut self.target.spherical;
        target.azimuth = self.limits.clamp_azimuth(azimuth);
        target.polar = self.limits.clamp_polar(polar);
        target.radius = self.current.spherical.radius;
        target.make_safe();

        if !allow_transition {
            self.current.spherical.azimuth = target.azimuth;
            self.current.spherical.polar = target.polar;
        }
        self.needs_update = true;
    }

    /// Turn the camera in place. The camera position is kept, and the focus swings around it at
    /// the same distance.
    ///
    /// `delta_x` yaws about the world up axis, `delta_y` pitches about the camera's right axis,
    /// both scaled by [`CameraControls::rotation_speed`].
    pub fn rotate_first_person(&mut self, delta_x: f64, delta_y: f64) {
        let mut scratch = CameraTransform::from_pose(&self.target);
        let yaw = DQuat::from_axis_angle(DVec3::Y, delta_x * self.rotation_speed);
        let pitch = DQuat::from_axis_angle(DVec3::X, delta_y * self.rotation_speed);
        scratch.rotation = (yaw * scratch.rotation * pitch).normalize();

        let distance = self.target.focus.distance(scratch.position);
        let focus = scratch.position + scratch.forward() * distance;
        let mut spherical = Spherical::from_offset(scratch.position - focus);
        spherical.make_safe();
        spherical.match_winding(self.current.spherical.azimuth);

        self.target = FocusPose { spherical, focus };
        self.needs_update = true;
    }

    /// The signed change in radius of one zoom step at the target radius. Negative when
    /// `zoom_in`.
    pub fn zoom_step(&self, zoom_in: bool, units: f64) -> f64 {
        self.zoom.step(self.target.spherical.radius, zoom_in, units)
    }

    /// Zoom in by `units` steps toward the point under `cursor`, given in normalized device
    /// coordinates.
    pub fn dolly_in(&mut self, cursor: DVec2, units: f64) {
        self.dolly(self.zoom_step(true, units), true, cursor);
    }

    /// Zoom out by `units` steps away from the point under `cursor`.
    pub fn dolly_out(&mut self, cursor: DVec2, units: f64) {
        self.dolly(self.zoom_step(false, units), true, cursor);
    }

    /// Change the target radius by `distance`, anchored at `cursor`.
    pub fn dolly(&mut self, distance: f64, allow_transition: bool, cursor: DVec2) {
        self.dolly_to(
            self.target.spherical.radius + distance,
            allow_transition,
            cursor,
        );
    }

    /// Move the camera to `radius` from its focus, keeping the world point under `cursor` at the
    /// same place on screen.
    ///
    /// The camera moves along the ray through the cursor rather than straight along the view
    /// axis, and the focus is moved to where the view axis now crosses the focus plane. The
    /// camera never gets closer than [`ZoomStep::min_dist_to_target`] to its focus: past that
    /// point the focus is pushed ahead of the camera instead.
    pub fn dolly_to(&mut self, radius: f64, allow_transition: bool, cursor: DVec2) {
        let new_radius = radius
            .min(self.limits.max_distance)
            .max(self.limits.min_distance);
        let move_distance = self.target.spherical.radius - new_radius;

        let scratch = CameraTransform::from_pose(&self.target);
        let ray = scratch.cursor_ray(&self.lens, cursor);
        let forward = scratch.forward();
        let focus_plane = Plane::from_normal_and_point(forward, self.target.focus);

        let position = ray.origin + ray.direction * move_distance;
        if !new_radius.is_finite() || !position.is_finite() {
            warn!("Ignoring dolly to non-finite radius {radius}");
            return;
        }
        let line_length = -focus_plane.distance_to_point(position);
        let end = position + forward * line_length * 2.0;

        match focus_plane.intersect_segment(position, end) {
            Some(mut focus) => {
                let mut radius = focus.distance(position);
                let shortfall = self.zoom.min_dist_to_target - radius;
                if shortfall > 0.0 {
                    focus += forward * shortfall;
                    radius = self.zoom.min_dist_to_target;
                }
                self.target.focus = focus;
                self.target.spherical.radius = radius;
            }
            None => {
                warn!("Dolly ray missed the focus plane, keeping the focus point");
                self.target.spherical.radius = new_radius.max(self.zoom.min_dist_to_target);
            }
        }

        if !allow_transition {
            self.current = self.target;
            self.advance(None);
        }
        self.needs_update = true;
    }

    /// Move the focus in the view plane of the target pose: `dx` along the camera's right axis and
    /// `dy` along its down axis.
    pub fn pan(&mut self, dx: f64, dy: f64, allow_transition: bool) {
        let scratch = CameraTransform::from_pose(&self.target);
        self.target.focus += scratch.right() * dx - scratch.up() * dy;

        if !allow_transition {
            self.current.focus = self.target.focus;
        }
        self.needs_update = true;
    }

    /// Move the focus to `point` without changing the camera's offset from it.
    pub fn move_to(&mut self, point: DVec3, allow_transition: bool) {
        self.target.focus = point;

        if !allow_transition {
            self.current.focus = point;
        }
        self.needs_update = true;
    }

    /// Return to the home pose captured at construction or by
    /// [`CameraControls::set_camera_position`].
    pub fn reset(&mut self, allow_transition: bool) {
        self.target = self.home;
        self.target.spherical.azimuth %= TAU;
        self.target.spherical.make_safe();
        self.current.spherical.azimuth %= TAU;

        if !allow_transition {
            self.current = self.target;
        }
        self.needs_update = true;
    }

    /// Make `camera_position` looking at `focus` the new home pose, and jump to it.
    pub fn set_camera_position(&mut self, camera_position: DVec3, focus: DVec3) {
        self.home = FocusPose::from_positions(camera_position, focus);
        self.reset(false);
    }

    /// Advance the current pose toward the target, then apply held navigation keys.
    ///
    /// `delta_seconds` scales the damping step; `None` converges instantly. Returns `true` if
    /// anything changed since the last tick and the view should be redrawn.
    pub fn tick(&mut self, delta_seconds: Option<f64>, keys: &dyn KeyState) -> bool {
        self.advance(delta_seconds);
        self.poll_keyboard(keys);
        std::mem::take(&mut self.needs_update)
    }

    /// Unsubscribe every listener this controller holds. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.end_drag();
        for listener in Listener::ELEMENT {
            self.surface.unsubscribe(listener);
        }
        self.disposed = true;
        debug!("Camera controls disposed");
    }

    /// Returns `true` once [`CameraControls::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(super) fn advance(&mut self, delta_seconds: Option<f64>) {
        if self.limits.is_azimuth_bounded() {
            let (min, max) = (self.limits.min_azimuth, self.limits.max_azimuth);
            let target = wrap_into(self.target.spherical.azimuth, min, max);
            let current = wrap_into(self.current.spherical.azimuth, min, max);
            self.target.spherical.azimuth = target;
            self.current.spherical.azimuth = wrap_toward(current, target, min, max);
        }

        let factor = match delta_seconds.filter(|dt| dt.is_finite()) {
            Some(dt) => (self.active_damping() * dt / REFERENCE_FRAME_SECONDS).clamp(0.0, 1.0),
            None => 1.0,
        };

        let (current, target) = (&mut self.current, &self.target);
        let delta_radius = target.spherical.radius - current.spherical.radius;
        let delta_polar = target.spherical.polar - current.spherical.polar;
        let delta_azimuth = target.spherical.azimuth - current.spherical.azimuth;
        let delta_focus = target.focus - current.focus;

        let settled = [
            delta_radius,
            delta_polar,
            delta_azimuth,
            delta_focus.x,
            delta_focus.y,
            delta_focus.z,
        ]
        .iter()
        .all(|delta| delta.abs() <= SETTLE_EPSILON);

        if settled {
            *current = *target;
        } else {
            current.spherical.radius += delta_radius * factor;
            current.spherical.polar += delta_polar * factor;
            current.spherical.azimuth += delta_azimuth * factor;
            current.focus += delta_focus * factor;
            self.needs_update = true;
        }

        self.current.spherical.make_safe();
        self.camera = CameraTransform::from_pose(&self.current);
    }

    fn poll_keyboard(&mut self, keys: &dyn KeyState) {
        if !self.enabled || self.disposed || !self.keyboard_navigation {
            return;
        }
        let fast = keys.is_pressed(NavKey::Shift);
        let units = if fast { 1.0 } else { 0.2 };
        let mut changed = false;

        if keys.is_pressed(NavKey::W) {
            changed = true;
            self.dolly_in(DVec2::ZERO, units);
        }
        if keys.is_pressed(NavKey::S) {
            changed = true;
            self.dolly_out(DVec2::ZERO, units);
        }
        let strafe = self.zoom_step(true, units);
        if keys.is_pressed(NavKey::A) {
            changed = true;
            self.pan(strafe, 0.0, true);
        }
        if keys.is_pressed(NavKey::D) {
            changed = true;
            self.pan(-strafe, 0.0, true);
        }

        let speed = if fast { 10.0 } else { 5.0 };
        if keys.is_pressed(NavKey::Left) {
            changed = true;
            self.rotate_first_person(speed, 0.0);
        }
        if keys.is_pressed(NavKey::Up) {
            changed = true;
            self.rotate_first_person(0.0, speed * 0.5);
        }
        if keys.is_pressed(NavKey::Down) {
            changed = true;
            self.rotate_first_person(0.0, -speed * 0.5);
        }
        if keys.is_pressed(NavKey::Right) {
            changed = true;
            self.rotate_first_person(-speed, 0.0);
        }

        if changed {
            trace!("Keyboard navigation moved the target to {:?}", self.target);
            self.needs_update = true;
        }
    }

    /// Tick all controllers and place their cameras. Called once per frame.
    pub fn update_camera_transforms(
        mut cameras: Query<(&mut CameraControls, &mut Transform, Option<&Projection>)>,
        keys: Res<ButtonInput<KeyCode>>,
        time: Res<Time>,
        mut redraw: EventWriter<RequestRedraw>,
    ) {
        for (mut controls, mut transform, projection) in cameras.iter_mut() {
            match projection {
                Some(Projection::Perspective(perspective)) => {
                    controls.lens = Lens {
                        fov: perspective.fov as f64,
                        aspect_ratio: perspective.aspect_ratio as f64,
                    };
                }
                Some(Projection::Orthographic(_)) | Some(Projection::Custom(_)) => {
                    warn_once!("Camera controls assume a perspective projection");
                }
                None => (),
            }

            if controls.tick(Some(time.delta_secs_f64()), &*keys) {
                redraw.write(RequestRedraw);
            }

            let camera = controls.camera_transform();
            let placed = Transform {
                translation: camera.position.as_vec3(),
                rotation: camera.rotation.as_quat().normalize(),
                scale: transform.scale,
            };
            transform.set_if_neq(placed);
        }
    }
}

/// Which damping factor the glide currently uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DampingPhase {
    Settle,
    Dragging,
}

/// Bounds on the target pose. Out of range values are clamped, never rejected.
#[derive(Debug, Clone, Reflect)]
pub struct OrbitLimits {
    /// Smallest radius a dolly may request.
    pub min_distance: f64,
    /// Largest radius a dolly may request.
    pub max_distance: f64,
    /// Smallest polar angle, in radians from straight up.
    pub min_polar: f64,
    /// Largest polar angle.
    pub max_polar: f64,
    /// Smallest azimuth. Negative infinity allows unrestricted spin.
    pub min_azimuth: f64,
    /// Largest azimuth. Infinity allows unrestricted spin.
    pub max_azimuth: f64,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f64::INFINITY,
            min_polar: 0.0,
            max_polar: PI,
            min_azimuth: f64::NEG_INFINITY,
            max_azimuth: f64::INFINITY,
        }
    }
}

impl OrbitLimits {
    /// Clamp a polar angle into the configured range.
    pub fn clamp_polar(&self, polar: f64) -> f64 {
        polar.min(self.max_polar).max(self.min_polar)
    }

    /// Clamp an azimuth into the configured range.
    pub fn clamp_azimuth(&self, azimuth: f64) -> f64 {
        azimuth.min(self.max_azimuth).max(self.min_azimuth)
    }

    /// Returns `true` if either azimuth bound is finite.
    pub fn is_azimuth_bounded(&self) -> bool {
        self.min_azimuth.is_finite() || self.max_azimuth.is_finite()
    }
}

/// How quickly the current pose follows the target pose.
///
/// Each tick moves the current pose `factor * dt / 0.016` of the remaining way, so smaller values
/// glide longer.
#[derive(Debug, Clone, Reflect)]
pub struct Damping {
    /// Factor used before the first drag, and after a drag when `restore_on_release` is set.
    pub settle: f64,
    /// Factor applied when a drag begins.
    pub dragging: f64,
    /// When `false`, the dragging factor stays in effect after the drag is released.
    pub restore_on_release: bool,
}

impl Default for Damping {
    fn default() -> Self {
        Self {
            settle: 0.5,
            dragging: 0.1,
            restore_on_release: false,
        }
    }
}

/// Settings for pointer and touch panning.
#[derive(Debug, Clone, Reflect)]
pub struct PanSettings {
    /// Multiplier on the distance panned per pixel.
    pub speed: f64,
    /// Largest pan, in world units, a single move event may produce along each axis.
    pub max_step: f64,
}

impl Default for PanSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            max_step: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::controller::{inputs::WindowSurface, keyboard::NoKeys};

    fn orbiting_origin() -> CameraControls {
        CameraControls::new(DVec3::new(0.0, 0.0, 10.0), WindowSurface::default())
    }

    fn settle(controls: &mut CameraControls) {
        for _ in 0..10_000 {
            if !controls.tick(Some(1.0 / 60.0), &NoKeys) {
                return;
            }
        }
        panic!("controller never settled");
    }

    fn pose_distance(a: &FocusPose, b: &FocusPose) -> f64 {
        let s = (a.spherical.radius - b.spherical.radius).abs()
            + (a.spherical.polar - b.spherical.polar).abs()
            + (a.spherical.azimuth - b.spherical.azimuth).abs();
        s + a.focus.distance(b.focus)
    }

    #[test]
    fn construction_captures_pose() {
        let mut controls = orbiting_origin();
        assert_eq!(controls.current(), controls.target());
        assert_eq!(controls.home(), controls.target());
        assert!((controls.current().spherical.radius - 10.0).abs() < 1e-12);
        assert!((controls.camera_transform().position - DVec3::new(0.0, 0.0, 10.0)).length() < 1e-9);
        // The first tick always asks for a redraw, the second has nothing to do.
        assert!(controls.tick(Some(1.0 / 60.0), &NoKeys));
        assert!(!controls.tick(Some(1.0 / 60.0), &NoKeys));
    }

    #[test]
    fn rotate_to_clamps_polar() {
        let mut controls = orbiting_origin();
        controls.limits.min_polar = 0.5;
        controls.limits.max_polar = 2.0;

        controls.rotate_to(0.0, 0.1, true);
        assert_eq!(controls.target().spherical.polar, 0.5);
        controls.rotate_to(0.0, 3.0, true);
        assert_eq!(controls.target().spherical.polar, 2.0);
        controls.rotate_to(0.0, 0.5, true);
        assert_eq!(controls.target().spherical.polar, 0.5);
        controls.rotate_to(0.0, 2.0, false);
        assert_eq!(controls.current().spherical.polar, 2.0);
    }

    #[test]
    fn rotate_to_keeps_off_the_pole() {
        let mut controls = orbiting_origin();
        controls.rotate_to(0.0, 0.0, false);
        assert!(controls.target().spherical.polar > 0.0);
        assert!(controls.current().spherical.polar > 0.0);
    }

    #[test]
    fn quarter_orbit_without_transition() {
        let mut controls = orbiting_origin();
        controls.rotate(FRAC_PI_2, 0.0, false);
        assert_eq!(controls.current().spherical.azimuth, FRAC_PI_2);

        controls.tick(None, &NoKeys);
        let position = controls.camera_transform().position;
        assert!((position - DVec3::new(10.0, 0.0, 0.0)).length() < 1e-9);
        assert!((controls.camera_transform().forward() - DVec3::NEG_X).length() < 1e-9);
    }

    #[test]
    fn full_turn_of_rotations_returns_to_start() {
        let mut controls = orbiting_origin();
        let start = controls.current().spherical.azimuth;
        for _ in 0..4 {
            controls.rotate(FRAC_PI_2, 0.0, true);
            controls.tick(Some(1.0 / 60.0), &NoKeys);
        }
        settle(&mut controls);
        let end = controls.current().spherical.azimuth;
        let turns = (end - start) / TAU;
        assert!((turns - turns.round()).abs() < 1e-9);
        assert!((turns.round() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn glide_converges_monotonically_then_snaps() {
        let mut controls = orbiting_origin();
        controls.rotate(1.0, 0.4, true);
        controls.pan(2.0, -1.0, true);
        controls.dolly(3.0, true, DVec2::ZERO);

        let mut last = pose_distance(controls.current(), controls.target());
        assert!(last > SETTLE_EPSILON);
        loop {
            let moved = controls.tick(Some(1.0 / 60.0), &NoKeys);
            let distance = pose_distance(controls.current(), controls.target());
            if distance == 0.0 {
                break;
            }
            assert!(moved);
            assert!(distance < last);
            last = distance;
        }
        assert_eq!(controls.current(), controls.target());
    }

    #[test]
    fn instant_tick_converges_in_one_step() {
        let mut controls = orbiting_origin();
        controls.rotate(0.7, 0.2, true);
        assert!(controls.tick(None, &NoKeys));
        assert!(pose_distance(controls.current(), controls.target()) < 1e-12);
    }

    #[test]
    fn centered_dolly_keeps_angles_and_focus_line() {
        let mut controls = orbiting_origin();
        controls.rotate(0.3, -0.2, false);
        let before = *controls.target();

        controls.dolly_in(DVec2::ZERO, 1.0);
        let after = *controls.target();
        assert_eq!(after.spherical.polar, before.spherical.polar);
        assert_eq!(after.spherical.azimuth, before.spherical.azimuth);
        assert!(after.spherical.radius < before.spherical.radius);
        assert!((after.focus - before.focus).length() < 1e-9);
    }

    #[test]
    fn centered_dolly_to_is_idempotent() {
        let mut controls = orbiting_origin();
        controls.dolly_to(6.0, false, DVec2::ZERO);
        let first = *controls.target();
        assert!((first.spherical.radius - 6.0).abs() < 1e-9);
        assert_eq!(controls.current(), controls.target());

        controls.dolly_to(6.0, false, DVec2::ZERO);
        assert!(pose_distance(&first, controls.target()) < 1e-9);
        assert!(pose_distance(&first, controls.current()) < 1e-9);
    }

    #[test]
    fn dolly_past_min_distance_pushes_focus() {
        let mut controls = orbiting_origin();
        controls.dolly_to(0.5, false, DVec2::ZERO);
        let target = controls.target();
        assert!((target.spherical.radius - controls.zoom.min_dist_to_target).abs() < 1e-9);
        // The camera moved 9.5 forward, so the focus is pushed 1.5 past the origin.
        assert!((target.focus - DVec3::new(0.0, 0.0, -1.5)).length() < 1e-9);
    }

    #[test]
    fn dolly_respects_distance_limits() {
        let mut controls = orbiting_origin();
        controls.limits.max_distance = 12.0;
        controls.dolly_to(50.0, false, DVec2::ZERO);
        assert!((controls.target().spherical.radius - 12.0).abs() < 1e-9);
    }

    #[test]
    fn off_center_dolly_pins_cursor_point() {
        let mut controls = orbiting_origin();
        let cursor = DVec2::new(0.5, 0.25);
        let before = CameraTransform::from_pose(controls.target());
        let ray = before.cursor_ray(&controls.lens, cursor);
        // Where the cursor ray meets the focus plane.
        let plane = Plane::from_normal_and_point(before.forward(), controls.target().focus);
        let anchor = ray.origin - ray.direction * plane.distance_to_point(ray.origin)
            / plane.normal.dot(ray.direction);

        controls.dolly_in(cursor, 1.0);
        let after = CameraTransform::from_pose(controls.target());
        let to_anchor = (anchor - after.position).normalize();
        let cursor_dir = after.cursor_ray(&controls.lens, cursor).direction;
        assert!(to_anchor.cross(cursor_dir).length() < 1e-9);
        assert!(controls.target().focus.x > 0.0);
    }

    #[test]
    fn pan_moves_focus_along_right_axis() {
        let mut controls = orbiting_origin();
        controls.rotate(0.4, 0.3, false);
        controls.tick(None, &NoKeys);
        let right = controls.camera_transform().right();
        let before = controls.current().focus;

        controls.pan(1.0, 0.0, false);
        let moved = controls.current().focus - before;
        assert!((moved - right).length() < 1e-12);
        assert!(moved.dot(controls.camera_transform().up()).abs() < 1e-12);

        controls.tick(None, &NoKeys);
        let radius = controls
            .camera_transform()
            .position
            .distance(controls.current().focus);
        assert!((radius - 10.0).abs() < 1e-9);
    }

    #[test]
    fn first_person_look_keeps_camera_and_radius() {
        let mut controls = orbiting_origin();
        let position = controls.target().camera_position();
        controls.rotate_first_person(100.0, 40.0);

        let target = controls.target();
        assert!((target.camera_position() - position).length() < 1e-9);
        assert!((target.spherical.radius - 10.0).abs() < 1e-9);
        assert!(target.focus.length() > 0.1);
        assert!((target.spherical.azimuth - controls.current().spherical.azimuth).abs() <= PI);
    }

    #[test]
    fn first_person_yaw_keeps_winding_near_current() {
        let mut controls = orbiting_origin();
        controls.rotate_to(3.1, FRAC_PI_2, false);
        controls.tick(None, &NoKeys);
        // Turn far enough that the raw azimuth would wrap from +π to -π.
        controls.rotate_first_person(20.0, 0.0);
        let azimuth = controls.target().spherical.azimuth;
        assert!((azimuth - 3.1).abs() < 0.2);
    }

    #[test]
    fn bounded_azimuth_glides_inside_bounds() {
        let mut controls = orbiting_origin();
        controls.limits.min_azimuth = -1.0;
        controls.limits.max_azimuth = 1.0;
        controls.current.spherical.azimuth = TAU + 0.5;
        controls.rotate_to(-0.5, FRAC_PI_2, true);
        controls.tick(Some(1.0 / 60.0), &NoKeys);
        let azimuth = controls.current().spherical.azimuth;
        assert!((-0.5..=0.5).contains(&azimuth));
    }

    #[test]
    fn half_bounded_azimuth_glides_less_than_a_turn() {
        let mut controls = orbiting_origin();
        controls.limits.min_azimuth = 0.0;
        controls.rotate_to(100.0, FRAC_PI_2, false);
        controls.rotate_to(0.1, FRAC_PI_2, true);
        controls.tick(Some(1.0 / 60.0), &NoKeys);
        let azimuth = controls.current().spherical.azimuth;
        assert!((0.0..=0.1 + TAU).contains(&azimuth));
    }

    #[test]
    fn non_finite_dolly_leaves_target_alone() {
        let mut controls = orbiting_origin();
        controls.set_viewport_size(DVec2::new(800.0, 600.0));
        let before = *controls.target();
        controls.dolly_to(f64::INFINITY, false, DVec2::new(0.3, 0.2));
        controls.dolly_to(f64::NAN, false, DVec2::new(0.3, 0.2));
        assert_eq!(*controls.target(), before);
        assert!(controls.camera_transform().position.is_finite());
    }

    #[test]
    fn poses_from_the_pole_stay_off_it() {
        let overhead = CameraControls::new(DVec3::new(0.0, 10.0, 0.0), WindowSurface::default());
        assert!(overhead.target().spherical.polar >= Spherical::POLE_EPSILON);

        let mut controls = orbiting_origin();
        controls.set_camera_position(DVec3::new(0.0, 5.0, 0.0), DVec3::ZERO);
        for pose in [controls.current(), controls.target(), controls.home()] {
            let polar = pose.spherical.polar;
            assert!(polar >= Spherical::POLE_EPSILON && polar <= PI - Spherical::POLE_EPSILON);
        }
        assert!(controls.camera_transform().rotation.is_finite());
    }

    #[test]
    fn move_to_and_reset() {
        let mut controls = orbiting_origin();
        controls.move_to(DVec3::new(1.0, 2.0, 3.0), false);
        assert_eq!(controls.current().focus, DVec3::new(1.0, 2.0, 3.0));
        controls.rotate(5.0 * TAU + 0.3, 0.0, false);

        controls.reset(false);
        assert_eq!(controls.current(), controls.target());
        assert_eq!(controls.target().focus, DVec3::ZERO);
        assert!(controls.current().spherical.azimuth.abs() < TAU);
        assert!((controls.target().spherical.radius - 10.0).abs() < 1e-12);
    }

    #[test]
    fn set_camera_position_moves_home() {
        let mut controls = orbiting_origin();
        let focus = DVec3::new(1.0, 0.0, 0.0);
        controls.set_camera_position(DVec3::new(1.0, 4.0, 3.0), focus);
        assert_eq!(controls.current().focus, focus);
        assert!((controls.current().spherical.radius - 5.0).abs() < 1e-12);

        controls.rotate(1.0, 0.0, false);
        controls.reset(false);
        assert!((controls.current().camera_position() - DVec3::new(1.0, 4.0, 3.0)).length() < 1e-9);
    }

    #[test]
    fn keyboard_navigation() {
        let mut controls = orbiting_origin();
        controls.tick(None, &NoKeys);

        assert!(controls.tick(None, &[NavKey::W]));
        assert!(controls.target().spherical.radius < 10.0);

        let mut strafing = orbiting_origin();
        strafing.tick(None, &NoKeys);
        strafing.tick(None, &[NavKey::D]);
        assert!(strafing.target().focus.x > 0.0);

        let mut turning = orbiting_origin();
        turning.tick(None, &[NavKey::Left, NavKey::Shift]);
        // Turning left from looking down -Z swings the focus toward -X.
        assert!(turning.target().focus.x < 0.0);

        let mut disabled = orbiting_origin();
        disabled.tick(None, &NoKeys);
        disabled.keyboard_navigation = false;
        assert!(!disabled.tick(None, &[NavKey::W]));
    }

    #[test]
    fn fast_keys_move_further() {
        let mut slow = orbiting_origin();
        slow.tick(None, &[NavKey::S]);
        let mut fast = orbiting_origin();
        fast.tick(None, &[NavKey::S, NavKey::Shift]);
        assert!(fast.target().spherical.radius > slow.target().spherical.radius);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut controls = orbiting_origin();
        assert!(controls.is_listening(Listener::Wheel));
        controls.dispose();
        controls.dispose();
        assert!(controls.is_disposed());
        for listener in Listener::ELEMENT.iter().chain(Listener::DRAG.iter()) {
            assert!(!controls.surface().is_subscribed(*listener));
        }
    }
}
