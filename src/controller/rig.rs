//! The camera transform derived from a [`FocusPose`], plus the small amount of ray and plane math
//! needed to move it.
//!
//! Everything here is a pure function of its inputs. Motions that need to know where the camera
//! *would* be at the target pose build a scratch [`CameraTransform`] instead of touching the live
//! camera.

use std::f64::consts::FRAC_PI_4;

use bevy_math::{DMat3, DQuat, DVec2, DVec3};
use bevy_reflect::prelude::*;

use super::spherical::Spherical;

/// A spherical offset around a focus point: everything needed to place the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct FocusPose {
    /// Offset of the camera from `focus`.
    pub spherical: Spherical,
    /// The point the camera orbits around and looks at.
    pub focus: DVec3,
}

impl FocusPose {
    /// Create a pose from a world space camera position and focus point.
    ///
    /// The polar angle is kept off the poles, so a camera straight above or below its focus still
    /// has a usable up direction.
    pub fn from_positions(camera: DVec3, focus: DVec3) -> Self {
        let mut spherical = Spherical::from_offset(camera - focus);
        spherical.make_safe();
        Self { spherical, focus }
    }

    /// World space position of the camera at this pose.
    pub fn camera_position(&self) -> DVec3 {
        self.focus + self.spherical.to_offset()
    }
}

/// Perspective parameters of the camera, used to cast rays through the cursor and to scale pan
/// speed with the field of view.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Lens {
    /// Vertical field of view in radians.
    pub fov: f64,
    /// Width divided by height.
    pub aspect_ratio: f64,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov: FRAC_PI_4,
            aspect_ratio: 1.0,
        }
    }
}

/// Position and orientation of the camera. The camera looks down its local -Z axis with +Y up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct CameraTransform {
    /// World space position.
    pub position: DVec3,
    /// World space orientation.
    pub rotation: DQuat,
}

impl CameraTransform {
    /// A camera at `position` facing `focus`, keeping `up` as close to vertical as possible.
    pub fn looking_at(position: DVec3, focus: DVec3, up: DVec3) -> Self {
        let back = (position - focus).try_normalize().unwrap_or(DVec3::Z);
        let right = up.cross(back).try_normalize().unwrap_or(DVec3::X);
        let up = back.cross(right);
        Self {
            position,
            rotation: DQuat::from_mat3(&DMat3::from_cols(right, up, back)),
        }
    }

    /// The camera placed at `pose`, looking at the pose's focus with +Y up.
    pub fn from_pose(pose: &FocusPose) -> Self {
        Self::looking_at(pose.camera_position(), pose.focus, DVec3::Y)
    }

    /// Unit vector the camera is looking along.
    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::NEG_Z
    }

    /// Unit vector pointing to the right of the view.
    pub fn right(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    /// Unit vector pointing up in the view.
    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// A ray from the camera through a point given in normalized device coordinates, where
    /// `(-1, -1)` is the bottom left corner of the view and `(1, 1)` the top right.
    pub fn cursor_ray(&self, lens: &Lens, ndc: DVec2) -> Ray {
        let half_height = (lens.fov * 0.5).tan();
        let view_dir = DVec3::new(
            ndc.x * half_height * lens.aspect_ratio,
            ndc.y * half_height,
            -1.0,
        )
        .normalize();
        Ray {
            origin: self.position,
            direction: self.rotation * view_dir,
        }
    }
}

/// A half line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray.
    pub origin: DVec3,
    /// Unit direction.
    pub direction: DVec3,
}

/// An infinite plane `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: DVec3,
    /// Signed offset from the origin along the negated normal.
    pub constant: f64,
}

impl Plane {
    /// The plane with the given unit normal passing through `point`.
    pub fn from_normal_and_point(normal: DVec3, point: DVec3) -> Self {
        Self {
            normal,
            constant: -point.dot(normal),
        }
    }

    /// Signed distance from the plane, positive on the side the normal points to.
    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.constant
    }

    /// Where the segment from `start` to `end` crosses the plane, if it does.
    pub fn intersect_segment(&self, start: DVec3, end: DVec3) -> Option<DVec3> {
        let direction = end - start;
        let denominator = self.normal.dot(direction);
        if denominator == 0.0 {
            // Parallel segments only touch the plane when they lie inside it.
            return (self.distance_to_point(start) == 0.0).then_some(start);
        }
        let t = -(start.dot(self.normal) + self.constant) / denominator;
        if !(0.0..=1.0).contains(&t) || !t.is_finite() {
            return None;
        }
        Some(start + direction * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_faces_focus() {
        let cam = CameraTransform::looking_at(DVec3::new(0.0, 0.0, 5.0), DVec3::ZERO, DVec3::Y);
        assert!((cam.forward() - DVec3::NEG_Z).length() < 1e-12);
        assert!((cam.right() - DVec3::X).length() < 1e-12);
        assert!((cam.up() - DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn centered_cursor_ray_is_forward() {
        let pose = FocusPose::from_positions(DVec3::new(3.0, 2.0, 1.0), DVec3::new(0.0, 1.0, 0.0));
        let cam = CameraTransform::from_pose(&pose);
        let ray = cam.cursor_ray(&Lens::default(), DVec2::ZERO);
        assert!((ray.direction - cam.forward()).length() < 1e-12);
        assert_eq!(ray.origin, cam.position);
    }

    #[test]
    fn corner_cursor_ray_matches_field_of_view() {
        let cam = CameraTransform::looking_at(DVec3::ZERO, DVec3::NEG_Z, DVec3::Y);
        let lens = Lens::default();
        let ray = cam.cursor_ray(&lens, DVec2::new(0.0, 1.0));
        let angle = ray.direction.angle_between(DVec3::NEG_Z);
        assert!((angle - lens.fov * 0.5).abs() < 1e-12);
        assert!(ray.direction.y > 0.0);
    }

    #[test]
    fn segment_intersects_plane() {
        let plane = Plane::from_normal_and_point(DVec3::Y, DVec3::new(0.0, 2.0, 0.0));
        assert_eq!(plane.distance_to_point(DVec3::new(7.0, 5.0, 1.0)), 3.0);

        let hit = plane.intersect_segment(DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 4.0, 0.0));
        assert_eq!(hit, Some(DVec3::new(1.0, 2.0, 0.0)));

        let short = plane.intersect_segment(DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 1.0, 0.0));
        assert_eq!(short, None);

        let parallel = plane.intersect_segment(DVec3::ZERO, DVec3::X);
        assert_eq!(parallel, None);
    }
}
