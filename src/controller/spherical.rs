//! Spherical coordinates of the camera relative to its focus point.

use std::f64::consts::{PI, TAU};

use bevy_math::DVec3;
use bevy_reflect::prelude::*;

/// A camera offset from its focus, as a radius and two angles.
///
/// The polar angle is measured from the +Y axis, and the azimuth is measured around +Y starting
/// at +Z, so an azimuth of `π/2` points along +X.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Spherical {
    /// Distance from the focus point.
    pub radius: f64,
    /// Angle from the vertical axis, in `0..π`.
    pub polar: f64,
    /// Angle around the vertical axis. Unbounded, may wind past `±π`.
    pub azimuth: f64,
}

impl Default for Spherical {
    fn default() -> Self {
        Self {
            radius: 1.0,
            polar: 0.0,
            azimuth: 0.0,
        }
    }
}

impl Spherical {
    /// How close the polar angle may get to either pole before the look-at basis degenerates.
    pub const POLE_EPSILON: f64 = 1e-6;

    /// Create a new spherical offset.
    pub fn new(radius: f64, polar: f64, azimuth: f64) -> Self {
        Self {
            radius,
            polar,
            azimuth,
        }
    }

    /// The spherical representation of a cartesian offset. A zero offset maps to zero angles.
    pub fn from_offset(offset: DVec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::new(0.0, 0.0, 0.0);
        }
        Self {
            radius,
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
        }
    }

    /// The cartesian offset described by these coordinates.
    pub fn to_offset(&self) -> DVec3 {
        let ring = self.polar.sin() * self.radius;
        DVec3::new(
            ring * self.azimuth.sin(),
            self.polar.cos() * self.radius,
            ring * self.azimuth.cos(),
        )
    }

    /// Keep the polar angle strictly away from both poles.
    pub fn make_safe(&mut self) {
        self.polar = self
            .polar
            .clamp(Self::POLE_EPSILON, PI - Self::POLE_EPSILON);
    }

    /// Re-express the azimuth on the same 2π winding as `reference`, so that the two never differ
    /// by more than half a turn.
    pub fn match_winding(&mut self, reference: f64) {
        self.azimuth = wrap_near(self.azimuth, reference);
    }
}

/// Shift `angle` by whole turns until it lies within half a turn of `reference`.
pub fn wrap_near(angle: f64, reference: f64) -> f64 {
    let turns = ((reference - angle) / TAU).round();
    angle + turns * TAU
}

/// Shift an angle lying outside `min..=max` by whole turns onto the winding nearest the interval.
///
/// Angles already inside the interval, and unbounded intervals, leave the angle untouched.
pub fn wrap_into(angle: f64, min: f64, max: f64) -> f64 {
    if (min..=max).contains(&angle) {
        return angle;
    }
    match (min.is_finite(), max.is_finite()) {
        (true, true) => wrap_near(angle, (min + max) * 0.5),
        (true, false) => wrap_near(angle, min + PI),
        (false, true) => wrap_near(angle, max - PI),
        (false, false) => angle,
    }
}

/// Re-express `angle` on the winding nearest `reference` that still lies inside `min..=max`.
///
/// Returns `angle` unchanged when no such winding exists.
pub fn wrap_toward(angle: f64, reference: f64, min: f64, max: f64) -> f64 {
    let mut near = wrap_near(angle, reference);
    if near < min {
        near += TAU;
    } else if near > max {
        near -= TAU;
    }
    if (min..=max).contains(&near) {
        near
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn offset_round_trip_keeps_direction() {
        let offset = DVec3::new(3.0, 4.0, -2.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-12);
    }

    #[test]
    fn azimuth_quarter_turn_points_along_x() {
        let offset = Spherical::new(2.0, FRAC_PI_2, FRAC_PI_2).to_offset();
        assert!((offset - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn zero_offset_has_zero_angles() {
        assert_eq!(
            Spherical::from_offset(DVec3::ZERO),
            Spherical::new(0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn make_safe_moves_off_the_poles() {
        let mut top = Spherical::new(1.0, 0.0, 0.0);
        top.make_safe();
        assert_eq!(top.polar, Spherical::POLE_EPSILON);

        let mut bottom = Spherical::new(1.0, PI, 0.0);
        bottom.make_safe();
        assert_eq!(bottom.polar, PI - Spherical::POLE_EPSILON);
    }

    #[test]
    fn winding_is_matched_to_reference() {
        let mut s = Spherical::new(1.0, 1.0, -3.0);
        s.match_winding(3.0);
        assert!((s.azimuth - (TAU - 3.0)).abs() < 1e-12);
        assert!((s.azimuth - 3.0).abs() <= PI);

        assert!((wrap_near(5.0 * TAU + 0.25, 0.0) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn bounded_interval_picks_nearest_winding() {
        let wrapped = wrap_into(TAU + 0.1, -0.5, 0.5);
        assert!((wrapped - 0.1).abs() < 1e-12);
        assert_eq!(wrap_into(42.0, f64::NEG_INFINITY, f64::INFINITY), 42.0);
        // Inside a range wider than a turn, nothing moves.
        assert_eq!(wrap_into(3.9, -4.0, 4.0), 3.9);
    }

    #[test]
    fn half_bounded_winding_follows_reference() {
        // Far up the open end, the angle is brought back within a turn of the reference.
        let near = wrap_toward(100.0, 0.1, 0.0, f64::INFINITY);
        assert!((0.0..=0.1 + TAU).contains(&near));
        assert!(((near - 100.0) / TAU - ((near - 100.0) / TAU).round()).abs() < 1e-9);

        // No winding of the angle fits the interval.
        assert_eq!(wrap_toward(2.0, 0.0, -0.5, 0.5), 2.0);
    }
}
