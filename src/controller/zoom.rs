//! Provides [`ZoomStep`] settings and the distance-scaled step used by every dolly.

use bevy_reflect::Reflect;

/// Bound the size of a single zoom step, and how close the camera may get to its focus.
///
/// The step size grows linearly with the distance to the focus, so zooming feels the same whether
/// the camera is close to an object or far away from it.
#[derive(Debug, Clone, Reflect)]
pub struct ZoomStep {
    /// Step size used at or below [`ZoomStep::min_dist_to_target`].
    pub min_zoom_distance: f64,
    /// Step size used at or beyond one hundred times [`ZoomStep::min_dist_to_target`].
    pub max_zoom_distance: f64,
    /// The closest the camera may get to its focus point after a dolly. Zooming further pushes the
    /// focus point forward instead.
    pub min_dist_to_target: f64,
}

impl Default for ZoomStep {
    fn default() -> Self {
        Self {
            min_zoom_distance: 0.3,
            max_zoom_distance: 1.0,
            min_dist_to_target: 2.0,
        }
    }
}

impl ZoomStep {
    /// Ratio between the far and near interpolation thresholds.
    pub const FAR_RATIO: f64 = 100.0;

    /// Distance beyond which the step no longer grows.
    pub fn far(&self) -> f64 {
        self.min_dist_to_target * Self::FAR_RATIO
    }

    /// The signed change in radius for one zoom step of `units` taken at `radius`. Negative when
    /// `zoom_in`.
    pub fn step(&self, radius: f64, zoom_in: bool, units: f64) -> f64 {
        let near = self.min_dist_to_target;
        let far = self.far();
        let distance = if radius <= near {
            self.min_zoom_distance
        } else if radius >= far {
            self.max_zoom_distance
        } else {
            let slope = (self.max_zoom_distance - self.min_zoom_distance) / (far - near);
            self.min_zoom_distance + slope * (radius - near)
        };
        let signed = if zoom_in { -distance } else { distance };
        signed * units
    }
}
