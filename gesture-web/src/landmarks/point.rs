//! Single normalized landmark coordinate

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A single 3D landmark point (normalized coordinates)
///
/// `x` and `y` are in `[0, 1]` image space with `y` growing downward.
/// `z` is relative depth; more negative means closer to the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Image-plane projection used by every planar feature
    pub fn planar(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}
