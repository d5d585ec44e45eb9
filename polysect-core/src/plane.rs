/// Cutting planes in implicit form
use nalgebra::{Point3, Vector3};

/// The plane `{p : normal · p + offset = 0}`.
///
/// The normal does not have to be unit length; signed distances are then
/// scaled by its norm, which is harmless for classifying sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub offset: f64,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Plane through `point` with the given normal
    pub fn from_point_normal(point: &Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            normal,
            offset: -normal.dot(&point.coords),
        }
    }

    /// The horizontal plane `y = height`, positive side above
    pub fn horizontal(height: f64) -> Self {
        Self::new(Vector3::y(), -height)
    }

    /// `normal · p + offset`: positive above the plane, negative below
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.offset
    }

    pub fn normalized(&self) -> Self {
        let norm = self.normal.norm();
        Self {
            normal: self.normal / norm,
            offset: self.offset / norm,
        }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::horizontal(0.0)
    }
}
