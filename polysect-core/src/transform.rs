/// World placement of a solid and animated orientation changes
use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};

/// Rotation about the solid's centre followed by a translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub rotation: UnitQuaternion<f64>,
    pub translation: Vector3<f64>,
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Rotate in world space: `delta` is applied after the current rotation
    pub fn rotate(&mut self, delta: &UnitQuaternion<f64>) {
        self.rotation = delta * self.rotation;
    }

    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn matrix(&self) -> Matrix4<f64> {
        self.isometry().to_homogeneous()
    }

    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation * point + self.translation
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Interpolates a rotation over a fixed number of ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationTween {
    from: UnitQuaternion<f64>,
    to: UnitQuaternion<f64>,
    frame: u32,
    frames: u32,
}

impl OrientationTween {
    pub fn new(from: UnitQuaternion<f64>, to: UnitQuaternion<f64>, frames: u32) -> Self {
        Self {
            from,
            to,
            frame: 0,
            frames: frames.max(1),
        }
    }

    pub fn target(&self) -> UnitQuaternion<f64> {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.frames
    }

    /// Advance one tick and return the rotation to show
    pub fn step(&mut self) -> UnitQuaternion<f64> {
        self.frame = (self.frame + 1).min(self.frames);
        if self.is_finished() {
            return self.to;
        }
        let t = self.frame as f64 / self.frames as f64;
        // try_slerp gives up when the two rotations nearly coincide; take the target
        self.from.try_slerp(&self.to, t, 1e-9).unwrap_or(self.to)
    }
}
