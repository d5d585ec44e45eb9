/// Camera projection and flattening of sections onto their plane
use nalgebra::{Matrix4, Point2, Point3, UnitQuaternion, Vector3};

use crate::plane::Plane;
use crate::section::Section;

/// Camera configuration for 3D rendering
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera looking at the origin slightly from above, far enough back to
    /// frame a solid scaled to radius ~3.5 travelling along the vertical axis
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(7.0, 4.0, 12.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Turn a rotation given in camera axes into the same turn in world axes.
    ///
    /// Camera x points right on screen and camera y up, so a rotation about
    /// local x always tips the solid towards or away from the viewer.
    pub fn to_world_rotation(&self, local: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        let view = UnitQuaternion::look_at_rh(
            &(self.target - self.position).cast::<f64>(),
            &self.up.cast::<f64>(),
        );
        view.inverse() * local * view
    }

    /// Project a world-space point to 2D screen space.
    ///
    /// Returns `(x, y, depth)`, or `None` when the point falls outside the
    /// view volume.
    pub fn project_to_screen(&self, point: &Point3<f32>, width: u32, height: u32) -> Option<(f32, f32, f32)> {
        let clip = self.projection_matrix() * self.view_matrix() * point.to_homogeneous();

        // Points behind the camera or on its plane have no screen position
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.iter().any(|c| !(-1.0..=1.0).contains(c)) {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Coordinate axis dropped when flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Flattens section points by dropping the axis closest to the plane normal.
///
/// A horizontal plane keeps `(x, z)`; the other planes keep the remaining two
/// coordinates in cyclic order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatProjector {
    pub dropped: Axis,
}

impl FlatProjector {
    pub fn for_plane(plane: &Plane) -> Self {
        let n = plane.normal.abs();
        let dropped = if n.y >= n.x && n.y >= n.z {
            Axis::Y
        } else if n.x >= n.z {
            Axis::X
        } else {
            Axis::Z
        };
        Self { dropped }
    }

    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        match self.dropped {
            Axis::X => Point2::new(point.y, point.z),
            Axis::Y => Point2::new(point.x, point.z),
            Axis::Z => Point2::new(point.x, point.y),
        }
    }

    pub fn project_section(&self, section: &Section) -> Vec<Point2<f64>> {
        section.positions().map(|p| self.project(&p)).collect()
    }
}

/// Maps flattened section points to pixels of a panel: origin at the panel
/// centre, one world unit = `scale * width` pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelMapping {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl PanelMapping {
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        Self { width, height, scale }
    }

    pub fn to_panel(&self, point: &Point2<f64>) -> Point2<f64> {
        let s = self.scale * self.width;
        Point2::new(self.width / 2.0 + point.x * s, self.height / 2.0 + point.y * s)
    }
}
