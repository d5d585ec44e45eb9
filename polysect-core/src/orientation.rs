/// Canonical orientations: rotations that stand a solid on a vertex, edge or face
use std::f64::consts::FRAC_PI_2;

use nalgebra::{UnitQuaternion, Vector3};

use crate::polyhedron::Polyhedron;

/// Which feature of the solid should point up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationTarget {
    /// Vertex `up` on the vertical axis, vertex `reference` in the xy-plane
    Vertex { up: usize, reference: usize },
    /// Edge midpoint on the vertical axis, edge parallel to x
    Edge(usize),
    /// Face centroid on the vertical axis, the face's `slot`-th vertex in the xy-plane
    Face { face: usize, slot: usize },
}

impl OrientationTarget {
    /// The poses offered by the viewers' menus
    pub const VERTEX: Self = OrientationTarget::Vertex { up: 0, reference: 1 };
    pub const EDGE: Self = OrientationTarget::Edge(0);
    pub const FACE: Self = OrientationTarget::Face { face: 0, slot: 0 };

    pub fn rotation(&self, polyhedron: &Polyhedron) -> UnitQuaternion<f64> {
        match *self {
            OrientationTarget::Vertex { up, reference } => polyhedron.vertex_orientation(up, reference),
            OrientationTarget::Edge(edge) => polyhedron.edge_orientation(edge),
            OrientationTarget::Face { face, slot } => polyhedron.face_orientation(face, slot),
        }
    }
}

/// Rotation taking `up` onto +Y and the part of `reference` orthogonal to
/// `up` onto +X.
///
/// The frame is built the way a camera looks along `up`; the fixed Euler
/// correction then swings the look axis (+Z) onto the vertical axis.
///
/// `up` must be non-zero and `reference` must not be parallel to it.
pub fn canonical_orientation(up: &Vector3<f64>, reference: &Vector3<f64>) -> UnitQuaternion<f64> {
    let v0 = up.normalize();
    let v1 = (reference - v0 * v0.dot(reference)).normalize();
    let look = UnitQuaternion::face_towards(&v0, &v1);
    let remap = UnitQuaternion::from_euler_angles(-FRAC_PI_2, -FRAC_PI_2, 0.0);
    remap * look.inverse()
}

impl Polyhedron {
    /// Stand the solid on vertex `up`, with vertex `reference` in the xy-plane.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn vertex_orientation(&self, up: usize, reference: usize) -> UnitQuaternion<f64> {
        let vertices = self.vertices();
        canonical_orientation(&vertices[up].coords, &vertices[reference].coords)
    }

    /// Stand the solid on the midpoint of `edge`, the edge itself along x.
    ///
    /// # Panics
    ///
    /// Panics if `edge` is out of range.
    pub fn edge_orientation(&self, edge: usize) -> UnitQuaternion<f64> {
        let e = self.edges()[edge];
        let (pa, pb) = (self.vertices()[e.a], self.vertices()[e.b]);
        let midpoint = pa.coords.lerp(&pb.coords, 0.5);
        canonical_orientation(&midpoint, &(pb - pa))
    }

    /// Stand the solid on the centroid of `face`, its `slot`-th vertex in the xy-plane.
    ///
    /// # Panics
    ///
    /// Panics if `face` or `slot` is out of range.
    pub fn face_orientation(&self, face: usize, slot: usize) -> UnitQuaternion<f64> {
        let center = self.face_centroid(face);
        let corner = self.vertices()[self.faces()[face][slot]];
        canonical_orientation(&center.coords, &(corner - center))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solids::SolidKind;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_canonical_axes() {
        let up = Vector3::new(1.0, 2.0, -0.5);
        let reference = Vector3::new(0.3, -1.0, 2.0);
        let q = canonical_orientation(&up, &reference);

        assert_relative_eq!(q * up.normalize(), Vector3::y(), epsilon = 1e-12);
        let along = reference - up.normalize() * up.normalize().dot(&reference);
        assert_relative_eq!(q * along.normalize(), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_identity_when_already_canonical() {
        let q = canonical_orientation(&Vector3::y(), &Vector3::x());
        for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
            assert_relative_eq!(q * axis, axis, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_vertex_orientation() {
        for kind in SolidKind::ALL {
            let solid = kind.build().unwrap();
            let q = solid.vertex_orientation(0, 1);
            let v0 = solid.vertices()[0].coords;
            let v1 = solid.vertices()[1].coords;

            let top = q * v0;
            assert_relative_eq!(top.normalize(), Vector3::y(), epsilon = 1e-12);
            // vertex 1 ends up in the xy-plane, on the +x side
            let second = q * v1;
            assert_relative_eq!(second.z, 0.0, epsilon = 1e-12);
            assert!(second.x > 0.0);
        }
    }

    #[test]
    fn test_edge_orientation() {
        let solid = SolidKind::Cube.build().unwrap();
        for index in 0..solid.edge_count() {
            let q = solid.edge_orientation(index);
            let e = solid.edges()[index];
            let (pa, pb) = (q * solid.vertices()[e.a], q * solid.vertices()[e.b]);
            // edge is horizontal, parallel to x, centred over the origin
            assert_relative_eq!((pb - pa).normalize(), Vector3::x(), epsilon = 1e-12);
            assert_relative_eq!(pa.y, pb.y, epsilon = 1e-12);
            assert_relative_eq!(pa.z + pb.z, 0.0, epsilon = 1e-12);
            assert_relative_eq!(pa.y, 2f64.sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_face_orientation_puts_face_on_top() {
        for kind in SolidKind::ALL.into_iter().filter(SolidKind::is_convex) {
            let solid = kind.build().unwrap();
            let q = solid.face_orientation(0, 0);
            let normal = q * solid.face_normal(0);
            assert_relative_eq!(normal, Vector3::y(), epsilon = 1e-12);

            let face = &solid.faces()[0];
            let height = (q * solid.vertices()[face[0]]).y;
            for &i in face {
                assert_relative_eq!((q * solid.vertices()[i]).y, height, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_face_slots_differ_by_turns_about_the_normal() {
        let solid = SolidKind::Dodecahedron.build().unwrap();
        let k = solid.faces()[0].len();
        let base = solid.face_orientation(0, 0);
        for slot in 1..k {
            let relative = solid.face_orientation(0, slot) * base.inverse();
            // pure turn about the vertical axis
            assert_relative_eq!(relative * Vector3::y(), Vector3::y(), epsilon = 1e-12);
            let turn = 2.0 * PI * slot as f64 / k as f64;
            assert_relative_eq!(relative.angle(), turn.min(2.0 * PI - turn), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_targets_resolve_to_queries() {
        let solid = SolidKind::Octahedron.build().unwrap();
        assert_eq!(OrientationTarget::VERTEX.rotation(&solid), solid.vertex_orientation(0, 1));
        assert_eq!(OrientationTarget::EDGE.rotation(&solid), solid.edge_orientation(0));
        assert_eq!(OrientationTarget::FACE.rotation(&solid), solid.face_orientation(0, 0));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_face_panics() {
        let solid = SolidKind::Tetrahedron.build().unwrap();
        solid.face_orientation(4, 0);
    }
}
