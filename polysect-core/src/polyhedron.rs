/// Polyhedron templates: vertex coordinates, wound faces and the edge graph
use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::error::{PolyhedronError, Result};

/// Order-independent key for an undirected edge `{a, b}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    lo: usize,
    hi: usize,
}

impl EdgeKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }
}

/// An undirected edge, stored in the direction it was first walked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.a, self.b)
    }
}

#[derive(Debug, Clone, Copy)]
struct EdgeSlot {
    index: usize,
    from: usize,
    paired: bool,
}

/// Immutable description of a solid.
///
/// Faces are cyclic vertex lists wound counter-clockwise when seen from
/// outside. Every directed boundary edge `(a, b)` has its reverse `(b, a)` in
/// exactly one other face; [`Polyhedron::new`] rejects data that breaks this.
#[derive(Debug, Clone)]
pub struct Polyhedron {
    vertices: Vec<Point3<f64>>,
    faces: Vec<Vec<usize>>,
    edges: Vec<Edge>,
    face_edges: Vec<Vec<usize>>,
    edge_lookup: FxHashMap<EdgeKey, usize>,
}

impl Polyhedron {
    /// Build a polyhedron and derive its edges from the faces
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Result<Self> {
        let count = vertices.len();
        for (face, f) in faces.iter().enumerate() {
            if f.len() < 3 {
                return Err(PolyhedronError::DegenerateFace { face, len: f.len() });
            }
            if let Some(&vertex) = f.iter().find(|&&v| v >= count) {
                return Err(PolyhedronError::VertexOutOfRange {
                    face,
                    vertex,
                    count,
                });
            }
        }

        let (edges, face_edges, edge_lookup) = compute_edges(&faces)?;

        Ok(Self {
            vertices,
            faces,
            edges,
            face_edges,
            edge_lookup,
        })
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Edge indices along the boundary of `face`, in walk order.
    ///
    /// The walk starts with the edge closing the cycle (last vertex to first
    /// vertex), then follows the face's vertex order.
    pub fn face_edges(&self, face: usize) -> &[usize] {
        &self.face_edges[face]
    }

    /// Index of the edge joining `a` and `b`, in either order
    pub fn edge_index(&self, a: usize, b: usize) -> Option<usize> {
        self.edge_lookup.get(&EdgeKey::new(a, b)).copied()
    }

    /// Distance of the farthest vertex from the origin
    pub fn circumradius(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.coords.norm())
            .fold(0.0, f64::max)
    }

    pub fn face_centroid(&self, face: usize) -> Point3<f64> {
        let f = &self.faces[face];
        let sum = f
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + self.vertices[i].coords);
        Point3::from(sum / f.len() as f64)
    }

    /// Unit outward normal of `face` (Newell's method over the winding)
    pub fn face_normal(&self, face: usize) -> Vector3<f64> {
        let f = &self.faces[face];
        let mut normal = Vector3::zeros();
        for (k, &i) in f.iter().enumerate() {
            let p = self.vertices[i];
            let q = self.vertices[f[(k + 1) % f.len()]];
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
        }
        normal.normalize()
    }

    /// Local frame sitting on a face, used to place markers and labels.
    ///
    /// The returned matrix maps the origin to the face centroid (multiplied by
    /// `scale`), +X to the direction from the centroid towards the face's first
    /// vertex, +Y to the outward normal and +Z to their cross product.
    pub fn face_matrix(&self, face: usize, scale: f64) -> Matrix4<f64> {
        let center = self.face_centroid(face);
        let normal = self.face_normal(face);
        let first = self.vertices[self.faces[face][0]] - center;
        let e0 = (first - normal * normal.dot(&first)).normalize();
        let e2 = e0.cross(&normal);
        let origin = center.coords * scale;

        Matrix4::new(
            e0.x, normal.x, e2.x, origin.x,
            e0.y, normal.y, e2.y, origin.y,
            e0.z, normal.z, e2.z, origin.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

type EdgeTables = (Vec<Edge>, Vec<Vec<usize>>, FxHashMap<EdgeKey, usize>);

/// Derive the undirected edge list from the face boundaries.
///
/// Each directed edge claims its unordered slot the first time it is walked;
/// the only legal second visit is the opposite direction from another face.
fn compute_edges(faces: &[Vec<usize>]) -> Result<EdgeTables> {
    let mut slots: FxHashMap<EdgeKey, EdgeSlot> = FxHashMap::default();
    let mut edges = Vec::new();
    let mut face_edges = Vec::with_capacity(faces.len());

    for f in faces {
        let mut boundary = Vec::with_capacity(f.len());
        let mut from = f[f.len() - 1];
        for &to in f {
            let key = EdgeKey::new(from, to);
            let index = match slots.get_mut(&key) {
                None => {
                    let index = edges.len();
                    edges.push(Edge { a: from, b: to });
                    slots.insert(
                        key,
                        EdgeSlot {
                            index,
                            from,
                            paired: false,
                        },
                    );
                    index
                }
                Some(slot) => {
                    if slot.from == from || slot.paired {
                        return Err(PolyhedronError::InconsistentOrientation { from, to });
                    }
                    slot.paired = true;
                    slot.index
                }
            };
            boundary.push(index);
            from = to;
        }
        face_edges.push(boundary);
    }

    if let Some(edge) = edges.iter().find(|e| !slots[&e.key()].paired) {
        return Err(PolyhedronError::UnpairedEdge {
            from: edge.a,
            to: edge.b,
        });
    }

    let lookup = slots
        .into_iter()
        .map(|(key, slot)| (key, slot.index))
        .collect();

    Ok((edges, face_edges, lookup))
}
