/// Plane sections of a polyhedron's edge/face graph
use nalgebra::{Point3, Vector3};

use crate::plane::Plane;
use crate::polyhedron::Polyhedron;

/// Default nudge applied to signed distances when a vertex lies on the plane
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// A point where the plane crosses a polyhedron edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionPoint {
    pub position: Point3<f64>,
    /// Index of the crossed edge
    pub edge: usize,
    /// Endpoints of the crossed edge, as stored on the polyhedron
    pub vertices: (usize, usize),
}

/// A face whose boundary was crossed neither zero nor two times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceAnomaly {
    pub face: usize,
    pub crossings: usize,
}

/// Cross-section of a polyhedron by a plane.
///
/// Recomputed from scratch for every frame; nothing is carried over between
/// calls. Each segment joins the two crossing points found on one face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub points: Vec<SectionPoint>,
    pub segments: Vec<[usize; 2]>,
    pub anomalies: Vec<FaceAnomaly>,
}

/// Signed distance of every position to `plane`
pub fn signed_distances(positions: &[Point3<f64>], plane: &Plane) -> Vec<f64> {
    positions.iter().map(|p| plane.signed_distance(p)).collect()
}

/// Break exact plane/vertex incidences.
///
/// When some distance is exactly zero, every distance is shifted by
/// `epsilon`, capped at half the smallest strictly positive distance so no
/// vertex already above the plane moves onto it. Distances without zeros are
/// left untouched. Returns the shift that was applied, if any.
pub fn perturb_distances(distances: &mut [f64], epsilon: f64) -> Option<f64> {
    if !distances.iter().any(|&d| d == 0.0) {
        return None;
    }

    let smallest_positive = distances
        .iter()
        .copied()
        .filter(|&d| d > 0.0)
        .fold(f64::INFINITY, f64::min);
    let shift = epsilon.min(0.5 * smallest_positive);

    for d in distances.iter_mut() {
        *d += shift;
    }
    Some(shift)
}

impl Section {
    /// Cut `polyhedron`, whose vertices currently sit at `positions`, with `plane`.
    ///
    /// # Panics
    ///
    /// Panics if `positions` does not hold one point per polyhedron vertex.
    pub fn compute(polyhedron: &Polyhedron, positions: &[Point3<f64>], plane: &Plane) -> Self {
        Self::compute_with_epsilon(polyhedron, positions, plane, DEFAULT_EPSILON)
    }

    pub fn compute_with_epsilon(
        polyhedron: &Polyhedron,
        positions: &[Point3<f64>],
        plane: &Plane,
        epsilon: f64,
    ) -> Self {
        assert_eq!(
            positions.len(),
            polyhedron.vertex_count(),
            "one position per polyhedron vertex"
        );

        let mut distances = signed_distances(positions, plane);
        if let Some(shift) = perturb_distances(&mut distances, epsilon) {
            log::debug!("vertex on cutting plane, distances shifted by {shift:e}");
        }

        let mut section = Section::default();

        // crossing point of each edge, if the plane separates its endpoints
        let mut crossing = vec![None; polyhedron.edge_count()];
        for (index, edge) in polyhedron.edges().iter().enumerate() {
            let (da, db) = (distances[edge.a], distances[edge.b]);
            if da * db < 0.0 {
                let t = -da / (db - da);
                let (pa, pb) = (positions[edge.a], positions[edge.b]);
                crossing[index] = Some(section.points.len());
                section.points.push(SectionPoint {
                    position: pa + (pb - pa) * t,
                    edge: index,
                    vertices: (edge.a, edge.b),
                });
            }
        }

        for face in 0..polyhedron.face_count() {
            let hits: Vec<usize> = polyhedron
                .face_edges(face)
                .iter()
                .filter_map(|&e| crossing[e])
                .collect();

            match hits.as_slice() {
                [] => {}
                &[a, b] => section.segments.push([a, b]),
                _ => {
                    log::warn!("face {face} crossed {} times, no segment emitted", hits.len());
                    section.anomalies.push(FaceAnomaly {
                        face,
                        crossings: hits.len(),
                    });
                }
            }
        }

        section
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.points.iter().map(|p| p.position)
    }

    /// Number of segments touching each point
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.points.len()];
        for &[a, b] in &self.segments {
            degrees[a] += 1;
            degrees[b] += 1;
        }
        degrees
    }

    fn neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.points.len()];
        for &[a, b] in &self.segments {
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        neighbors
    }

    /// Chain the segments into ordered point loops.
    ///
    /// A convex cut yields a single closed loop. Chains that cannot be closed
    /// come back as open paths, walked from one free end to the other.
    pub fn loops(&self) -> Vec<Vec<usize>> {
        let neighbors = self.neighbors();
        let mut visited = vec![false; self.points.len()];
        let mut loops = Vec::new();

        // open chains first, so no walk starts in the middle of one
        let ends = (0..self.points.len()).filter(|&i| neighbors[i].len() == 1);
        let rest = (0..self.points.len()).filter(|&i| neighbors[i].len() != 1);
        for start in ends.chain(rest) {
            if visited[start] || neighbors[start].is_empty() {
                continue;
            }
            let mut path = vec![start];
            visited[start] = true;
            let mut current = start;
            while let Some(&next) = neighbors[current].iter().find(|&&n| !visited[n]) {
                visited[next] = true;
                path.push(next);
                current = next;
            }
            loops.push(path);
        }
        loops
    }

    /// True when the segments form exactly one simple closed polygon
    pub fn is_closed_polygon(&self) -> bool {
        !self.is_empty()
            && self.segments.len() == self.points.len()
            && self.degrees().iter().all(|&d| d == 2)
            && self.loops().len() == 1
    }

    /// Total area enclosed by the closed section loops; open chains add nothing
    pub fn area(&self) -> f64 {
        let neighbors = self.neighbors();
        self.loops()
            .iter()
            .filter(|path| path.len() >= 3)
            .filter(|path| neighbors[path[path.len() - 1]].contains(&path[0]))
            .map(|path| {
                let origin = self.points[path[0]].position;
                let mut normal = Vector3::zeros();
                for pair in path.windows(2).skip(1) {
                    let u = self.points[pair[0]].position - origin;
                    let v = self.points[pair[1]].position - origin;
                    normal += u.cross(&v);
                }
                normal.norm() * 0.5
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solids::SolidKind;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    fn section_of(kind: SolidKind, plane: Plane) -> Section {
        let solid = kind.build().unwrap();
        Section::compute(&solid, solid.vertices(), &plane)
    }

    #[test]
    fn test_cube_cut_through_the_middle() {
        let section = section_of(SolidKind::Cube, Plane::horizontal(0.0));
        assert_eq!(section.points.len(), 4);
        assert_eq!(section.segments.len(), 4);
        assert!(section.anomalies.is_empty());
        assert!(section.is_closed_polygon());

        for p in section.positions() {
            assert_relative_eq!(p.y, 0.0);
            assert_relative_eq!(p.x.abs(), 1.0);
            assert_relative_eq!(p.z.abs(), 1.0);
        }
        for &[a, b] in &section.segments {
            let len = (section.points[a].position - section.points[b].position).norm();
            assert_relative_eq!(len, 2.0, epsilon = 1e-12);
        }
        assert_relative_eq!(section.area(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_crossings_come_from_vertical_edges() {
        let solid = SolidKind::Cube.build().unwrap();
        let section = Section::compute(&solid, solid.vertices(), &Plane::horizontal(0.25));
        for point in &section.points {
            let (a, b) = point.vertices;
            let (pa, pb) = (solid.vertices()[a], solid.vertices()[b]);
            assert_eq!(pa.x, pb.x);
            assert_eq!(pa.z, pb.z);
            assert_eq!(solid.edge_index(a, b), Some(point.edge));
            assert_relative_eq!(point.position.y, 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_plane_missing_the_solid() {
        for kind in SolidKind::ALL {
            let above = section_of(kind, Plane::horizontal(10.0));
            let below = section_of(kind, Plane::horizontal(-10.0));
            assert!(above.is_empty() && above.segments.is_empty());
            assert!(below.is_empty() && below.segments.is_empty());
        }
    }

    #[test]
    fn test_convex_cuts_are_closed_polygons() {
        let normals = [
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.3, 1.0, -0.2),
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(-0.7, 0.1, 0.5),
        ];
        for kind in SolidKind::ALL.into_iter().filter(SolidKind::is_convex) {
            let solid = kind.build().unwrap();
            for normal in normals {
                let normal = normal.normalize();
                let reach = solid
                    .vertices()
                    .iter()
                    .map(|v| normal.dot(&v.coords).abs())
                    .fold(0.0, f64::max);
                for step in 1..10 {
                    let height = reach * (step as f64 / 5.0 - 1.0) * 0.97;
                    let plane = Plane::new(normal, -height);
                    let section = Section::compute(&solid, solid.vertices(), &plane);
                    assert!(
                        section.is_closed_polygon(),
                        "{kind} normal {normal:?} height {height}"
                    );
                    assert!(section.anomalies.is_empty());
                    assert!(section.area() > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_rotated_solid_is_cut_in_world_space() {
        let solid = SolidKind::Octahedron.build().unwrap();
        let rotation = UnitQuaternion::from_euler_angles(0.4, -1.1, 0.3);
        let positions: Vec<_> = solid
            .vertices()
            .iter()
            .map(|v| rotation * v + Vector3::new(0.0, 0.2, 0.0))
            .collect();
        let section = Section::compute(&solid, &positions, &Plane::horizontal(0.0));
        assert!(section.is_closed_polygon());
        for p in section.positions() {
            assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_loops_follow_segments() {
        let section = section_of(SolidKind::Dodecahedron, Plane::new(Vector3::new(0.2, 1.0, 0.1), 0.3));
        let loops = section.loops();
        assert_eq!(loops.len(), 1);
        let path = &loops[0];
        assert_eq!(path.len(), section.points.len());
        let joined = |a: usize, b: usize| {
            section
                .segments
                .iter()
                .any(|&[s, t]| (s, t) == (a, b) || (s, t) == (b, a))
        };
        for pair in path.windows(2) {
            assert!(joined(pair[0], pair[1]));
        }
        assert!(joined(path[path.len() - 1], path[0]));
    }

    #[test]
    fn test_plane_through_a_face() {
        // y = 1 contains the whole top face of the cube
        let section = section_of(SolidKind::Cube, Plane::horizontal(1.0));
        assert!(section.is_closed_polygon());
        assert_eq!(section.points.len(), 4);
        for p in section.positions() {
            assert_relative_eq!(p.y, 1.0, epsilon = 1e-6);
        }
        assert_relative_eq!(section.area(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_plane_through_a_vertex() {
        // octahedron apex at (0,1,0) touches the plane, all others are below
        let section = section_of(SolidKind::Octahedron, Plane::horizontal(1.0));
        assert!(section.is_closed_polygon());
        assert_eq!(section.points.len(), 4);
        for p in section.positions() {
            assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        }
    }

    #[test]
    fn test_plane_through_vertices_on_both_sides() {
        // y = 0 passes through four octahedron vertices, apexes on either side
        let section = section_of(SolidKind::Octahedron, Plane::horizontal(0.0));
        assert!(section.is_closed_polygon());
        assert!(section.anomalies.is_empty());
        assert_eq!(section.points.len(), 4);
        assert_relative_eq!(section.area(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tetrahedron_vertex_just_below_the_plane() {
        let solid = SolidKind::Tetrahedron.build().unwrap();
        // put the plane a hair above vertex 3, along the vertex direction
        let apex = solid.vertices()[3];
        let normal = -apex.coords.normalize();
        let eps = 1e-6;
        let plane = Plane::from_point_normal(&(apex + normal * eps), normal);

        let distances = signed_distances(solid.vertices(), &plane);
        assert!(distances[3] < 0.0);
        assert!(distances[..3].iter().all(|&d| d > 0.0));

        let section = Section::compute(&solid, solid.vertices(), &plane);
        assert_eq!(section.points.len(), 3);
        assert_eq!(section.segments.len(), 3);
        assert!(section.is_closed_polygon());
        assert!(section.area() > 0.0);

        // the triangle is parallel to the face opposite vertex 3
        let normal_of_cut = {
            let p: Vec<_> = section.positions().collect();
            (p[1] - p[0]).cross(&(p[2] - p[0])).normalize()
        };
        let opposite = solid.face_normal(0);
        assert_relative_eq!(normal_of_cut.dot(&opposite).abs(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_perturbation_leaves_nonzero_distances_alone() {
        let mut distances = vec![-2.0, -1e-12, 3e-9, 0.5];
        let before = distances.clone();
        assert_eq!(perturb_distances(&mut distances, DEFAULT_EPSILON), None);
        assert_eq!(distances, before);
    }

    #[test]
    fn test_perturbation_is_capped_by_smallest_positive() {
        let mut distances = vec![-1.0, 0.0, 4e-9, 2.0];
        let shift = perturb_distances(&mut distances, DEFAULT_EPSILON).unwrap();
        assert_relative_eq!(shift, 2e-9);
        assert_relative_eq!(distances[1], 2e-9);
        assert!(distances[2] > 0.0);

        let mut distances = vec![0.0, -1.0];
        assert_eq!(perturb_distances(&mut distances, DEFAULT_EPSILON), Some(DEFAULT_EPSILON));
        assert_eq!(distances[0], DEFAULT_EPSILON);
    }

    #[test]
    fn test_star_solid_cuts_triangles_cleanly() {
        let solid = SolidKind::GreatIcosahedron.build().unwrap();
        let section = Section::compute(&solid, solid.vertices(), &Plane::horizontal(0.1));
        assert!(!section.is_empty());
        // triangles are crossed 0 or 2 times
        assert!(section.anomalies.is_empty());
        for &[a, b] in &section.segments {
            assert_ne!(a, b);
        }
    }

    /// Prism over an L-shaped hexagon, one unit tall
    fn l_prism() -> Polyhedron {
        let outline = [(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)];
        let mut vertices: Vec<_> = outline.iter().map(|&(x, z)| Point3::new(x, 0.0, z)).collect();
        vertices.extend(outline.iter().map(|&(x, z)| Point3::new(x, 1.0, z)));

        let mut faces = vec![vec![0, 1, 2, 3, 4, 5], vec![11, 10, 9, 8, 7, 6]];
        for i in 0..6 {
            let j = (i + 1) % 6;
            faces.push(vec![j, i, i + 6, j + 6]);
        }
        Polyhedron::new(vertices, faces).unwrap()
    }

    #[test]
    fn test_concave_faces_report_anomalies() {
        let solid = l_prism();
        // x + z = 2.5 clips both arms of the L: each cap is crossed four times
        let plane = Plane::new(Vector3::new(1.0, 0.0, 1.0), -2.5);
        let section = Section::compute(&solid, solid.vertices(), &plane);

        assert_eq!(
            section.anomalies,
            vec![
                FaceAnomaly { face: 0, crossings: 4 },
                FaceAnomaly { face: 1, crossings: 4 },
            ]
        );
        assert_eq!(section.points.len(), 8);
        assert_eq!(section.segments.len(), 4);
        // only the side walls contribute segments, each running bottom to top
        for &[a, b] in &section.segments {
            let (pa, pb) = (section.points[a].position, section.points[b].position);
            assert_relative_eq!((pa.y - pb.y).abs(), 1.0, epsilon = 1e-12);
        }
        assert!(!section.is_closed_polygon());
        assert_eq!(section.loops().len(), 4);
        assert_relative_eq!(section.area(), 0.0);
    }

    #[test]
    fn test_open_chain_is_walked_end_to_end() {
        let point = |x: f64, edge: usize| SectionPoint {
            position: Point3::new(x, 0.0, x * x),
            edge,
            vertices: (edge, edge + 1),
        };
        let section = Section {
            points: vec![point(0.0, 0), point(1.0, 1), point(-1.0, 2)],
            segments: vec![[0, 1], [0, 2]],
            anomalies: Vec::new(),
        };
        assert_eq!(section.loops(), vec![vec![1, 0, 2]]);
        assert!(!section.is_closed_polygon());
        assert_relative_eq!(section.area(), 0.0);
    }

    #[test]
    #[should_panic(expected = "one position per polyhedron vertex")]
    fn test_position_count_must_match() {
        let solid = SolidKind::Cube.build().unwrap();
        Section::compute(&solid, &solid.vertices()[..4], &Plane::default());
    }
}
