/// Incremental builder for "points + edges + polygon faces" renderables.
///
/// A [`GeometricModel`] keeps an arena of backend handles, one per vertex
/// marker and one per edge cylinder. Each rebuild reuses the handles it
/// already holds, creates more when the new content is larger and releases
/// the trailing ones when it is smaller.
use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

use crate::plane::Plane;

/// Which renderable a backend call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Solid,
    Section,
}

/// The three kinds of geometry a model is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Vertices,
    Edges,
    Faces,
}

/// A sphere marking a vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexMarker {
    pub position: Point3<f64>,
    pub radius: f64,
}

/// A cylinder drawn between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInstance {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub radius: f64,
}

/// Placement of the unit cylinder (radius 1, height 1, axis +Y, centred on
/// the origin) that covers an edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderPose {
    pub isometry: Isometry3<f64>,
    pub scale: Vector3<f64>,
}

impl EdgeInstance {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn midpoint(&self) -> Point3<f64> {
        nalgebra::center(&self.start, &self.end)
    }

    pub fn cylinder_pose(&self) -> CylinderPose {
        let length = self.length();
        let rotation = if length > 0.0 {
            let direction = (self.end - self.start) / length;
            // antiparallel to +Y has no unique shortest rotation
            UnitQuaternion::rotation_between(&Vector3::y(), &direction).unwrap_or_else(|| {
                UnitQuaternion::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
            })
        } else {
            UnitQuaternion::identity()
        };

        CylinderPose {
            isometry: Isometry3::from_parts(self.midpoint().coords.into(), rotation),
            scale: Vector3::new(self.radius, length, self.radius),
        }
    }
}

/// Triangulated polygon data, ready to upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceBuffer {
    pub positions: Vec<Point3<f64>>,
    pub triangles: Vec<[u32; 3]>,
    pub face_count: usize,
}

impl FaceBuffer {
    pub fn clear(&mut self) {
        self.positions.clear();
        self.triangles.clear();
        self.face_count = 0;
    }

    /// Append a convex polygon as a triangle fan around its first point
    pub fn add_polygon(&mut self, points: &[Point3<f64>]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(points);
        for i in 2..points.len() as u32 {
            self.triangles.push([base, base + i - 1, base + i]);
        }
        self.face_count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.face_count == 0
    }
}

/// What a rendering backend must provide to display geometric models
pub trait RenderBackend {
    type Handle;

    fn create_vertex(&mut self, layer: Layer) -> Self::Handle;
    fn create_edge(&mut self, layer: Layer) -> Self::Handle;
    fn place_vertex(&mut self, handle: &Self::Handle, marker: &VertexMarker);
    fn place_edge(&mut self, handle: &Self::Handle, edge: &EdgeInstance);
    fn release(&mut self, handle: Self::Handle);
    fn upload_faces(&mut self, layer: Layer, faces: &FaceBuffer);
    fn set_visible(&mut self, layer: Layer, part: Part, visible: bool);
    fn set_transform(&mut self, layer: Layer, transform: &Isometry3<f64>);
    /// Discard the layer's faces on the positive side of `plane`, in world
    /// space; `None` draws them whole. Markers and edges are never clipped.
    fn set_clip_plane(&mut self, layer: Layer, plane: Option<&Plane>);
}

/// A renderable made of vertex markers, edge cylinders and polygon faces.
///
/// Content is replaced between [`begin_update`](Self::begin_update) and
/// [`end_update`](Self::end_update). A model is driven by one caller at a time
/// and updates do not nest.
pub struct GeometricModel<B: RenderBackend> {
    layer: Layer,
    vertices: Vec<B::Handle>,
    edges: Vec<B::Handle>,
    used_vertices: usize,
    used_edges: usize,
    faces: FaceBuffer,
    updating: bool,
    hidden: bool,
}

impl<B: RenderBackend> GeometricModel<B> {
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            vertices: Vec::new(),
            edges: Vec::new(),
            used_vertices: 0,
            used_edges: 0,
            faces: FaceBuffer::default(),
            updating: false,
            hidden: false,
        }
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn vertex_count(&self) -> usize {
        self.used_vertices
    }

    pub fn edge_count(&self) -> usize {
        self.used_edges
    }

    pub fn faces(&self) -> &FaceBuffer {
        &self.faces
    }

    /// Handles currently held, including ones a running update has not reused yet
    pub fn allocated(&self) -> (usize, usize) {
        (self.vertices.len(), self.edges.len())
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
            && (self.used_vertices > 0 || self.used_edges > 0 || !self.faces.is_empty())
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Hide or show the whole model without touching its content
    pub fn set_hidden(&mut self, backend: &mut B, hidden: bool) {
        self.hidden = hidden;
        if !self.updating {
            self.push_visibility(backend);
        }
    }

    fn push_visibility(&self, backend: &mut B) {
        let shown = !self.hidden;
        backend.set_visible(self.layer, Part::Vertices, shown && self.used_vertices > 0);
        backend.set_visible(self.layer, Part::Edges, shown && self.used_edges > 0);
        backend.set_visible(self.layer, Part::Faces, shown && !self.faces.is_empty());
    }

    pub fn begin_update(&mut self) {
        assert!(!self.updating, "begin_update called twice");
        self.updating = true;
        self.used_vertices = 0;
        self.used_edges = 0;
        self.faces.clear();
    }

    pub fn add_vertex(&mut self, backend: &mut B, position: Point3<f64>, radius: f64) -> usize {
        assert!(self.updating, "add_vertex outside begin_update/end_update");
        let index = self.used_vertices;
        if index == self.vertices.len() {
            self.vertices.push(backend.create_vertex(self.layer));
        }
        backend.place_vertex(&self.vertices[index], &VertexMarker { position, radius });
        self.used_vertices += 1;
        index
    }

    pub fn add_edge(
        &mut self,
        backend: &mut B,
        start: Point3<f64>,
        end: Point3<f64>,
        radius: f64,
    ) -> usize {
        assert!(self.updating, "add_edge outside begin_update/end_update");
        let index = self.used_edges;
        if index == self.edges.len() {
            self.edges.push(backend.create_edge(self.layer));
        }
        backend.place_edge(&self.edges[index], &EdgeInstance { start, end, radius });
        self.used_edges += 1;
        index
    }

    /// Add a convex polygon; it is fan-triangulated
    pub fn add_face(&mut self, points: &[Point3<f64>]) {
        assert!(self.updating, "add_face outside begin_update/end_update");
        self.faces.add_polygon(points);
    }

    /// Release unused handles, upload faces and update visibility
    pub fn end_update(&mut self, backend: &mut B) {
        assert!(self.updating, "end_update without begin_update");
        self.updating = false;

        for handle in self.vertices.drain(self.used_vertices..) {
            backend.release(handle);
        }
        for handle in self.edges.drain(self.used_edges..) {
            backend.release(handle);
        }

        if !self.faces.is_empty() {
            backend.upload_faces(self.layer, &self.faces);
        }
        self.push_visibility(backend);
    }

    /// Release every handle and hide the model
    pub fn dispose(mut self, backend: &mut B) {
        for handle in self.vertices.drain(..).chain(self.edges.drain(..)) {
            backend.release(handle);
        }
        for part in [Part::Vertices, Part::Edges, Part::Faces] {
            backend.set_visible(self.layer, part, false);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::{HashMap, HashSet};

    /// Backend double that records what the models ask for
    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        next: u32,
        pub live: HashSet<u32>,
        pub created: usize,
        pub markers: HashMap<u32, VertexMarker>,
        pub edges: HashMap<u32, EdgeInstance>,
        pub faces: HashMap<Layer, FaceBuffer>,
        pub visible: HashMap<(Layer, Part), bool>,
        pub transforms: HashMap<Layer, Isometry3<f64>>,
        pub clip_planes: HashMap<Layer, Option<Plane>>,
    }

    impl RecordingBackend {
        fn create(&mut self) -> u32 {
            self.next += 1;
            self.created += 1;
            self.live.insert(self.next);
            self.next
        }

        pub fn is_visible(&self, layer: Layer, part: Part) -> bool {
            self.visible.get(&(layer, part)).copied().unwrap_or(false)
        }
    }

    impl RenderBackend for RecordingBackend {
        type Handle = u32;

        fn create_vertex(&mut self, _layer: Layer) -> u32 {
            self.create()
        }

        fn create_edge(&mut self, _layer: Layer) -> u32 {
            self.create()
        }

        fn place_vertex(&mut self, handle: &u32, marker: &VertexMarker) {
            assert!(self.live.contains(handle));
            self.markers.insert(*handle, *marker);
        }

        fn place_edge(&mut self, handle: &u32, edge: &EdgeInstance) {
            assert!(self.live.contains(handle));
            self.edges.insert(*handle, *edge);
        }

        fn release(&mut self, handle: u32) {
            assert!(self.live.remove(&handle), "handle {handle} released twice");
            self.markers.remove(&handle);
            self.edges.remove(&handle);
        }

        fn upload_faces(&mut self, layer: Layer, faces: &FaceBuffer) {
            self.faces.insert(layer, faces.clone());
        }

        fn set_visible(&mut self, layer: Layer, part: Part, visible: bool) {
            self.visible.insert((layer, part), visible);
        }

        fn set_transform(&mut self, layer: Layer, transform: &Isometry3<f64>) {
            self.transforms.insert(layer, *transform);
        }

        fn set_clip_plane(&mut self, layer: Layer, plane: Option<&Plane>) {
            self.clip_planes.insert(layer, plane.copied());
        }
    }

    fn fill(model: &mut GeometricModel<RecordingBackend>, backend: &mut RecordingBackend, n: usize) {
        model.begin_update();
        for i in 0..n {
            let p = Point3::new(i as f64, 0.0, 0.0);
            model.add_vertex(backend, p, 0.1);
            model.add_edge(backend, p, p + Vector3::y(), 0.05);
        }
        model.end_update(backend);
    }

    #[test]
    fn test_arena_grows_and_trims() {
        let mut backend = RecordingBackend::default();
        let mut model = GeometricModel::new(Layer::Section);

        fill(&mut model, &mut backend, 5);
        assert_eq!(model.allocated(), (5, 5));
        assert_eq!(backend.live.len(), 10);

        // shrinking releases the trailing handles
        fill(&mut model, &mut backend, 2);
        assert_eq!(model.allocated(), (2, 2));
        assert_eq!(backend.live.len(), 4);
        assert_eq!(backend.created, 10);

        // growing again reuses the two survivors
        fill(&mut model, &mut backend, 3);
        assert_eq!(model.allocated(), (3, 3));
        assert_eq!(backend.created, 12);
        assert_eq!(backend.markers.len(), 3);
    }

    #[test]
    fn test_empty_model_is_hidden() {
        let mut backend = RecordingBackend::default();
        let mut model = GeometricModel::new(Layer::Section);

        fill(&mut model, &mut backend, 3);
        assert!(model.is_visible());
        assert!(backend.is_visible(Layer::Section, Part::Vertices));
        assert!(!backend.is_visible(Layer::Section, Part::Faces));

        fill(&mut model, &mut backend, 0);
        assert!(!model.is_visible());
        assert!(backend.live.is_empty());
        assert!(!backend.is_visible(Layer::Section, Part::Vertices));
        assert!(!backend.is_visible(Layer::Section, Part::Edges));
    }

    #[test]
    fn test_faces_are_fan_triangulated() {
        let mut backend = RecordingBackend::default();
        let mut model = GeometricModel::new(Layer::Solid);
        let square = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        model.begin_update();
        model.add_face(&square[..3]);
        model.add_face(&square);
        model.end_update(&mut backend);

        let faces = &backend.faces[&Layer::Solid];
        assert_eq!(faces.face_count, 2);
        assert_eq!(faces.positions.len(), 7);
        assert_eq!(faces.triangles, vec![[0, 1, 2], [3, 4, 5], [3, 5, 6]]);
        assert!(backend.is_visible(Layer::Solid, Part::Faces));
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut backend = RecordingBackend::default();
        let mut model = GeometricModel::new(Layer::Solid);
        fill(&mut model, &mut backend, 4);
        model.dispose(&mut backend);
        assert!(backend.live.is_empty());
        assert!(!backend.is_visible(Layer::Solid, Part::Edges));
    }

    #[test]
    fn test_hidden_model_keeps_its_content() {
        let mut backend = RecordingBackend::default();
        let mut model = GeometricModel::new(Layer::Solid);
        fill(&mut model, &mut backend, 3);

        model.set_hidden(&mut backend, true);
        assert!(!model.is_visible());
        assert!(!backend.is_visible(Layer::Solid, Part::Vertices));
        assert!(!backend.is_visible(Layer::Solid, Part::Edges));
        assert_eq!(model.vertex_count(), 3);

        // content rebuilt while hidden stays hidden
        fill(&mut model, &mut backend, 4);
        assert!(!backend.is_visible(Layer::Solid, Part::Edges));

        model.set_hidden(&mut backend, false);
        assert!(backend.is_visible(Layer::Solid, Part::Vertices));
        assert!(backend.is_visible(Layer::Solid, Part::Edges));
        assert!(!backend.is_visible(Layer::Solid, Part::Faces));
    }

    #[test]
    #[should_panic(expected = "outside begin_update")]
    fn test_add_outside_update_panics() {
        let mut backend = RecordingBackend::default();
        let mut model = GeometricModel::new(Layer::Solid);
        model.add_vertex(&mut backend, Point3::origin(), 1.0);
    }

    #[test]
    #[should_panic(expected = "begin_update called twice")]
    fn test_updates_do_not_nest() {
        let mut model: GeometricModel<RecordingBackend> = GeometricModel::new(Layer::Solid);
        model.begin_update();
        model.begin_update();
    }

    #[test]
    fn test_cylinder_pose() {
        let edge = EdgeInstance {
            start: Point3::new(1.0, 0.0, 0.0),
            end: Point3::new(1.0, 0.0, 4.0),
            radius: 0.5,
        };
        let pose = edge.cylinder_pose();
        assert_relative_eq!(pose.scale, Vector3::new(0.5, 4.0, 0.5));
        // the unit cylinder's end caps land on the edge endpoints
        let top = pose.isometry * Point3::new(0.0, 0.5 * pose.scale.y, 0.0);
        let bottom = pose.isometry * Point3::new(0.0, -0.5 * pose.scale.y, 0.0);
        assert_relative_eq!(top, edge.end, epsilon = 1e-12);
        assert_relative_eq!(bottom, edge.start, epsilon = 1e-12);
    }

    #[test]
    fn test_cylinder_pose_along_and_against_y() {
        let up = EdgeInstance {
            start: Point3::origin(),
            end: Point3::new(0.0, 2.0, 0.0),
            radius: 1.0,
        };
        assert_relative_eq!(up.cylinder_pose().isometry.rotation.angle(), 0.0);

        let down = EdgeInstance {
            start: Point3::new(0.0, 2.0, 0.0),
            end: Point3::origin(),
            radius: 1.0,
        };
        let pose = down.cylinder_pose();
        let top = pose.isometry * Point3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(top, down.end, epsilon = 1e-12);
    }
}
