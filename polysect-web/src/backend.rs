/// Scene store as flat instance buffers that JavaScript can upload to the
/// GPU as-is
use nalgebra::{Isometry3, Matrix4};
use polysect_core::{EdgeInstance, FaceBuffer, Layer, Part, Plane, RenderBackend, VertexMarker};

/// Instance matrix of one marker or edge cylinder, or `None` while unplaced
type Slot = Option<Matrix4<f64>>;

#[derive(Debug, Clone, Default)]
struct LayerBuffers {
    vertices: Vec<(usize, Slot)>,
    edges: Vec<(usize, Slot)>,
    faces: FaceBuffer,
    transform: Option<Isometry3<f64>>,
    clip: Option<Plane>,
    visible: [bool; 3],
}

/// Handle for an instance in a [`BufferBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceHandle {
    layer: Layer,
    part: Part,
    id: usize,
}

/// Scene store for the browser front-end
#[derive(Debug, Default)]
pub struct BufferBackend {
    solid: LayerBuffers,
    section: LayerBuffers,
    next_id: usize,
}

fn part_index(part: Part) -> usize {
    match part {
        Part::Vertices => 0,
        Part::Edges => 1,
        Part::Faces => 2,
    }
}

impl BufferBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffers(&self, layer: Layer) -> &LayerBuffers {
        match layer {
            Layer::Solid => &self.solid,
            Layer::Section => &self.section,
        }
    }

    fn buffers_mut(&mut self, layer: Layer) -> &mut LayerBuffers {
        match layer {
            Layer::Solid => &mut self.solid,
            Layer::Section => &mut self.section,
        }
    }

    fn slots_mut(&mut self, layer: Layer, part: Part) -> &mut Vec<(usize, Slot)> {
        let buffers = self.buffers_mut(layer);
        match part {
            Part::Edges => &mut buffers.edges,
            _ => &mut buffers.vertices,
        }
    }

    fn create(&mut self, layer: Layer, part: Part) -> InstanceHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.slots_mut(layer, part).push((id, None));
        InstanceHandle { layer, part, id }
    }

    fn place(&mut self, handle: &InstanceHandle, matrix: Matrix4<f64>) {
        if let Some(slot) = self
            .slots_mut(handle.layer, handle.part)
            .iter_mut()
            .find(|(id, _)| *id == handle.id)
        {
            slot.1 = Some(matrix);
        }
    }

    pub fn is_visible(&self, layer: Layer, part: Part) -> bool {
        self.buffers(layer).visible[part_index(part)]
    }

    pub fn instance_count(&self, layer: Layer, part: Part) -> usize {
        let buffers = self.buffers(layer);
        match part {
            Part::Vertices => buffers.vertices.len(),
            Part::Edges => buffers.edges.len(),
            Part::Faces => buffers.faces.face_count,
        }
    }

    /// Column-major 4x4 instance matrices of the placed markers or edges
    pub fn instance_matrices(&self, layer: Layer, part: Part) -> Vec<f32> {
        let buffers = self.buffers(layer);
        let slots = match part {
            Part::Vertices => &buffers.vertices,
            Part::Edges => &buffers.edges,
            Part::Faces => return Vec::new(),
        };
        slots
            .iter()
            .filter_map(|(_, m)| m.as_ref())
            .flat_map(|m| m.cast::<f32>().as_slice().to_vec())
            .collect()
    }

    /// Face positions as `[x, y, z, ...]` in the layer's local frame
    pub fn face_positions(&self, layer: Layer) -> Vec<f32> {
        self.buffers(layer)
            .faces
            .positions
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    pub fn face_indices(&self, layer: Layer) -> Vec<u32> {
        self.buffers(layer).faces.triangles.iter().flatten().copied().collect()
    }

    /// Column-major world transform of the layer, identity if never set
    pub fn transform(&self, layer: Layer) -> Vec<f32> {
        let isometry = self.buffers(layer).transform.unwrap_or_else(Isometry3::identity);
        isometry.to_homogeneous().cast::<f32>().as_slice().to_vec()
    }

    /// Clip plane of the layer's faces as `[nx, ny, nz, d]`, or empty when the
    /// faces are drawn whole. Fragments with `n·p + d > 0` are discarded.
    pub fn clip_plane(&self, layer: Layer) -> Vec<f64> {
        match &self.buffers(layer).clip {
            Some(plane) => vec![plane.normal.x, plane.normal.y, plane.normal.z, plane.offset],
            None => Vec::new(),
        }
    }
}

impl RenderBackend for BufferBackend {
    type Handle = InstanceHandle;

    fn create_vertex(&mut self, layer: Layer) -> InstanceHandle {
        self.create(layer, Part::Vertices)
    }

    fn create_edge(&mut self, layer: Layer) -> InstanceHandle {
        self.create(layer, Part::Edges)
    }

    fn place_vertex(&mut self, handle: &InstanceHandle, marker: &VertexMarker) {
        let matrix = Matrix4::new_translation(&marker.position.coords)
            * Matrix4::new_scaling(marker.radius);
        self.place(handle, matrix);
    }

    fn place_edge(&mut self, handle: &InstanceHandle, edge: &EdgeInstance) {
        let pose = edge.cylinder_pose();
        let matrix = pose.isometry.to_homogeneous() * Matrix4::new_nonuniform_scaling(&pose.scale);
        self.place(handle, matrix);
    }

    fn release(&mut self, handle: InstanceHandle) {
        self.slots_mut(handle.layer, handle.part)
            .retain(|(id, _)| *id != handle.id);
    }

    fn upload_faces(&mut self, layer: Layer, faces: &FaceBuffer) {
        self.buffers_mut(layer).faces = faces.clone();
    }

    fn set_visible(&mut self, layer: Layer, part: Part, visible: bool) {
        self.buffers_mut(layer).visible[part_index(part)] = visible;
    }

    fn set_transform(&mut self, layer: Layer, transform: &Isometry3<f64>) {
        self.buffers_mut(layer).transform = Some(*transform);
    }

    fn set_clip_plane(&mut self, layer: Layer, plane: Option<&Plane>) {
        self.buffers_mut(layer).clip = plane.copied();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_release_removes_instances() {
        let mut backend = BufferBackend::new();
        let a = backend.create_vertex(Layer::Solid);
        let b = backend.create_edge(Layer::Solid);
        assert_eq!(backend.instance_count(Layer::Solid, Part::Vertices), 1);
        assert_eq!(backend.instance_count(Layer::Solid, Part::Edges), 1);

        backend.release(a);
        assert_eq!(backend.instance_count(Layer::Solid, Part::Vertices), 0);
        backend.release(b);
        assert_eq!(backend.instance_count(Layer::Solid, Part::Edges), 0);
    }

    #[test]
    fn test_marker_matrix() {
        let mut backend = BufferBackend::new();
        let h = backend.create_vertex(Layer::Section);
        backend.place_vertex(
            &h,
            &VertexMarker {
                position: Point3::new(1.0, 2.0, 3.0),
                radius: 0.5,
            },
        );
        let m = backend.instance_matrices(Layer::Section, Part::Vertices);
        assert_eq!(m.len(), 16);
        assert_eq!(m[0], 0.5);
        assert_eq!(&m[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clip_plane_buffer() {
        let mut backend = BufferBackend::new();
        assert!(backend.clip_plane(Layer::Solid).is_empty());
        backend.set_clip_plane(Layer::Solid, Some(&Plane::horizontal(0.5)));
        assert_eq!(backend.clip_plane(Layer::Solid), vec![0.0, 1.0, 0.0, -0.5]);
        assert!(backend.clip_plane(Layer::Section).is_empty());
        backend.set_clip_plane(Layer::Solid, None);
        assert!(backend.clip_plane(Layer::Solid).is_empty());
    }

    #[test]
    fn test_unset_transform_is_identity() {
        let backend = BufferBackend::new();
        let t = backend.transform(Layer::Solid);
        assert_eq!(t.len(), 16);
        for (i, v) in t.iter().enumerate() {
            assert_eq!(*v, if i % 5 == 0 { 1.0 } else { 0.0 });
        }
    }
}
