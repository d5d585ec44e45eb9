/// Scene store behind the mesh-building contract
use nalgebra::{Isometry3, Point3};
use polysect_core::{EdgeInstance, FaceBuffer, Layer, Part, Plane, RenderBackend, VertexMarker};

#[derive(Debug, Clone, Copy)]
enum Instance {
    Vertex(VertexMarker),
    Edge(EdgeInstance),
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    layer: Layer,
    instance: Option<Instance>,
}

/// Per-layer state: faces, visibility, world transform and clip plane
#[derive(Debug, Clone)]
struct LayerState {
    faces: FaceBuffer,
    transform: Isometry3<f64>,
    clip: Option<Plane>,
    vertices_visible: bool,
    edges_visible: bool,
    faces_visible: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            faces: FaceBuffer::default(),
            transform: Isometry3::identity(),
            clip: None,
            vertices_visible: false,
            edges_visible: false,
            faces_visible: false,
        }
    }
}

/// Keeps everything the models place, for the rasterizer to draw.
///
/// Handles index a slot table; released slots are recycled.
#[derive(Debug, Default)]
pub struct TerminalBackend {
    slots: Vec<Slot>,
    free: Vec<usize>,
    solid: LayerState,
    section: LayerState,
}

impl TerminalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn layer(&self, layer: Layer) -> &LayerState {
        match layer {
            Layer::Solid => &self.solid,
            Layer::Section => &self.section,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut LayerState {
        match layer {
            Layer::Solid => &mut self.solid,
            Layer::Section => &mut self.section,
        }
    }

    fn allocate(&mut self, layer: Layer) -> usize {
        let slot = Slot {
            layer,
            instance: None,
        };
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = slot;
                index
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    pub fn live_handles(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Visible faces of `layer` as world-space triangles, cut back to the
    /// layer's clip plane
    pub fn triangles(&self, layer: Layer) -> Vec<[Point3<f64>; 3]> {
        let state = self.layer(layer);
        if !state.faces_visible {
            return Vec::new();
        }
        let p = &state.faces.positions;
        let world = state
            .faces
            .triangles
            .iter()
            .map(|&[a, b, c]| [a, b, c].map(|i| state.transform * p[i as usize]));
        match &state.clip {
            None => world.collect(),
            Some(plane) => world.flat_map(|t| clip_triangle(&t, plane)).collect(),
        }
    }

    /// Visible edges of `layer` as world-space segments
    pub fn segments(&self, layer: Layer) -> Vec<(Point3<f64>, Point3<f64>)> {
        let state = self.layer(layer);
        if !state.edges_visible {
            return Vec::new();
        }
        self.slots
            .iter()
            .filter(|slot| slot.layer == layer)
            .filter_map(|slot| match slot.instance {
                Some(Instance::Edge(edge)) => {
                    Some((state.transform * edge.start, state.transform * edge.end))
                }
                _ => None,
            })
            .collect()
    }

    /// Visible vertex markers of `layer`, in world space
    pub fn markers(&self, layer: Layer) -> Vec<Point3<f64>> {
        let state = self.layer(layer);
        if !state.vertices_visible {
            return Vec::new();
        }
        self.slots
            .iter()
            .filter(|slot| slot.layer == layer)
            .filter_map(|slot| match slot.instance {
                Some(Instance::Vertex(marker)) => Some(state.transform * marker.position),
                _ => None,
            })
            .collect()
    }
}

/// Keep the part of `triangle` on the non-positive side of `plane`, fanned
/// back into triangles
fn clip_triangle(triangle: &[Point3<f64>; 3], plane: &Plane) -> Vec<[Point3<f64>; 3]> {
    let mut kept = Vec::with_capacity(4);
    for i in 0..3 {
        let (a, b) = (triangle[i], triangle[(i + 1) % 3]);
        let (da, db) = (plane.signed_distance(&a), plane.signed_distance(&b));
        if da <= 0.0 {
            kept.push(a);
        }
        if da * db < 0.0 {
            kept.push(a + (b - a) * (da / (da - db)));
        }
    }
    (1..kept.len().saturating_sub(1))
        .map(|i| [kept[0], kept[i], kept[i + 1]])
        .collect()
}

impl RenderBackend for TerminalBackend {
    type Handle = usize;

    fn create_vertex(&mut self, layer: Layer) -> usize {
        self.allocate(layer)
    }

    fn create_edge(&mut self, layer: Layer) -> usize {
        self.allocate(layer)
    }

    fn place_vertex(&mut self, handle: &usize, marker: &VertexMarker) {
        self.slots[*handle].instance = Some(Instance::Vertex(*marker));
    }

    fn place_edge(&mut self, handle: &usize, edge: &EdgeInstance) {
        self.slots[*handle].instance = Some(Instance::Edge(*edge));
    }

    fn release(&mut self, handle: usize) {
        self.slots[handle].instance = None;
        self.free.push(handle);
    }

    fn upload_faces(&mut self, layer: Layer, faces: &FaceBuffer) {
        self.layer_mut(layer).faces = faces.clone();
    }

    fn set_visible(&mut self, layer: Layer, part: Part, visible: bool) {
        let state = self.layer_mut(layer);
        match part {
            Part::Vertices => state.vertices_visible = visible,
            Part::Edges => state.edges_visible = visible,
            Part::Faces => state.faces_visible = visible,
        }
    }

    fn set_transform(&mut self, layer: Layer, transform: &Isometry3<f64>) {
        self.layer_mut(layer).transform = *transform;
    }

    fn set_clip_plane(&mut self, layer: Layer, plane: Option<&Plane>) {
        self.layer_mut(layer).clip = plane.copied();
    }
}
