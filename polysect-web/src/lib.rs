/// WASM-facing section viewer.
///
/// JavaScript owns the canvas and the draw calls; this crate owns the solid,
/// the cutting plane and the section, and hands out flat buffers each frame.
use nalgebra::{Point3, UnitQuaternion, Vector3};
use polysect_core::{
    Camera, Layer, OrientationTarget, PanelMapping, Part, PolyhedronError, SectionViewer, SolidKind, ViewerConfig,
};
use wasm_bindgen::prelude::*;

pub mod backend;

pub use backend::BufferBackend;

/// Forward a status line to the browser console, or to the log facade natively
fn status(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    log::info!("{message}");
}

fn to_js(err: PolyhedronError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Orientation named by a UI button: `vertex`, `edge` or `face`
pub fn parse_orientation(kind: &str) -> Option<OrientationTarget> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "vertex" | "v" => Some(OrientationTarget::VERTEX),
        "edge" | "e" => Some(OrientationTarget::EDGE),
        "face" | "f" => Some(OrientationTarget::FACE),
        _ => None,
    }
}

#[wasm_bindgen]
pub struct WebSectionViewer {
    viewer: SectionViewer<BufferBackend>,
    backend: BufferBackend,
    camera: Camera,
}

#[wasm_bindgen]
impl WebSectionViewer {
    /// Start on the named solid, or the cube when no name is given
    #[wasm_bindgen(constructor)]
    pub fn new(name: Option<String>) -> Result<WebSectionViewer, JsValue> {
        Self::with_solid(name.as_deref()).map_err(to_js)
    }

    /// Swap the displayed solid; accepts names and hotkeys
    pub fn set_solid(&mut self, name: &str) -> Result<(), JsValue> {
        self.select(name).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn solid(&self) -> String {
        self.viewer.kind().to_string()
    }

    pub fn set_section_level(&mut self, value: f64) {
        self.viewer.set_section_level(value);
    }

    #[wasm_bindgen(getter)]
    pub fn section_level(&self) -> f64 {
        self.viewer.section_level()
    }

    /// Start turning the solid onto a vertex, edge or face
    pub fn orient(&mut self, kind: &str) -> Result<(), JsValue> {
        let target = parse_orientation(kind)
            .ok_or_else(|| JsValue::from_str(&format!("unknown orientation: {kind}")))?;
        self.viewer.orient(target);
        Ok(())
    }

    /// Drag rotation in screen axes: `dx` turns about the screen's vertical,
    /// `dy` about its horizontal
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        let local = UnitQuaternion::from_scaled_axis(Vector3::new(dy, dx, 0.0));
        self.viewer.rotate(&self.camera.to_world_rotation(&local));
    }

    /// Where the page's camera sits; it always looks at the origin
    pub fn set_camera_position(&mut self, x: f64, y: f64, z: f64) {
        self.camera.position = Point3::new(x as f32, y as f32, z as f32);
    }

    pub fn set_solid_visible(&mut self, visible: bool) {
        self.viewer.set_solid_visible(visible, &mut self.backend);
    }

    #[wasm_bindgen(getter)]
    pub fn solid_visible(&self) -> bool {
        self.viewer.solid_visible()
    }

    #[wasm_bindgen(getter)]
    pub fn is_animating(&self) -> bool {
        self.viewer.is_animating()
    }

    /// Advance one frame; returns the number of section points
    pub fn tick(&mut self) -> u32 {
        let section = self.viewer.tick(&mut self.backend);
        let count = section.points.len() as u32;
        let anomalies = section.anomalies.len();
        if anomalies > 0 {
            status(&format!("{anomalies} face(s) crossed an unexpected number of times"));
        }
        count
    }

    /// Flattened section points as `[x, y, x, y, ...]`
    pub fn section_points_2d(&self) -> Vec<f64> {
        self.viewer
            .flat_section()
            .points
            .iter()
            .flat_map(|p| [p.x, p.y])
            .collect()
    }

    /// Flattened section points in canvas pixels, for a panel of the given size
    pub fn panel_points(&self, width: f64, height: f64) -> Vec<f64> {
        let mapping = PanelMapping::new(width, height, self.viewer.config().panel_scale);
        self.viewer
            .flat_section()
            .points
            .iter()
            .map(|p| mapping.to_panel(p))
            .flat_map(|p| [p.x, p.y])
            .collect()
    }

    /// Section point pairs as `[a, b, a, b, ...]`
    pub fn section_segments(&self) -> Vec<u32> {
        self.viewer
            .section()
            .segments
            .iter()
            .flatten()
            .map(|&i| i as u32)
            .collect()
    }

    #[wasm_bindgen(getter)]
    pub fn section_area(&self) -> f64 {
        self.viewer.section().area()
    }

    /// Solid face triangles in the solid's local frame, `[x, y, z, ...]`
    pub fn solid_positions(&self) -> Vec<f32> {
        if !self.shown(Layer::Solid, Part::Faces) {
            return Vec::new();
        }
        self.backend.face_positions(Layer::Solid)
    }

    pub fn solid_indices(&self) -> Vec<u32> {
        if !self.shown(Layer::Solid, Part::Faces) {
            return Vec::new();
        }
        self.backend.face_indices(Layer::Solid)
    }

    /// Column-major 4x4 world transform of the solid
    pub fn transform(&self) -> Vec<f32> {
        self.backend.transform(Layer::Solid)
    }

    /// World-space clip plane for the solid's faces as `[nx, ny, nz, d]`;
    /// empty when clipping is off
    pub fn clip_plane(&self) -> Vec<f64> {
        self.backend.clip_plane(Layer::Solid)
    }
    /// Column-major instance matrices for unit spheres at the solid's vertices
    pub fn solid_vertex_matrices(&self) -> Vec<f32> {
        if !self.shown(Layer::Solid, Part::Vertices) {
            return Vec::new();
        }
        self.backend.instance_matrices(Layer::Solid, Part::Vertices)
    }

    /// Column-major instance matrices for unit cylinders along the solid's edges
    pub fn solid_edge_matrices(&self) -> Vec<f32> {
        if !self.shown(Layer::Solid, Part::Edges) {
            return Vec::new();
        }
        self.backend.instance_matrices(Layer::Solid, Part::Edges)
    }

    /// Section polygon triangles in world space; empty unless the cut is a
    /// single closed polygon through a convex solid
    pub fn section_positions(&self) -> Vec<f32> {
        if !self.shown(Layer::Section, Part::Faces) {
            return Vec::new();
        }
        self.backend.face_positions(Layer::Section)
    }

    pub fn section_indices(&self) -> Vec<u32> {
        if !self.shown(Layer::Section, Part::Faces) {
            return Vec::new();
        }
        self.backend.face_indices(Layer::Section)
    }

    pub fn section_vertex_matrices(&self) -> Vec<f32> {
        self.backend.instance_matrices(Layer::Section, Part::Vertices)
    }

    pub fn section_edge_matrices(&self) -> Vec<f32> {
        self.backend.instance_matrices(Layer::Section, Part::Edges)
    }
}

impl WebSectionViewer {
    /// Host-side constructor that keeps the Rust error type
    pub fn with_solid(name: Option<&str>) -> polysect_core::Result<Self> {
        let kind = match name {
            Some(name) => name.parse::<SolidKind>()?,
            None => SolidKind::Cube,
        };
        let mut backend = BufferBackend::new();
        let viewer = SectionViewer::new(kind, ViewerConfig::default(), &mut backend)?;
        status(&format!("showing {kind}"));
        Ok(Self {
            viewer,
            backend,
            camera: Camera::default(),
        })
    }

    fn shown(&self, layer: Layer, part: Part) -> bool {
        self.backend.is_visible(layer, part)
    }

    /// Host-side `set_solid`
    pub fn select(&mut self, name: &str) -> polysect_core::Result<()> {
        let kind = name.parse::<SolidKind>()?;
        if kind != self.viewer.kind() {
            self.viewer.set_solid(kind, &mut self.backend)?;
            status(&format!("showing {kind}"));
        }
        Ok(())
    }
}

/// Installs a panic hook that forwards Rust panics to the browser console
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    Ok(())
}
