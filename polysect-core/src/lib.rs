/// Polysect Core Library - polyhedra and their plane sections
///
/// This library provides the stateless core of the section viewers:
/// polyhedron templates and their edge graphs, plane sections, canonical
/// orientations, and the mesh-building contract the renderers implement.

pub mod config;
pub mod error;
pub mod model;
pub mod orientation;
pub mod plane;
pub mod polyhedron;
pub mod projection;
pub mod section;
pub mod solids;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use error::{PolyhedronError, Result};
pub use model::{EdgeInstance, FaceBuffer, GeometricModel, Layer, Part, RenderBackend, VertexMarker};
pub use orientation::OrientationTarget;
pub use plane::Plane;
pub use polyhedron::{Edge, Polyhedron};
pub use projection::{Camera, FlatProjector, PanelMapping};
pub use section::{Section, SectionPoint};
pub use solids::SolidKind;
pub use transform::{OrientationTween, Pose};
pub use viewer::{FlatSection, SectionViewer};
