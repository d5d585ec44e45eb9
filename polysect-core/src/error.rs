/// Error types for polyhedron construction and catalog lookup
use thiserror::Error;

/// Errors raised while building a polyhedron from vertex and face data.
///
/// These are construction-time failures: the input data is malformed and the
/// solid must not be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolyhedronError {
    /// A directed edge was walked twice in the same direction, so two faces
    /// disagree about their winding.
    #[error("inconsistent face orientation: edge {from}->{to} appears twice in the same direction")]
    InconsistentOrientation { from: usize, to: usize },

    /// A directed edge whose reverse never appears: the surface is not closed.
    #[error("edge {from}->{to} has no opposite face")]
    UnpairedEdge { from: usize, to: usize },

    #[error("face {face} has only {len} vertices")]
    DegenerateFace { face: usize, len: usize },

    #[error("face {face} references vertex {vertex}, but the solid has {count} vertices")]
    VertexOutOfRange {
        face: usize,
        vertex: usize,
        count: usize,
    },

    #[error("unknown solid '{0}'")]
    UnknownSolid(String),
}

/// Result type for polyhedron operations
pub type Result<T> = std::result::Result<T, PolyhedronError>;
