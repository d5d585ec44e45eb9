/// Viewer settings shared by the front-ends
use crate::section::DEFAULT_EPSILON;

/// Sizes and timings used when turning a solid and its section into models
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    /// Template coordinates are multiplied by this when a solid is shown
    pub scale_factor: f64,
    pub vertex_radius: f64,
    pub edge_radius: f64,
    pub section_vertex_radius: f64,
    pub section_edge_radius: f64,
    /// Nudge for vertices lying exactly on the cutting plane
    pub degeneracy_epsilon: f64,
    /// Ticks taken by an orientation change
    pub orientation_frames: u32,
    /// Section panel scale, as a fraction of the panel width per world unit
    pub panel_scale: f64,
    /// Cut away the solid's faces above the plane so the section shows through
    pub clip_solid: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scale_factor: 2.0,
            vertex_radius: 0.03,
            edge_radius: 0.02,
            section_vertex_radius: 0.07,
            section_edge_radius: 0.05,
            degeneracy_epsilon: DEFAULT_EPSILON,
            orientation_frames: 60,
            panel_scale: 0.05,
            clip_solid: true,
        }
    }
}
