/// Controller tying a solid, the cutting plane and their models together
use nalgebra::{Point2, Point3, UnitQuaternion};

use crate::config::ViewerConfig;
use crate::error::Result;
use crate::model::{GeometricModel, Layer, RenderBackend};
use crate::orientation::OrientationTarget;
use crate::plane::Plane;
use crate::polyhedron::Polyhedron;
use crate::projection::FlatProjector;
use crate::section::Section;
use crate::solids::SolidKind;
use crate::transform::{OrientationTween, Pose};

/// The solid on display, with its model and world placement
struct ActiveSolid<B: RenderBackend> {
    kind: SolidKind,
    polyhedron: Polyhedron,
    model: GeometricModel<B>,
    pose: Pose,
    radius: f64,
}

/// Section flattened onto its plane, ready for a 2D panel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatSection {
    pub points: Vec<Point2<f64>>,
    pub segments: Vec<[usize; 2]>,
}

/// Owns the active solid and its section.
///
/// The cutting plane stays fixed at `y = 0`; the section level moves the
/// solid up and down through it. Every [`tick`](Self::tick) recomputes the
/// section from the solid's current world placement.
pub struct SectionViewer<B: RenderBackend> {
    config: ViewerConfig,
    plane: Plane,
    solid: ActiveSolid<B>,
    level: f64,
    section: Section,
    section_model: GeometricModel<B>,
    tween: Option<OrientationTween>,
}

impl<B: RenderBackend> SectionViewer<B> {
    pub fn new(kind: SolidKind, config: ViewerConfig, backend: &mut B) -> Result<Self> {
        let solid = build_solid(kind, &config, backend)?;
        let mut viewer = Self {
            config,
            plane: Plane::horizontal(0.0),
            solid,
            level: 0.0,
            section: Section::default(),
            section_model: GeometricModel::new(Layer::Section),
            tween: None,
        };
        viewer.set_section_level(0.0);
        Ok(viewer)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn kind(&self) -> SolidKind {
        self.solid.kind
    }

    pub fn polyhedron(&self) -> &Polyhedron {
        &self.solid.polyhedron
    }

    pub fn pose(&self) -> &Pose {
        &self.solid.pose
    }

    /// Radius of the displayed (scaled) solid
    pub fn radius(&self) -> f64 {
        self.solid.radius
    }

    pub fn section_level(&self) -> f64 {
        self.level
    }

    /// Section computed by the last tick
    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn solid_visible(&self) -> bool {
        !self.solid.model.is_hidden()
    }

    /// Hide or show the solid; the section stays on screen either way
    pub fn set_solid_visible(&mut self, visible: bool, backend: &mut B) {
        self.solid.model.set_hidden(backend, !visible);
    }

    /// Replace the displayed solid.
    ///
    /// The old model is disposed before the new one is built, so the backend
    /// never holds two solids. Pose and section level are reset, and the new
    /// solid starts out visible.
    pub fn set_solid(&mut self, kind: SolidKind, backend: &mut B) -> Result<()> {
        let polyhedron = kind.build()?;
        let previous = std::mem::replace(
            &mut self.solid.model,
            GeometricModel::new(Layer::Solid),
        );
        previous.dispose(backend);

        self.solid = populate_solid(kind, polyhedron, &self.config, backend);
        self.tween = None;
        self.set_section_level(0.0);
        log::debug!("switched to {kind}, radius {:.3}", self.solid.radius);
        Ok(())
    }

    /// Move the solid so the plane sits at `radius * (2 * value - 1)`.
    ///
    /// `value` is clamped to `[0, 1]`: 0 puts the whole solid below the plane,
    /// 1 above it.
    pub fn set_section_level(&mut self, value: f64) {
        self.level = value.clamp(0.0, 1.0);
        self.solid.pose.translation.y = self.solid.radius * (2.0 * self.level - 1.0);
    }

    /// Start turning the solid towards one of its canonical orientations
    pub fn orient(&mut self, target: OrientationTarget) {
        let to = target.rotation(&self.solid.polyhedron);
        self.tween = Some(OrientationTween::new(
            self.solid.pose.rotation,
            to,
            self.config.orientation_frames,
        ));
    }

    /// Apply a world-space rotation; cancels a running orientation change
    pub fn rotate(&mut self, delta: &UnitQuaternion<f64>) {
        self.tween = None;
        self.solid.pose.rotate(delta);
    }

    /// Current world-space position of every solid vertex
    pub fn world_positions(&self) -> Vec<Point3<f64>> {
        let scale = self.config.scale_factor;
        self.solid
            .polyhedron
            .vertices()
            .iter()
            .map(|v| self.solid.pose.apply(&(v * scale)))
            .collect()
    }

    /// Advance one frame: animate, place the solid and rebuild the section
    pub fn tick(&mut self, backend: &mut B) -> &Section {
        if let Some(tween) = self.tween.as_mut() {
            self.solid.pose.rotation = tween.step();
            if tween.is_finished() {
                self.tween = None;
            }
        }
        backend.set_transform(Layer::Solid, &self.solid.pose.isometry());
        let clip = self.config.clip_solid.then_some(&self.plane);
        backend.set_clip_plane(Layer::Solid, clip);

        let positions = self.world_positions();
        self.section = Section::compute_with_epsilon(
            &self.solid.polyhedron,
            &positions,
            &self.plane,
            self.config.degeneracy_epsilon,
        );
        self.rebuild_section_model(backend);
        &self.section
    }

    pub fn flat_section(&self) -> FlatSection {
        FlatSection {
            points: FlatProjector::for_plane(&self.plane).project_section(&self.section),
            segments: self.section.segments.clone(),
        }
    }

    /// Release every backend resource held by the viewer
    pub fn dispose(self, backend: &mut B) {
        self.solid.model.dispose(backend);
        self.section_model.dispose(backend);
    }

    fn rebuild_section_model(&mut self, backend: &mut B) {
        let model = &mut self.section_model;
        let points: Vec<Point3<f64>> = self.section.positions().collect();

        model.begin_update();
        for p in &points {
            model.add_vertex(backend, *p, self.config.section_vertex_radius);
        }
        for &[a, b] in &self.section.segments {
            model.add_edge(backend, points[a], points[b], self.config.section_edge_radius);
        }
        if self.solid.kind.is_convex() && self.section.is_closed_polygon() {
            if let Some(path) = self.section.loops().first() {
                let polygon: Vec<_> = path.iter().map(|&i| points[i]).collect();
                model.add_face(&polygon);
            }
        }
        model.end_update(backend);
        backend.set_transform(Layer::Section, &nalgebra::Isometry3::identity());
    }
}

fn build_solid<B: RenderBackend>(
    kind: SolidKind,
    config: &ViewerConfig,
    backend: &mut B,
) -> Result<ActiveSolid<B>> {
    let polyhedron = kind.build()?;
    Ok(populate_solid(kind, polyhedron, config, backend))
}

/// Build the solid's model from its scaled template
fn populate_solid<B: RenderBackend>(
    kind: SolidKind,
    polyhedron: Polyhedron,
    config: &ViewerConfig,
    backend: &mut B,
) -> ActiveSolid<B> {
    let scale = config.scale_factor;
    let points: Vec<Point3<f64>> = polyhedron.vertices().iter().map(|v| v * scale).collect();

    let mut model = GeometricModel::new(Layer::Solid);
    model.begin_update();
    for p in &points {
        model.add_vertex(backend, *p, config.vertex_radius);
    }
    for edge in polyhedron.edges() {
        model.add_edge(backend, points[edge.a], points[edge.b], config.edge_radius);
    }
    for face in polyhedron.faces() {
        let polygon: Vec<_> = face.iter().map(|&i| points[i]).collect();
        model.add_face(&polygon);
    }
    model.end_update(backend);

    let radius = polyhedron.circumradius() * scale;
    ActiveSolid {
        kind,
        polyhedron,
        model,
        pose: Pose::identity(),
        radius,
    }
}
