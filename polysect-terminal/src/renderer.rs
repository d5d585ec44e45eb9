/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Point2, Point3, Vector3};
use polysect_core::{Camera, FlatSection, Layer, PanelMapping};
use std::io::Write;

use crate::backend::TerminalBackend;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

const SECTION_COLOR: Color = Color::Red;
const EDGE_COLOR: Color = Color::White;

/// ASCII renderer that converts the scene to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Option<Color>>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![None; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Color> {
        self.color_buffer[y * self.width + x]
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(None);
    }

    /// Draw the solid shaded with its edges, then the section.
    ///
    /// Solid faces come in already cut back to the plane, so the section is
    /// depth-tested like everything else.
    pub fn render_scene(&mut self, backend: &TerminalBackend, camera: &Camera) {
        let light_dir = (camera.position - camera.target).cast::<f64>().normalize();

        for triangle in backend.triangles(Layer::Solid) {
            self.render_triangle(&triangle, &light_dir, camera);
        }
        for (a, b) in backend.segments(Layer::Solid) {
            self.render_line(&a, &b, camera, EDGE_COLOR, true);
        }
        for p in backend.markers(Layer::Solid) {
            self.render_marker(&p, camera, 'o', EDGE_COLOR, true);
        }

        for (a, b) in backend.segments(Layer::Section) {
            self.render_line(&a, &b, camera, SECTION_COLOR, true);
        }
        for p in backend.markers(Layer::Section) {
            self.render_marker(&p, camera, 'O', SECTION_COLOR, true);
        }
    }

    /// Draw the flattened section centred in the renderer
    pub fn render_panel(&mut self, flat: &FlatSection, mapping: &PanelMapping) {
        let centre = self.panel_cell(mapping, &Point2::origin());
        if let Some((cx, cy)) = centre {
            self.plot(cx, cy, '+', -f32::INFINITY, Some(Color::DarkGrey));
        }

        for &[a, b] in &flat.segments {
            let from = mapping.to_panel(&flat.points[a]);
            let to = mapping.to_panel(&flat.points[b]);
            let from = (from.x as f32, (from.y / CELL_ASPECT) as f32, 0.0);
            let to = (to.x as f32, (to.y / CELL_ASPECT) as f32, 0.0);
            self.rasterize_line(from, to, Some(SECTION_COLOR), false);
        }
        for point in &flat.points {
            if let Some((x, y)) = self.panel_cell(mapping, point) {
                self.plot(x, y, 'O', -f32::INFINITY, Some(SECTION_COLOR));
            }
        }
    }

    fn panel_cell(&self, mapping: &PanelMapping, point: &Point2<f64>) -> Option<(i32, i32)> {
        let p = mapping.to_panel(point);
        let x = p.x.floor() as i32;
        let y = (p.y / CELL_ASPECT).floor() as i32;
        self.contains(x, y).then_some((x, y))
    }

    fn project(&self, point: &Point3<f64>, camera: &Camera) -> Option<(f32, f32, f32)> {
        camera.project_to_screen(&point.cast::<f32>(), self.width as u32, self.height as u32)
    }

    fn render_triangle(&mut self, triangle: &[Point3<f64>; 3], light_dir: &Vector3<f64>, camera: &Camera) {
        // Project vertices to screen space
        let mut screen_coords = Vec::with_capacity(3);
        for vertex in triangle {
            match self.project(vertex, camera) {
                Some(coords) => screen_coords.push(coords),
                None => return, // Triangle is clipped
            }
        }

        // Calculate face normal for shading
        let normal = (triangle[1] - triangle[0]).cross(&(triangle[2] - triangle[0]));
        let Some(normal) = normal.try_normalize(1e-12) else {
            return;
        };
        let brightness = normal.dot(light_dir).max(0.0);
        if brightness <= 0.0 {
            return; // Back face
        }

        // Map brightness to character, keeping lit faces off the blank cell
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f64) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, character);
    }

    fn render_line(
        &mut self,
        a: &Point3<f64>,
        b: &Point3<f64>,
        camera: &Camera,
        color: Color,
        depth_test: bool,
    ) {
        if let (Some(from), Some(to)) = (self.project(a, camera), self.project(b, camera)) {
            self.rasterize_line(from, to, Some(color), depth_test);
        }
    }

    fn render_marker(&mut self, p: &Point3<f64>, camera: &Camera, c: char, color: Color, depth_test: bool) {
        if let Some((x, y, z)) = self.project(p, camera) {
            let depth = if depth_test { z - DEPTH_BIAS } else { -f32::INFINITY };
            self.plot(x.floor() as i32, y.floor() as i32, c, depth, Some(color));
        }
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32)], character: char) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, character, depth, None);
                    }
                }
            }
        }
    }

    /// Step along the longer screen axis, one cell per step
    fn rasterize_line(
        &mut self,
        from: (f32, f32, f32),
        to: (f32, f32, f32),
        color: Option<Color>,
        depth_test: bool,
    ) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let character = line_char(dx, dy / CELL_ASPECT as f32);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = from.0 + dx * t;
            let y = from.1 + dy * t;
            let depth = if depth_test {
                from.2 + (to.2 - from.2) * t - DEPTH_BIAS
            } else {
                -f32::INFINITY
            };
            self.plot(x.floor() as i32, y.floor() as i32, character, depth, color);
        }
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn plot(&mut self, x: i32, y: i32, character: char, depth: f32, color: Option<Color>) {
        if !self.contains(x, y) {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth <= self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    /// Queue the buffer with its top-left corner at `(column, row)`
    pub fn draw<W: Write>(&self, writer: &mut W, column: u16, row: u16) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(column, row + y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                // Color based on character intensity
                let color = self.color_buffer[idx].unwrap_or(match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                });

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Lines drawn over faces win ties within this depth
const DEPTH_BIAS: f32 = 1e-3;

fn line_char(dx: f32, dy: f32) -> char {
    let (ax, ay) = (dx.abs(), dy.abs());
    if ay < 0.4 * ax {
        '-'
    } else if ax < 0.4 * ay {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
