/// Terminal section viewer: the solid on the left, its flattened section on the right
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use nalgebra::{UnitQuaternion, Vector3};
use polysect_core::{
    Camera, OrientationTarget, PanelMapping, SectionViewer, SolidKind, ViewerConfig,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod backend;
pub mod renderer;

pub use backend::TerminalBackend;
pub use renderer::AsciiRenderer;

const ROTATION_STEP: f64 = 0.1;
const LEVEL_STEP: f64 = 0.02;

/// What a key press asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Quit,
    SelectSolid(SolidKind),
    Orient(OrientationTarget),
    MoveLevel(f64),
    /// Scaled rotation axis in camera space: x across the screen, y up it
    Rotate(Vector3<f64>),
    ToggleSolid,
}

impl Command {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let command = match code {
            KeyCode::Char('q') | KeyCode::Esc => Self::Quit,
            KeyCode::Char(c) if c.is_ascii_digit() => Self::SelectSolid(SolidKind::from_hotkey(c)?),
            KeyCode::Char('v') => Self::Orient(OrientationTarget::VERTEX),
            KeyCode::Char('e') => Self::Orient(OrientationTarget::EDGE),
            KeyCode::Char('f') => Self::Orient(OrientationTarget::FACE),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::PageUp => Self::MoveLevel(LEVEL_STEP),
            KeyCode::Char('-') | KeyCode::PageDown => Self::MoveLevel(-LEVEL_STEP),
            KeyCode::Char('w') | KeyCode::Up => Self::Rotate(Vector3::x() * -ROTATION_STEP),
            KeyCode::Char('s') | KeyCode::Down => Self::Rotate(Vector3::x() * ROTATION_STEP),
            KeyCode::Char('a') | KeyCode::Left => Self::Rotate(Vector3::y() * -ROTATION_STEP),
            KeyCode::Char('d') | KeyCode::Right => Self::Rotate(Vector3::y() * ROTATION_STEP),
            KeyCode::Char('h') => Self::ToggleSolid,
            _ => return None,
        };
        Some(command)
    }
}

/// Main application struct for the terminal section viewer
pub struct TerminalApp {
    viewer: SectionViewer<TerminalBackend>,
    backend: TerminalBackend,
    camera: Camera,
    scene: AsciiRenderer,
    panel: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(kind: SolidKind, config: ViewerConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let mut backend = TerminalBackend::new();
        let viewer = SectionViewer::new(kind, config, &mut backend)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let (camera, scene, panel) = layout(width, height);

        Ok(Self {
            viewer,
            backend,
            camera,
            scene,
            panel,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Update
            self.viewer.tick(&mut self.backend);

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                if let Some(command) = Command::from_key(code) {
                    self.apply(command)?;
                }
            }
            Event::Resize(width, height) => self.resize(width, height)?,
            _ => {}
        }
        Ok(())
    }

    pub fn apply(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Quit => self.running = false,
            Command::SelectSolid(kind) => {
                if kind != self.viewer.kind() {
                    log::info!("selecting {kind}");
                    self.viewer
                        .set_solid(kind, &mut self.backend)
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                }
            }
            Command::Orient(target) => {
                log::info!("orienting {} towards {target:?}", self.viewer.kind());
                self.viewer.orient(target);
            }
            Command::MoveLevel(step) => {
                let level = self.viewer.section_level() + step;
                self.viewer.set_section_level(level);
            }
            Command::Rotate(axis_angle) => {
                self.viewer.rotate(&screen_rotation(&self.camera, axis_angle));
            }
            Command::ToggleSolid => {
                let visible = !self.viewer.solid_visible();
                self.viewer.set_solid_visible(visible, &mut self.backend);
            }
        }
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) -> io::Result<()> {
        (self.camera, self.scene, self.panel) = layout(width, height);
        execute!(stdout(), terminal::Clear(ClearType::All))
    }

    /// Panel mapping that keeps the whole solid's cross-section in view
    fn panel_mapping(&self) -> PanelMapping {
        let width = self.panel.width() as f64;
        let height = self.panel.height() as f64 * 2.0;
        let extent = 2.2 * self.viewer.radius();
        let scale = width.min(height) / (extent * width);
        PanelMapping::new(width, height, scale)
    }

    fn render(&mut self) -> io::Result<()> {
        self.scene.clear();
        self.scene.render_scene(&self.backend, &self.camera);

        self.panel.clear();
        let mapping = self.panel_mapping();
        self.panel.render_panel(&self.viewer.flat_section(), &mapping);

        // Output to terminal
        let mut stdout = stdout();
        self.scene.draw(&mut stdout, 0, 1)?;
        self.panel.draw(&mut stdout, self.scene.width() as u16, 1)?;

        // Draw UI overlay
        let section = self.viewer.section();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} | level {:.2} | {} points | {} anomalies | FPS: {:.1} | 1-5,8=Solid V/E/F=Orient +/-=Level WASD=Rotate H=Hide Q=Quit",
                self.viewer.kind(),
                self.viewer.section_level(),
                section.points.len(),
                section.anomalies.len(),
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// World rotation for a turn given about the camera's own axes, so the keys
/// act the same from wherever the solid is seen
fn screen_rotation(camera: &Camera, axis_angle: Vector3<f64>) -> UnitQuaternion<f64> {
    camera.to_world_rotation(&UnitQuaternion::from_scaled_axis(axis_angle))
}

/// One status row on top; the rest split into scene and panel halves
fn layout(width: u16, height: u16) -> (Camera, AsciiRenderer, AsciiRenderer) {
    let rows = height.saturating_sub(1).max(1) as usize;
    let scene_width = (width / 2).max(1) as usize;
    let panel_width = (width as usize).saturating_sub(scene_width).max(1);
    (
        Camera::new(scene_width as u32, rows as u32 * 2),
        AsciiRenderer::new(scene_width, rows),
        AsciiRenderer::new(panel_width, rows),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_the_screen() {
        let (camera, scene, panel) = layout(81, 25);
        assert_eq!((scene.width(), scene.height()), (40, 24));
        assert_eq!((panel.width(), panel.height()), (41, 24));
        assert!((camera.aspect - 40.0 / 48.0).abs() < 1e-6);
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Command::from_key(KeyCode::Esc), Some(Command::Quit));
        assert_eq!(
            Command::from_key(KeyCode::Char('8')),
            Some(Command::SelectSolid(SolidKind::GreatIcosahedron))
        );
        assert_eq!(Command::from_key(KeyCode::Char('7')), None);
        assert_eq!(
            Command::from_key(KeyCode::Char('f')),
            Some(Command::Orient(OrientationTarget::FACE))
        );
        assert_eq!(
            Command::from_key(KeyCode::PageDown),
            Some(Command::MoveLevel(-LEVEL_STEP))
        );
        assert!(matches!(
            Command::from_key(KeyCode::Left),
            Some(Command::Rotate(_))
        ));
        assert_eq!(Command::from_key(KeyCode::Char('h')), Some(Command::ToggleSolid));
        assert_eq!(Command::from_key(KeyCode::Char('z')), None);
    }

    #[test]
    fn test_rotation_keys_follow_the_camera() {
        let (camera, _, _) = layout(80, 25);
        let Some(Command::Rotate(axis_angle)) = Command::from_key(KeyCode::Up) else {
            panic!("up arrow should rotate");
        };
        let turn = screen_rotation(&camera, axis_angle);
        assert!((turn.angle() - ROTATION_STEP).abs() < 1e-9);

        // tipping towards the viewer turns about the screen's horizontal,
        // not about world x
        let axis = turn.axis().unwrap();
        let sight = (camera.target - camera.position).cast::<f64>().normalize();
        assert!(axis.dot(&sight).abs() < 1e-6);
        assert!(axis.y.abs() < 1e-6);
        assert!(axis.z.abs() > 0.3);

        let Some(Command::Rotate(axis_angle)) = Command::from_key(KeyCode::Char('d')) else {
            panic!("d should rotate");
        };
        let axis = screen_rotation(&camera, axis_angle).axis().unwrap();
        let camera_up = sight.cross(&Vector3::y()).cross(&sight).normalize();
        assert!((axis.dot(&camera_up).abs() - 1.0).abs() < 1e-6);
    }
}
