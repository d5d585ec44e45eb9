/// Example: Sweep the cutting plane through a solid and print each section
///
/// Usage: cargo run --example section_sweep -- [solid] [steps]

use polysect_core::{SectionViewer, SolidKind, ViewerConfig};
use polysect_terminal::TerminalBackend;
use std::env;
use std::io;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let kind = match args.get(1) {
        Some(name) => name
            .parse::<SolidKind>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        None => SolidKind::Cube,
    };
    let steps = match args.get(2) {
        Some(n) => n
            .parse::<usize>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        None => 10,
    }
    .max(1);

    let mut backend = TerminalBackend::new();
    let mut viewer = SectionViewer::new(kind, ViewerConfig::default(), &mut backend)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    println!("{kind}: radius {:.3}", viewer.radius());
    for i in 0..=steps {
        viewer.set_section_level(i as f64 / steps as f64);
        let level = viewer.section_level();
        let section = viewer.tick(&mut backend);
        println!(
            "level {:.2}: {:2} points, {:2} segments, closed {:5}, area {:.4}, anomalies {}",
            level,
            section.points.len(),
            section.segments.len(),
            section.is_closed_polygon(),
            section.area(),
            section.anomalies.len(),
        );
    }

    viewer.dispose(&mut backend);
    Ok(())
}
