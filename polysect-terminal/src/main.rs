/// Polysect Terminal - plane sections of regular polyhedra
///
/// Usage: polysect-terminal [solid]
///
/// `solid` is a name such as `cube` or `great-icosahedron`, or its hotkey.
/// Controls:
///   - 1-5, 8: Choose the solid
///   - V/E/F: Stand the solid on a vertex, edge or face
///   - +/- or PageUp/PageDown: Move the section level
///   - WASD / Arrow Keys: Rotate the solid
///   - Q/ESC: Quit

use polysect_core::{SolidKind, ViewerConfig};
use polysect_terminal::TerminalApp;
use std::env;
use std::io;

fn main() -> io::Result<()> {
    let kind = match env::args().nth(1) {
        Some(arg) => arg
            .parse::<SolidKind>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        None => SolidKind::Cube,
    };

    println!("Starting section viewer on the {kind} (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(kind, ViewerConfig::default())?;
    app.run()?;

    Ok(())
}
