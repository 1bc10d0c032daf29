use anyhow::{Context, Result};
use std::io::Write;

use atomic_launcher::Launcher;

use super::App;

/// Handle the launch command
/// Starts the game and returns; the child keeps running after we exit.
pub fn handle<W: Write>(app: &App, id: &str, output: &mut W) -> Result<()> {
    let entry_point = app.catalog.get(id).and_then(|e| e.entry_point.as_deref());

    let launcher = Launcher::new(app.installer.root(), &app.config.runner);
    let child = launcher
        .launch(id, entry_point)
        .with_context(|| format!("Failed to launch {}", id))?;

    writeln!(output, "Launched {} (pid {})", id, child.id())?;
    Ok(())
}
