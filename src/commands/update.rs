//! Handle update command

use anyhow::Result;
use std::io::Write;

use super::{watch, App};

pub fn handle<W: Write>(app: &App, id: &str, force: bool, output: &mut W) -> Result<()> {
    let entry = app.entry(id)?;

    if !app.installer.is_installed(id) {
        anyhow::bail!("{} is not installed", id);
    }

    // An unknown local version is not "up to date", so only skip on a match
    let local = app.installer.local_version(id);
    if !force && local.as_deref() == Some(entry.version.as_str()) {
        writeln!(output, "{} is already at {}", id, entry.version)?;
        return Ok(());
    }

    let branch = entry.branch_or(&app.config.default_branch);
    let worker = app.installer.spawn_update(id, &entry.version, branch)?;

    let session = app.installer.session();
    if !watch(&session, worker, format!("Updating {}", id))? {
        anyhow::bail!("update of {} failed", id);
    }

    writeln!(
        output,
        "Updated {} {} -> {}",
        id,
        local.as_deref().unwrap_or("unknown"),
        entry.version
    )?;
    Ok(())
}
