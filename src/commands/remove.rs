use anyhow::Result;
use std::io::Write;

use atomic_launcher::{PackageInstaller, RetrievalTool};

/// Handle the remove command
pub fn handle<T: RetrievalTool, W: Write>(
    installer: &PackageInstaller<T>,
    id: &str,
    output: &mut W,
) -> Result<()> {
    if !installer.is_installed(id) {
        anyhow::bail!("{} is not installed", id);
    }

    if !installer.remove(id) {
        anyhow::bail!("failed to remove {}", id);
    }

    writeln!(output, "Removed {}", id)?;
    Ok(())
}
