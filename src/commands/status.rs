use anyhow::Result;
use std::io::Write;

use atomic_launcher::{Catalog, PackageInstaller, RetrievalTool};

/// Handle the status command
pub fn handle<T: RetrievalTool, W: Write>(
    installer: &PackageInstaller<T>,
    catalog: &Catalog,
    id: &str,
    output: &mut W,
) -> Result<()> {
    let local = installer.local_version(id);

    match catalog.get(id) {
        Some(entry) => {
            writeln!(output, "{}: {}", id, installer.status(id, &entry.version))?;
            if let Some(name) = &entry.name {
                writeln!(output, "  name:     {}", name)?;
            }
            writeln!(output, "  repo:     {}", entry.repo)?;
            writeln!(output, "  declared: {}", entry.version)?;
        }
        None => {
            let state = if installer.is_installed(id) {
                "installed (not in catalog)"
            } else {
                "not installed (not in catalog)"
            };
            writeln!(output, "{}: {}", id, state)?;
        }
    }
    writeln!(output, "  local:    {}", local.as_deref().unwrap_or("unknown"))?;

    Ok(())
}
