use anyhow::Result;
use std::io::Write;

use atomic_launcher::{Catalog, PackageInstaller, RetrievalTool};

/// Handle the list command
/// One row per catalog entry: id, declared version, status, local version
pub fn handle<T: RetrievalTool, W: Write>(
    installer: &PackageInstaller<T>,
    catalog: &Catalog,
    output: &mut W,
) -> Result<()> {
    if catalog.is_empty() {
        writeln!(output, "catalog is empty")?;
        return Ok(());
    }

    writeln!(output, "{:<24} {:<12} {:<18} LOCAL", "ID", "VERSION", "STATUS")?;
    for (id, entry) in catalog.iter() {
        let status = installer.status(id, &entry.version);
        let local = installer.local_version(id);
        writeln!(
            output,
            "{:<24} {:<12} {:<18} {}",
            id,
            entry.version,
            status,
            local.as_deref().unwrap_or("-")
        )?;
    }

    Ok(())
}
