use std::{
    path::{Component, Path, PathBuf},
    process::{Child, Command, Stdio},
};

use crate::{
    catalog::DEFAULT_ENTRY_POINT,
    error::{Error, Result},
    storage::package_dir,
};

/// Starts installed packages as independent child processes
#[derive(Debug, Clone)]
pub struct Launcher {
    root: PathBuf,
    runner: String,
}

impl Launcher {
    pub fn new<P: AsRef<Path>>(root: P, runner: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            runner: runner.to_string(),
        }
    }

    /// Absolute path of `entry_point` inside the package directory of `id`
    pub fn entry_path(&self, id: &str, entry_point: Option<&str>) -> Result<PathBuf> {
        let dir = package_dir(&self.root, id)?;
        if !dir.is_dir() {
            return Err(Error::NotInstalled(id.to_string()));
        }

        let relative = Path::new(entry_point.unwrap_or(DEFAULT_ENTRY_POINT));
        let path = dir.join(relative);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !contained || !path.is_file() {
            return Err(Error::MissingEntryPoint(path));
        }

        Ok(path)
    }

    /// Run `<runner> <entry>` from the entry point's directory.
    ///
    /// The child is returned without waiting on it; the package runs beside
    /// the launcher.
    pub fn launch(&self, id: &str, entry_point: Option<&str>) -> Result<Child> {
        let entry = self.entry_path(id, entry_point)?;
        let workdir = entry.parent().unwrap_or(self.root.as_path());
        // Relative to workdir, so a relative install root still resolves
        let script = entry.file_name().unwrap_or(entry.as_os_str());

        tracing::info!("Launching {} via {:?}", id, entry);
        let child = Command::new(&self.runner)
            .arg(script)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .spawn()?;

        tracing::debug!("{} running as pid {}", id, child.id());
        Ok(child)
    }
}
