//! Subcommand handlers of the headless host

pub mod install;
pub mod launch;
pub mod list;
pub mod remove;
pub mod status;
pub mod update;

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use atomic_launcher::{Catalog, CatalogEntry, InstallSession, LauncherConfig, PackageInstaller};
use indicatif::{ProgressBar, ProgressStyle};

/// How often the host samples the session while a worker runs
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Everything a handler needs, built once in `main`
pub struct App {
    pub config: LauncherConfig,
    pub catalog: Catalog,
    pub installer: Arc<PackageInstaller>,
}

impl App {
    /// Catalog entry for `id`, or an error naming the package
    pub fn entry(&self, id: &str) -> Result<&CatalogEntry> {
        self.catalog
            .get(id)
            .with_context(|| format!("{} is not in the catalog", id))
    }
}

/// Render the session into a progress bar until the worker finishes.
/// Returns the worker's result.
pub fn watch(session: &InstallSession, worker: JoinHandle<bool>, message: String) -> Result<bool> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {msg} [{bar:40.cyan/blue}] {pos}%")
            .context("Failed to create progress template")?
            .progress_chars("█▓░"),
    );
    bar.set_message(message);

    while !worker.is_finished() {
        bar.set_position(u64::from(session.download_progress()));
        thread::sleep(POLL_INTERVAL);
    }

    let ok = worker
        .join()
        .map_err(|_| anyhow!("transfer worker panicked"))?;

    if ok {
        bar.set_position(100);
        bar.finish_with_message("done");
    } else {
        bar.abandon_with_message("failed");
    }

    Ok(ok)
}
