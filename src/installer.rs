//! Package lifecycle: install, update, remove and version reconciliation
//!
//! `PackageInstaller` is the only thing that writes into the install root or
//! runs the retrieval tool. Its public operations answer with plain `bool`s;
//! the reason for a `false` goes to the log. Callers that need to know what
//! the package looks like afterwards re-query `is_installed` / `has_update`.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::{
    error::{Error, Result},
    git::{GitCli, RetrievalTool},
    session::InstallSession,
    storage::{package_dir, VersionStore},
};

/// Branch used when the catalog does not name one
pub const DEFAULT_BRANCH: &str = "main";

/// Where a package stands relative to the catalog's declared version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    NotInstalled,
    Installed,
    UpdateAvailable,
    /// The active session is transferring this package
    Downloading,
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PackageStatus::NotInstalled => "not installed",
            PackageStatus::Installed => "installed",
            PackageStatus::UpdateAvailable => "update available",
            PackageStatus::Downloading => "downloading",
        };
        f.pad(label)
    }
}

pub struct PackageInstaller<T = GitCli> {
    root: PathBuf,
    versions: VersionStore,
    session: Arc<InstallSession>,
    tool: T,
}

impl PackageInstaller<GitCli> {
    /// Installer over `root` using the `git` found on `PATH`
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::with_tool(root, GitCli::new())
    }
}

impl<T: RetrievalTool> PackageInstaller<T> {
    /// Create the installer, creating the install root if it is absent
    pub fn with_tool<P: AsRef<Path>>(root: P, tool: T) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        tracing::debug!("Install root at {:?}", root);

        Ok(Self {
            versions: VersionStore::new(&root),
            session: Arc::new(InstallSession::new()),
            root,
            tool,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle for polling transfer progress
    pub fn session(&self) -> Arc<InstallSession> {
        Arc::clone(&self.session)
    }

    pub fn versions(&self) -> &VersionStore {
        &self.versions
    }

    /// Checked against the filesystem on every call
    pub fn is_installed(&self, id: &str) -> bool {
        package_dir(&self.root, id).is_ok_and(|dir| dir.is_dir())
    }

    pub fn local_version(&self, id: &str) -> Option<String> {
        if package_dir(&self.root, id).is_err() {
            return None;
        }
        self.versions.read(id)
    }

    /// True only when a local version is recorded and differs from
    /// `declared_version`. An unknown local version never counts as an update.
    pub fn has_update(&self, id: &str, declared_version: &str) -> bool {
        self.local_version(id)
            .is_some_and(|local| local != declared_version)
    }

    pub fn status(&self, id: &str, declared_version: &str) -> PackageStatus {
        if self.session.is_active_for(id) {
            PackageStatus::Downloading
        } else if !self.is_installed(id) {
            PackageStatus::NotInstalled
        } else if self.has_update(id, declared_version) {
            PackageStatus::UpdateAvailable
        } else {
            PackageStatus::Installed
        }
    }

    /// Shallow-clone `repo_source` into the install root.
    ///
    /// Already installed packages are left alone and report `true`. On
    /// failure no directory for `id` is left behind.
    pub fn install(&self, id: &str, repo_source: &str, declared_version: &str, branch: &str) -> bool {
        match self.try_install(id, repo_source, declared_version, branch) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to install {}: {}", id, e);
                false
            }
        }
    }

    /// Bring an installed package to the tip of `origin/<branch>`.
    ///
    /// Never installs. On failure the version marker is left as it was.
    pub fn update(&self, id: &str, declared_version: &str, branch: &str) -> bool {
        match self.try_update(id, declared_version, branch) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to update {}: {}", id, e);
                false
            }
        }
    }

    /// Delete the package directory
    pub fn remove(&self, id: &str) -> bool {
        match self.try_remove(id) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to remove {}: {}", id, e);
                false
            }
        }
    }

    fn try_install(
        &self,
        id: &str,
        repo_source: &str,
        declared_version: &str,
        branch: &str,
    ) -> Result<()> {
        let target = package_dir(&self.root, id)?;
        // A clone in flight has already created the directory
        if self.session.while_idle_for(id, || Ok(target.is_dir()))? {
            tracing::info!("{} already installed", id);
            return Ok(());
        }

        let guard = self.session.try_begin(id)?;
        // Checked again now that no other transfer can run
        if target.is_dir() {
            tracing::info!("{} already installed", id);
            return Ok(());
        }

        tracing::info!("Installing {} from {} ({})", id, repo_source, branch);
        let cloned = self
            .tool
            .clone_shallow(repo_source, branch, &target, &mut |percent| {
                guard.set_progress(percent)
            });

        if let Err(e) = cloned {
            self.discard_partial(id, &target);
            return Err(e);
        }

        self.versions.write(id, declared_version);
        tracing::info!("Installed {} {}", id, declared_version);
        Ok(())
    }

    fn try_update(&self, id: &str, declared_version: &str, branch: &str) -> Result<()> {
        let target = package_dir(&self.root, id)?;
        if !target.is_dir() {
            return Err(Error::NotInstalled(id.to_string()));
        }

        let guard = self.session.try_begin(id)?;
        tracing::info!("Updating {} to {} ({})", id, declared_version, branch);

        self.tool.fetch(&target, branch)?;
        guard.set_progress(33);
        self.tool.reset_hard(&target, branch)?;
        guard.set_progress(66);
        self.tool.clean(&target)?;
        guard.set_progress(100);

        self.versions.write(id, declared_version);
        tracing::info!("Updated {} to {}", id, declared_version);
        Ok(())
    }

    fn try_remove(&self, id: &str) -> Result<()> {
        let target = package_dir(&self.root, id)?;
        self.session.while_idle_for(id, || {
            if !target.is_dir() {
                return Err(Error::NotInstalled(id.to_string()));
            }
            fs::remove_dir_all(&target)?;
            Ok(())
        })?;

        tracing::info!("Removed {}", id);
        Ok(())
    }

    fn discard_partial(&self, id: &str, target: &Path) {
        if !target.exists() {
            return;
        }
        match fs::remove_dir_all(target) {
            Ok(()) => tracing::debug!("Removed partial checkout of {} at {:?}", id, target),
            Err(e) => tracing::warn!("Failed to clean up partial checkout {:?}: {}", target, e),
        }
    }
}

impl<T: RetrievalTool + 'static> PackageInstaller<T> {
    /// Run `install` on a worker thread; poll `session()` for progress
    pub fn spawn_install(
        self: &Arc<Self>,
        id: &str,
        repo_source: &str,
        declared_version: &str,
        branch: &str,
    ) -> Result<JoinHandle<bool>> {
        let installer = Arc::clone(self);
        let (id, repo, version, branch) = (
            id.to_string(),
            repo_source.to_string(),
            declared_version.to_string(),
            branch.to_string(),
        );

        let handle = thread::Builder::new()
            .name(format!("install-{}", id))
            .spawn(move || installer.install(&id, &repo, &version, &branch))?;
        Ok(handle)
    }

    /// Run `update` on a worker thread; poll `session()` for progress
    pub fn spawn_update(
        self: &Arc<Self>,
        id: &str,
        declared_version: &str,
        branch: &str,
    ) -> Result<JoinHandle<bool>> {
        let installer = Arc::clone(self);
        let (id, version, branch) = (
            id.to_string(),
            declared_version.to_string(),
            branch.to_string(),
        );

        let handle = thread::Builder::new()
            .name(format!("update-{}", id))
            .spawn(move || installer.update(&id, &version, &branch))?;
        Ok(handle)
    }
}
