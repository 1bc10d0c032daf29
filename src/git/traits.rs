use std::path::Path;

use crate::error::Result;

/// The version-control retrieval tool the installer shells out to.
///
/// Every method blocks until the underlying operation finishes. `Ok(())`
/// means the tool reported success; a spawn failure or unsuccessful exit
/// is an `Error::Git`.
pub trait RetrievalTool: Send + Sync {
    /// Shallow, single-branch checkout of `repo` into `target`.
    /// `on_progress` receives every percentage the tool reports, raw.
    fn clone_shallow(
        &self,
        repo: &str,
        branch: &str,
        target: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<()>;

    /// Fetch `branch` from the `origin` remote of the checkout at `workdir`.
    fn fetch(&self, workdir: &Path, branch: &str) -> Result<()>;

    /// Hard-reset the working tree to `origin/<branch>`, discarding local edits.
    fn reset_hard(&self, workdir: &Path, branch: &str) -> Result<()>;

    /// Remove untracked files and directories.
    fn clean(&self, workdir: &Path) -> Result<()>;
}
