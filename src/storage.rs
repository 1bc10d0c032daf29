mod version_store;

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

pub use version_store::{VersionRecord, VersionStore, MARKER_FILE};

/// Directory of package `id` under `root`.
///
/// The id doubles as a directory name, so anything that is not a single
/// plain path component (empty, `.`, `..`, separators) is rejected.
pub fn package_dir(root: &Path, id: &str) -> Result<PathBuf> {
    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == id => Ok(root.join(id)),
        _ => Err(Error::InvalidId(id.to_string())),
    }
}
