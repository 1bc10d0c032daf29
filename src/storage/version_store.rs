use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File name of the per-package version marker
pub const MARKER_FILE: &str = "version.json";

/// On-disk contents of `{root}/{id}/version.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
}

/// Records which version of each package is currently on disk
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
}

impl VersionStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn marker_path(&self, id: &str) -> PathBuf {
        self.root.join(id).join(MARKER_FILE)
    }

    /// Recorded version of `id`.
    ///
    /// A missing, unreadable or malformed marker all mean "unknown" and
    /// return `None`; only the latter two are worth a warning.
    pub fn read(&self, id: &str) -> Option<String> {
        let path = self.marker_path(id);
        if !path.exists() {
            tracing::debug!("No version marker for {} at {:?}", id, path);
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read version marker {:?}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_str::<VersionRecord>(&content) {
            Ok(record) => Some(record.version),
            Err(e) => {
                tracing::warn!("Failed to parse version marker {:?}: {}", path, e);
                None
            }
        }
    }

    /// Best-effort write: a failure is logged and otherwise ignored.
    pub fn write(&self, id: &str, version: &str) {
        if let Err(e) = self.try_write(id, version) {
            tracing::warn!("Failed to record version {} for {}: {}", version, id, e);
        }
    }

    /// Write the marker through a temp file and rename, so readers see
    /// either the old record or the new one.
    pub fn try_write(&self, id: &str, version: &str) -> Result<()> {
        let path = self.marker_path(id);
        let temp_path = self.root.join(id).join(".version.json.tmp");

        let record = VersionRecord {
            version: version.to_string(),
        };
        let json = serde_json::to_string_pretty(&record)?;

        fs::write(&temp_path, json)?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!("Recorded {} version {} at {:?}", id, version, path);
        Ok(())
    }
}
