#![deny(clippy::mod_module_files)]
//! Package core of the atomic launcher.
//!
//! Installs, updates and removes git-hosted games under a local install root,
//! records the installed version of each one, and reports transfer progress
//! to a polling UI through [`InstallSession`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod git;
pub mod installer;
pub mod launch;
pub mod session;
pub mod storage;

pub use catalog::{Catalog, CatalogEntry};
pub use config::LauncherConfig;
pub use error::{Error, Result};
pub use git::{parse_progress_line, GitCli, RetrievalTool};
pub use installer::{PackageInstaller, PackageStatus, DEFAULT_BRANCH};
pub use launch::Launcher;
pub use session::{InstallSession, SessionGuard, SessionSnapshot};
pub use storage::{VersionRecord, VersionStore};
