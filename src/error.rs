use std::fmt;
use std::path::PathBuf;

/// Failures inside the package core.
///
/// The installer's public operations collapse these into `bool` results;
/// the variants exist so the log line says what actually went wrong.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The retrieval tool failed to spawn or exited unsuccessfully
    Git(String),
    NotInstalled(String),
    /// Another install/update already owns the session
    Busy(String),
    InvalidId(String),
    MissingEntryPoint(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::Git(msg) => write!(f, "Git error: {}", msg),
            Error::NotInstalled(id) => write!(f, "Package not installed: {}", id),
            Error::Busy(id) => write!(f, "Transfer already in progress for {}", id),
            Error::InvalidId(id) => write!(f, "Invalid package id: {:?}", id),
            Error::MissingEntryPoint(path) => {
                write!(f, "Entry point not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
