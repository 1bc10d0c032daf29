//! Handle install command

use anyhow::Result;
use std::io::Write;

use super::{watch, App};

/// Clone the package on a worker thread while the bar follows the session
pub fn handle<W: Write>(app: &App, id: &str, output: &mut W) -> Result<()> {
    let entry = app.entry(id)?;

    if app.installer.is_installed(id) {
        writeln!(output, "{} is already installed", id)?;
        return Ok(());
    }

    let branch = entry.branch_or(&app.config.default_branch);
    let worker = app
        .installer
        .spawn_install(id, &entry.repo, &entry.version, branch)?;

    let session = app.installer.session();
    if !watch(&session, worker, format!("Installing {}", id))? {
        anyhow::bail!("installation of {} failed", id);
    }

    writeln!(output, "Installed {} {}", id, entry.version)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::commands::tests::app_with;

    #[test]
    fn test_install_of_installed_package() -> Result<()> {
        let temp = TempDir::new()?;
        let app = app_with(temp.path(), r#"{"pong": {"repo": "file:///nowhere", "version": "1.0.0"}}"#)?;
        fs::create_dir(app.installer.root().join("pong"))?;

        let mut output = Vec::new();
        handle(&app, "pong", &mut output)?;
        assert_eq!(String::from_utf8(output)?, "pong is already installed\n");
        Ok(())
    }

    #[test]
    fn test_install_of_uncatalogued_package() -> Result<()> {
        let temp = TempDir::new()?;
        let app = app_with(temp.path(), "{}")?;

        let mut output = Vec::new();
        assert!(handle(&app, "pong", &mut output).is_err());
        assert!(output.is_empty());
        Ok(())
    }

    #[test]
    fn test_failed_install_reports_error() -> Result<()> {
        let temp = TempDir::new()?;
        let missing = format!("file://{}", temp.path().join("missing.git").display());
        let app = app_with(
            temp.path(),
            &format!(r#"{{"pong": {{"repo": "{}", "version": "1.0.0"}}}}"#, missing),
        )?;

        let mut output = Vec::new();
        assert!(handle(&app, "pong", &mut output).is_err());
        assert!(output.is_empty());
        assert!(!app.installer.is_installed("pong"));
        Ok(())
    }
}
