use std::{
    collections::VecDeque,
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use super::{parse_progress_line, ProgressLines, RetrievalTool};
use crate::error::{Error, Result};

/// How many trailing stderr lines of a failed clone end up in the error
const DIAGNOSTIC_LINES: usize = 8;

/// `RetrievalTool` backed by the `git` command line client
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Use whatever `git` is on `PATH`
    pub fn new() -> Self {
        Self::with_binary("git")
    }

    pub fn with_binary<P: AsRef<Path>>(binary: P) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        // Fail on missing credentials instead of waiting on a prompt nobody sees
        cmd.env("GIT_TERMINAL_PROMPT", "0").stdin(Stdio::null());
        cmd
    }

    /// Run a git subcommand inside `workdir`, capturing its output.
    /// Output is only looked at when the command fails.
    fn run<I, S>(&self, workdir: &Path, subcommand: &str, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self
            .command()
            .current_dir(workdir)
            .arg(subcommand)
            .args(args)
            .output()
            .map_err(|e| Error::Git(format!("failed to execute git {}: {}", subcommand, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(
                "git {} stdout: {}",
                subcommand,
                String::from_utf8_lossy(&output.stdout)
            );
            tracing::debug!("git {} stderr: {}", subcommand, stderr);
            return Err(Error::Git(format!(
                "git {} failed with {}: {}",
                subcommand,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl RetrievalTool for GitCli {
    fn clone_shallow(
        &self,
        repo: &str,
        branch: &str,
        target: &Path,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<()> {
        let mut child = self
            .command()
            .arg("clone")
            .args(["--depth", "1", "--single-branch", "--branch", branch])
            .arg("--progress")
            .arg("--")
            .arg(repo)
            .arg(target)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Git(format!("failed to execute git clone: {}", e)))?;

        let mut tail: VecDeque<String> = VecDeque::with_capacity(DIAGNOSTIC_LINES);

        if let Some(stderr) = child.stderr.take() {
            for line in ProgressLines::new(stderr) {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Lost git clone output stream: {}", e);
                        break;
                    }
                };

                if let Some(percent) = parse_progress_line(&line) {
                    on_progress(percent);
                } else {
                    tracing::debug!("git clone: {}", line);
                }

                if tail.len() == DIAGNOSTIC_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }

        let status = child
            .wait()
            .map_err(|e| Error::Git(format!("failed to wait for git clone: {}", e)))?;

        if !status.success() {
            let diagnostics: Vec<String> = tail.into_iter().collect();
            return Err(Error::Git(format!(
                "git clone failed with {}: {}",
                status,
                diagnostics.join(" | ")
            )));
        }

        Ok(())
    }

    fn fetch(&self, workdir: &Path, branch: &str) -> Result<()> {
        self.run(workdir, "fetch", ["origin", branch])
    }

    fn reset_hard(&self, workdir: &Path, branch: &str) -> Result<()> {
        self.run(workdir, "reset", ["--hard".to_string(), format!("origin/{}", branch)])
    }

    fn clean(&self, workdir: &Path) -> Result<()> {
        self.run(workdir, "clean", ["-fd"])
    }
}
