use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use atomic_launcher::{PackageInstaller, PackageStatus, SessionSnapshot, VersionStore};
use tempfile::TempDir;

/// Helper to run git commands in a directory
fn git_command(dir: &Path, args: &[&str]) -> std::process::Output {
    let output = Command::new("git")
        .current_dir(dir)
        .args(["-c", "commit.gpgsign=false"])
        .args(args)
        .output()
        .expect("Failed to run git command");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

/// Create an upstream repository on branch `main` with one commit
fn create_upstream(dir: &Path) -> PathBuf {
    let repo_dir = dir.join("upstream");
    fs::create_dir(&repo_dir).expect("Failed to create repo dir");

    git_command(&repo_dir, &["init"]);
    git_command(&repo_dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git_command(&repo_dir, &["config", "user.name", "Test User"]);
    git_command(&repo_dir, &["config", "user.email", "test@example.com"]);

    fs::create_dir(repo_dir.join("code")).unwrap();
    fs::write(repo_dir.join("code/main.py"), "print('v1')\n").unwrap();
    git_command(&repo_dir, &["add", "."]);
    git_command(&repo_dir, &["commit", "-m", "Initial commit"]);

    repo_dir
}

/// Publish a new commit upstream
fn commit_change(repo_dir: &Path, content: &str) {
    fs::write(repo_dir.join("code/main.py"), content).unwrap();
    git_command(repo_dir, &["commit", "-am", "Next version"]);
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn head_of(dir: &Path) -> String {
    let output = git_command(dir, &["rev-parse", "HEAD"]);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn assert_idle(installer: &PackageInstaller) {
    assert_eq!(installer.session().snapshot(), SessionSnapshot::default());
}

#[test]
fn test_install_writes_version_marker() {
    let temp = TempDir::new().unwrap();
    let upstream = create_upstream(temp.path());
    let root = temp.path().join("games");
    let installer = PackageInstaller::open(&root).unwrap();

    assert!(!installer.is_installed("foo"));
    assert!(installer.install("foo", &file_url(&upstream), "1.0.0", "main"));

    assert!(installer.is_installed("foo"));
    assert_eq!(
        VersionStore::new(&root).read("foo").as_deref(),
        Some("1.0.0")
    );
    assert_eq!(
        fs::read_to_string(root.join("foo/code/main.py")).unwrap(),
        "print('v1')\n"
    );
    assert!(!installer.has_update("foo", "1.0.0"));
    assert_idle(&installer);
}

#[test]
fn test_second_install_is_noop() {
    let temp = TempDir::new().unwrap();
    let upstream = create_upstream(temp.path());
    let installer = PackageInstaller::open(temp.path().join("games")).unwrap();

    assert!(installer.install("foo", &file_url(&upstream), "1.0.0", "main"));
    let first_head = head_of(&installer.root().join("foo"));
    fs::write(installer.root().join("foo/save.dat"), "progress").unwrap();

    commit_change(&upstream, "print('v2')\n");
    assert!(installer.install("foo", &file_url(&upstream), "2.0.0", "main"));

    // Nothing was re-cloned or rewritten
    assert_eq!(head_of(&installer.root().join("foo")), first_head);
    assert!(installer.root().join("foo/save.dat").exists());
    assert_eq!(installer.local_version("foo").as_deref(), Some("1.0.0"));
    assert_idle(&installer);
}

#[test]
fn test_update_to_new_declared_version() {
    let temp = TempDir::new().unwrap();
    let upstream = create_upstream(temp.path());
    let installer = PackageInstaller::open(temp.path().join("games")).unwrap();
    assert!(installer.install("foo", &file_url(&upstream), "1.0.0", "main"));

    commit_change(&upstream, "print('v1.1')\n");
    let package = installer.root().join("foo");
    fs::write(package.join("code/main.py"), "locally edited").unwrap();
    fs::write(package.join("stray.txt"), "untracked").unwrap();

    assert!(installer.has_update("foo", "1.1.0"));
    assert_eq!(installer.status("foo", "1.1.0"), PackageStatus::UpdateAvailable);

    assert!(installer.update("foo", "1.1.0", "main"));

    assert!(!installer.has_update("foo", "1.1.0"));
    assert_eq!(installer.local_version("foo").as_deref(), Some("1.1.0"));
    assert_eq!(head_of(&package), head_of(&upstream));
    assert_eq!(
        fs::read_to_string(package.join("code/main.py")).unwrap(),
        "print('v1.1')\n"
    );
    assert!(!package.join("stray.txt").exists());
    assert_idle(&installer);
}

#[test]
fn test_failed_update_leaves_marker() {
    let temp = TempDir::new().unwrap();
    let upstream = create_upstream(temp.path());
    let installer = PackageInstaller::open(temp.path().join("games")).unwrap();
    assert!(installer.install("foo", &file_url(&upstream), "1.0.0", "main"));

    // Upstream disappears: fetch fails
    fs::remove_dir_all(&upstream).unwrap();

    assert!(!installer.update("foo", "1.1.0", "main"));
    assert!(installer.is_installed("foo"));
    assert_eq!(installer.local_version("foo").as_deref(), Some("1.0.0"));
    assert!(installer.has_update("foo", "1.1.0"));
    assert_idle(&installer);
}

#[test]
fn test_install_from_missing_repo_cleans_up() {
    let temp = TempDir::new().unwrap();
    let installer = PackageInstaller::open(temp.path().join("games")).unwrap();
    let missing = file_url(&temp.path().join("does-not-exist.git"));

    assert!(!installer.install("bar", &missing, "1.0.0", "main"));

    assert!(!installer.is_installed("bar"));
    assert!(!installer.root().join("bar").exists());
    assert_idle(&installer);
}

#[test]
fn test_install_of_missing_branch_cleans_up() {
    let temp = TempDir::new().unwrap();
    let upstream = create_upstream(temp.path());
    let installer = PackageInstaller::open(temp.path().join("games")).unwrap();

    assert!(!installer.install("foo", &file_url(&upstream), "1.0.0", "no-such-branch"));
    assert!(!installer.is_installed("foo"));
    assert_idle(&installer);
}

#[test]
fn test_remove_then_update_fails() {
    let temp = TempDir::new().unwrap();
    let upstream = create_upstream(temp.path());
    let installer = PackageInstaller::open(temp.path().join("games")).unwrap();
    assert!(installer.install("foo", &file_url(&upstream), "1.0.0", "main"));

    assert!(installer.remove("foo"));
    assert!(!installer.is_installed("foo"));
    assert!(!installer.update("foo", "2.0.0", "main"));
    assert!(!installer.root().join("foo").exists());
    assert!(!installer.remove("foo"));
}

#[test]
fn test_update_never_installs() {
    let temp = TempDir::new().unwrap();
    let installer = PackageInstaller::open(temp.path().join("games")).unwrap();

    assert!(!installer.update("ghost", "1.0.0", "main"));
    assert_eq!(fs::read_dir(installer.root()).unwrap().count(), 0);
    assert_idle(&installer);
}

#[test]
fn test_lost_marker_means_no_update() {
    let temp = TempDir::new().unwrap();
    let upstream = create_upstream(temp.path());
    let root = temp.path().join("games");
    let installer = PackageInstaller::open(&root).unwrap();
    assert!(installer.install("foo", &file_url(&upstream), "1.0.0", "main"));

    let marker = VersionStore::new(&root).marker_path("foo");
    fs::remove_file(&marker).unwrap();
    assert!(!installer.has_update("foo", "1.0.0"));
    assert!(!installer.has_update("foo", "7.0.0"));

    fs::write(&marker, "{\"version\": ").unwrap();
    assert!(!installer.has_update("foo", "7.0.0"));
    assert_eq!(installer.status("foo", "7.0.0"), PackageStatus::Installed);
}
