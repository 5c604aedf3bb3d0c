//! # Source repository access
//!
//! The build works on a fresh clone of the requested branch. The clone is
//! driven through the `git` command line, the same way for remote URLs and
//! local paths:
//!
//! ```text
//! ┌──────────────┐  git clone   ┌──────────────┐  ls-tree / diff  ┌────────────┐
//! │  Repository  │ ───────────> │  Work clone  │ ───────────────> │ File list  │
//! │ (URL / path) │   --branch   │ (temp dir)   │                  │ (a/b/c)    │
//! └──────────────┘              └──────────────┘                  └────────────┘
//! ```
//!
//! Two file selections are offered:
//! - every file in the HEAD tree (the default)
//! - files added or modified by the HEAD commit
//!
//! Only paths with at least one `/` are returned: files at the repository
//! root are never part of a package.
//!
//! Failures are categorized from git's stderr (see [`errors::GitError`]);
//! network failures during clone are retried with exponential backoff.

use crate::config::{FileSelection, RepoLocation};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use tracing::{Level, debug, info, span, warn};

/// Git error categorization and handling
pub mod errors;

use errors::GitError;

/// Number of clone attempts for transient network failures
const CLONE_ATTEMPTS: u32 = 3;

/// A checked-out clone of the source branch
#[derive(Debug, Clone)]
pub struct SourceRepository {
    /// Working tree of the clone
    path: PathBuf,
}

/// Locate the `git` executable
///
/// # Errors
///
/// Returns an error if `git` is not on `PATH`.
pub fn ensure_git_available() -> Result<PathBuf> {
    which::which("git").context("git executable not found on PATH; install git to build packages")
}

impl SourceRepository {
    /// Use an existing working tree
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Clone `branch` of `location` into `dest`
    ///
    /// `dest` must not exist or be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `git clone` cannot be started
    /// - The repository or branch does not exist
    /// - Authentication fails
    /// - The network stays unreachable after retries
    pub fn clone_into(location: &RepoLocation, branch: &str, dest: &Path) -> Result<Self> {
        let span = span!(Level::INFO, "clone", repository = %location, branch);
        let _guard = span.enter();

        let source = location.as_clone_arg();
        let dest_arg = dest.display().to_string();
        let args = [
            "clone",
            "--quiet",
            "--branch",
            branch,
            "--single-branch",
            "--",
            source.as_str(),
            dest_arg.as_str(),
        ];

        let mut attempt = 1;
        loop {
            let output = Command::new("git")
                .args(args)
                .stdin(Stdio::null())
                .output()
                .context("Failed to run git clone")?;

            if output.status.success() {
                info!(dest = %dest.display(), "cloned repository");
                return Ok(Self::open(dest));
            }

            let stderr = String::from_utf8_lossy(&output.stderr);
            let error = GitError::from_stderr("git clone", &stderr);

            if error.should_retry() && attempt < CLONE_ATTEMPTS {
                let delay = Duration::from_millis(500 * (1 << attempt));
                warn!(attempt, ?delay, error = error.error_type(), "clone failed, retrying");
                remove_partial_clone(dest);
                std::thread::sleep(delay);
                attempt += 1;
                continue;
            }

            return Err(error.into());
        }
    }

    /// Working tree of the clone
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Commit id of HEAD
    ///
    /// # Errors
    ///
    /// Returns an error if the repository has no commits.
    pub fn head_commit(&self) -> Result<String> {
        let output = self.git(&["rev-parse", "HEAD"])?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// List files according to `selection`
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying git command fails.
    pub fn list_files(&self, selection: FileSelection) -> Result<Vec<String>> {
        match selection {
            FileSelection::AllAtHead => self.list_head_files(),
            FileSelection::SinceLastCommit => self.list_changed_files(),
        }
    }

    /// Every file in the HEAD tree that lives below a directory
    ///
    /// # Errors
    ///
    /// Returns an error if `git ls-tree` fails.
    pub fn list_head_files(&self) -> Result<Vec<String>> {
        let output = self.git(&["ls-tree", "-r", "--name-only", "-z", "HEAD"])?;
        let files = nested_paths(&output.stdout);
        debug!(count = files.len(), "listed files at HEAD");
        Ok(files)
    }

    /// Files added or modified between `HEAD~1` and `HEAD`
    ///
    /// Deleted files are left out. On a root commit every file at HEAD is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error if `git diff` fails.
    pub fn list_changed_files(&self) -> Result<Vec<String>> {
        if !self.has_parent_commit() {
            warn!("HEAD has no parent commit; using every file at HEAD");
            return self.list_head_files();
        }

        let output = self.git(&[
            "diff",
            "--name-only",
            "-z",
            "--no-renames",
            "--diff-filter=d",
            "HEAD~1",
            "HEAD",
        ])?;
        let files = nested_paths(&output.stdout);
        debug!(count = files.len(), "listed files changed by HEAD");
        Ok(files)
    }

    /// Whether `HEAD~1` exists
    fn has_parent_commit(&self) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", "HEAD~1"])
            .current_dir(&self.path)
            .stdin(Stdio::null())
            .output()
            .is_ok_and(|output| output.status.success())
    }

    /// Run a git command inside the clone and fail on non-zero exit
    fn git(&self, args: &[&str]) -> Result<Output> {
        let command = format!("git {}", args.first().copied().unwrap_or_default());
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run {command}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::from_stderr(&command, &stderr).into());
        }

        Ok(output)
    }
}

/// Drop what a failed clone left in `dest`; returns whether `dest` is gone
fn remove_partial_clone(dest: &Path) -> bool {
    match std::fs::remove_dir_all(dest) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!(dest = %dest.display(), error = %e, "could not remove partial clone");
            false
        }
    }
}

/// Split NUL-separated git output, keeping paths that contain `/`
fn nested_paths(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|b| *b == 0)
        .filter(|raw| !raw.is_empty())
        .map(|raw| String::from_utf8_lossy(raw).into_owned())
        .filter(|path| path.contains('/'))
        .collect()
}
