//! Build directory handling: clearing old output, staging sources, writing
//! artifacts.

use crate::BuildError;
use crate::output::{self, Progress};
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// First backoff step when clearing a directory fails
const RETRY_BASE_DELAY: Duration = Duration::from_millis(if cfg!(test) { 5 } else { 25 });

/// Remove `dir` and everything below it
///
/// A missing directory is not an error. Removal is retried with exponential
/// backoff.
///
/// # Errors
///
/// Returns an error if the directory still cannot be removed after retries.
pub fn clear_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    debug!(dir = %dir.display(), "clearing directory");
    remove_with_retry(dir, 3)?;

    if dir.exists() {
        let remaining = WalkDir::new(dir).min_depth(1).into_iter().count();
        return Err(anyhow::anyhow!(
            "{} still contains {remaining} entries after cleanup",
            dir.display()
        ));
    }

    Ok(())
}

/// Remove a directory tree, sleeping `RETRY_BASE_DELAY * 2^n` between attempts
///
/// Something else removing the tree mid-way counts as success.
fn remove_with_retry(dir: &Path, attempts: u32) -> Result<()> {
    let mut attempt = 1;
    loop {
        let err = match fs::remove_dir_all(dir) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => e,
        };

        warn!(dir = %dir.display(), error = %err, attempt, "removal failed");
        if attempt >= attempts {
            return Err(err).with_context(|| {
                format!("Failed to remove {} after {attempts} attempts", dir.display())
            });
        }
        std::thread::sleep(RETRY_BASE_DELAY * (1 << attempt));
        attempt += 1;
    }
}

/// Copy each repository-relative file from `repo_root` to the same relative
/// location under `build_path`
///
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns an error if a parent directory cannot be created or a file cannot
/// be copied.
pub fn stage_files<S: AsRef<str>>(repo_root: &Path, files: &[S], build_path: &Path) -> Result<usize> {
    let mut progress = Progress::new("Copying files", files.len());

    for (done, file) in files.iter().enumerate() {
        let relative = file.as_ref();
        let source = repo_root.join(relative);
        let dest = build_path.join(relative);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        fs::copy(&source, &dest).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                source.display(),
                dest.display()
            )
        })?;

        output::verbose(&format!("copied {relative}"));
        progress.update(done + 1);
    }

    progress.finish();
    Ok(files.len())
}

/// Write an artifact, creating its parent directories
///
/// A failed write may leave a truncated file behind.
///
/// # Errors
///
/// Returns an error naming `path` if the directory cannot be created, or
/// [`BuildError::Io`] if the file cannot be written.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    fs::write(path, contents).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_clear_missing_dir_is_ok() -> Result<()> {
        let dir = tempdir()?;
        clear_dir(&dir.path().join("nothing-here"))
    }

    #[test]
    fn test_clear_removes_tree() -> Result<()> {
        let dir = tempdir()?;
        let build = dir.path().join("build");
        fs::create_dir_all(build.join("src/classes"))?;
        fs::write(build.join("src/classes/Old.cls"), "stale")?;

        clear_dir(&build)?;
        assert!(!build.exists());
        Ok(())
    }

    #[test]
    fn test_remove_with_retry_treats_vanished_dir_as_removed() -> Result<()> {
        let dir = tempdir()?;
        remove_with_retry(&dir.path().join("already-gone"), 1)
    }

    #[test]
    fn test_remove_with_retry_reports_path_after_last_attempt() -> Result<()> {
        let dir = tempdir()?;
        // A regular file is not a directory tree, so every attempt fails
        let file = dir.path().join("artifact.txt");
        fs::write(&file, "x")?;

        let err = remove_with_retry(&file, 2).unwrap_err();
        assert!(err.to_string().contains("after 2 attempts"));
        assert!(err.to_string().contains("artifact.txt"));
        assert!(file.exists());
        Ok(())
    }

    #[test]
    fn test_stage_files_keeps_relative_layout() -> Result<()> {
        let dir = tempdir()?;
        let repo = dir.path().join("repo");
        fs::create_dir_all(repo.join("src/classes"))?;
        fs::write(repo.join("src/classes/Foo.cls"), "public class Foo {}")?;
        fs::write(repo.join("src/classes/Foo.cls-meta.xml"), "<xml/>")?;

        let build = dir.path().join("build");
        let files = ["src/classes/Foo.cls", "src/classes/Foo.cls-meta.xml"];
        let copied = stage_files(&repo, &files, &build)?;

        assert_eq!(copied, 2);
        assert_eq!(
            fs::read_to_string(build.join("src/classes/Foo.cls"))?,
            "public class Foo {}"
        );
        assert!(build.join("src/classes/Foo.cls-meta.xml").exists());
        Ok(())
    }

    #[test]
    fn test_stage_missing_source_fails() -> Result<()> {
        let dir = tempdir()?;
        let result = stage_files(&dir.path().join("repo"), &["src/a/B.cls"], &dir.path().join("build"));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_write_artifact_creates_parents() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("release/main/manifest.txt");
        write_artifact(&path, "classes/Foo.cls\r\n")?;
        assert_eq!(fs::read_to_string(&path)?, "classes/Foo.cls\r\n");
        Ok(())
    }

    #[test]
    fn test_write_artifact_failure_names_path() -> Result<()> {
        let dir = tempdir()?;
        // The target is an existing directory, so the write fails
        let path = dir.path().join("package.xml");
        fs::create_dir_all(&path)?;

        let err = write_artifact(&path, "<Package/>").unwrap_err();
        match err.downcast_ref::<BuildError>() {
            Some(BuildError::Io { path: failed, .. }) => assert_eq!(failed, &path),
            other => panic!("expected an I/O error, got {other:?}"),
        }
        Ok(())
    }
}
