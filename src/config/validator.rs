use super::{BuildConfig, RepoLocation};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Checks a build configuration before anything is deleted or cloned
pub struct ConfigValidator {
    /// Directory the build was started from
    working_dir: PathBuf,
}

impl ConfigValidator {
    /// Create a validator anchored at the process working directory
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined
    pub fn new() -> Result<Self> {
        let working_dir =
            std::env::current_dir().context("Failed to determine current directory")?;
        Ok(Self::with_working_dir(working_dir))
    }

    /// Create a validator anchored at `working_dir`
    #[must_use]
    pub fn with_working_dir(working_dir: PathBuf) -> Self {
        let working_dir = normalize(&working_dir);
        Self { working_dir }
    }

    /// Validate a configuration, returning non-fatal warnings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The source directory or branch is empty
    /// - The branch name could be mistaken for a git option
    /// - Clearing the build path or work directory would delete the filesystem
    ///   root, the working directory, or the local repository
    /// - The work directory overlaps the build path
    /// - A local repository path does not exist
    pub fn validate(&self, config: &BuildConfig) -> Result<Vec<String>> {
        let mut warnings = Vec::new();

        if config.source_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("Source directory must not be empty"));
        }

        if config.branch.trim().is_empty() {
            return Err(anyhow::anyhow!("Branch name must not be empty"));
        }
        if config.branch.starts_with('-') || config.branch.chars().any(char::is_whitespace) {
            return Err(anyhow::anyhow!("Invalid branch name: '{}'", config.branch));
        }

        self.check_cleared_dir("build path", &config.build_path)?;
        if let Some(work_dir) = &config.work_dir {
            self.check_cleared_dir("work directory", work_dir)?;
            self.check_work_dir(config, work_dir)?;
        }

        if let RepoLocation::Local(repo) = &config.repository {
            let repo = self.absolute(repo);
            if !repo.exists() {
                return Err(anyhow::anyhow!(
                    "Repository not found: {}",
                    config.repository
                ));
            }
            if repo.starts_with(self.absolute(&config.build_path)) {
                return Err(anyhow::anyhow!(
                    "Build path {} contains the repository {}; it would be deleted",
                    config.build_path.display(),
                    config.repository
                ));
            }
        }

        if !looks_like_api_version(&config.version) {
            warnings.push(format!(
                "Version '{}' does not look like an API version (e.g. 58.0)",
                config.version
            ));
        }

        if !config.source_dir.ends_with('/') {
            warnings.push(format!(
                "Source directory '{}' has no trailing '/'; it also matches longer folder names",
                config.source_dir
            ));
        }

        Ok(warnings)
    }

    /// `dir` is removed before every run
    fn check_cleared_dir(&self, label: &str, dir: &Path) -> Result<()> {
        let absolute = self.absolute(dir);

        if absolute.parent().is_none() {
            return Err(anyhow::anyhow!(
                "Refusing to use filesystem root as {label}"
            ));
        }
        if self.working_dir.starts_with(&absolute) {
            return Err(anyhow::anyhow!(
                "Refusing to use {} as {label}: it contains the current directory",
                dir.display()
            ));
        }

        Ok(())
    }

    /// The clone must not land in the repository it clones or in the build output
    fn check_work_dir(&self, config: &BuildConfig, work_dir: &Path) -> Result<()> {
        let work = self.absolute(work_dir);

        if let RepoLocation::Local(repo) = &config.repository {
            let repo = self.absolute(repo);
            if overlaps(&work, &repo) {
                return Err(anyhow::anyhow!(
                    "Work directory {} overlaps the repository {}; it would be deleted",
                    work_dir.display(),
                    config.repository
                ));
            }
        }

        if overlaps(&work, &self.absolute(&config.build_path)) {
            return Err(anyhow::anyhow!(
                "Work directory {} overlaps the build path {}",
                work_dir.display(),
                config.build_path.display()
            ));
        }

        Ok(())
    }

    /// Resolve `path` against the working directory
    fn absolute(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        };
        normalize(&joined)
    }
}

/// Canonicalize existing paths, otherwise fold `.` and `..` lexically
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Whether either path is the other or lies below it
fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

/// `NN.N` style API version
fn looks_like_api_version(version: &str) -> bool {
    version.split_once('.').is_some_and(|(major, minor)| {
        !major.is_empty()
            && !minor.is_empty()
            && major.chars().all(|c| c.is_ascii_digit())
            && minor.chars().all(|c| c.is_ascii_digit())
    })
}
