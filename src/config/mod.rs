pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{MANIFEST_FILE, PACKAGE_XML, RELEASE_DIR};

/// Settings for a single package build, assembled from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output directory that receives the copied sources and artifacts
    pub build_path: PathBuf,
    /// Repository to clone
    pub repository: RepoLocation,
    /// Deployment API version written verbatim into `package.xml`
    pub version: String,
    /// JSON file mapping folder names to metadata types
    pub definition_path: PathBuf,
    /// Source-root marker (e.g. `src/` or `force-app/main/default/`)
    pub source_dir: String,
    /// Branch to clone
    pub branch: String,

    /// Which files of the branch are packaged
    #[serde(default)]
    pub selection: FileSelection,

    /// How per-file anomalies are handled
    #[serde(default)]
    pub policy: AnomalyPolicy,

    /// Directory for the clone; a temporary directory is used when absent
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

/// Where the repository lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "location")]
pub enum RepoLocation {
    /// Network URL (`https://`, `http://`, `ssh://`, `git@host:`)
    Remote(String),
    /// Path to a repository on this machine
    Local(PathBuf),
}

/// File set taken from the head of the branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileSelection {
    /// Every file in the HEAD tree
    #[default]
    AllAtHead,
    /// Files added or modified by the HEAD commit
    SinceLastCommit,
}

/// What to do with a file that cannot be classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyPolicy {
    /// Skip the file and record a warning
    #[default]
    Warn,
    /// Abort the build
    Strict,
}

impl RepoLocation {
    /// Classify a command-line repository argument
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let is_remote = location.contains("http:")
            || location.contains("https://")
            || location.starts_with("ssh://")
            || location.starts_with("git@")
            || location.starts_with("file://");

        if is_remote {
            Self::Remote(location.to_string())
        } else {
            Self::Local(PathBuf::from(location))
        }
    }

    /// Argument passed to `git clone`
    #[must_use]
    pub fn as_clone_arg(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Local(path) => path.display().to_string(),
        }
    }

    /// Whether the repository is reached over the network
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for RepoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl BuildConfig {
    /// Create a config with default selection, policy, and work directory
    #[must_use]
    pub fn new(
        build_path: impl Into<PathBuf>,
        repository: &str,
        version: impl Into<String>,
        definition_path: impl Into<PathBuf>,
        source_dir: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            build_path: build_path.into(),
            repository: RepoLocation::parse(repository),
            version: version.into(),
            definition_path: definition_path.into(),
            source_dir: source_dir.into(),
            branch: branch.into(),
            selection: FileSelection::default(),
            policy: AnomalyPolicy::default(),
            work_dir: None,
        }
    }

    /// `<build>/<source dir>/package.xml`
    #[must_use]
    pub fn package_xml_path(&self) -> PathBuf {
        self.build_path
            .join(source_dir_as_path(&self.source_dir))
            .join(PACKAGE_XML)
    }

    /// `<build>/release/<branch>`
    #[must_use]
    pub fn release_dir(&self) -> PathBuf {
        self.build_path.join(RELEASE_DIR).join(&self.branch)
    }

    /// `<build>/release/<branch>/manifest.txt`
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.release_dir().join(MANIFEST_FILE)
    }

    /// Whether strict mode is enabled
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.policy == AnomalyPolicy::Strict
    }
}

/// Leading slashes are stripped so the marker always resolves inside the build path.
fn source_dir_as_path(source_dir: &str) -> &Path {
    Path::new(source_dir.trim_start_matches('/'))
}
