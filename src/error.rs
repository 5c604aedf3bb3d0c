use std::fmt;
use std::path::PathBuf;

/// Errors and per-file anomalies raised while assembling a package.
///
/// `ConfigLoad` and `Io` always abort the run. `PathFormat` and
/// `UnresolvedFolderType` are isolated to a single file: they are collected as
/// warnings unless strict mode turns them into hard failures.
#[derive(Debug)]
pub enum BuildError {
    /// The folder-to-type definition file is missing or unparseable
    ConfigLoad {
        /// Path of the definition file
        path: PathBuf,
        /// Why loading failed
        reason: String,
    },
    /// A file path does not follow `<marker><folder>/<file>`
    PathFormat {
        /// The offending repository-relative path
        path: String,
        /// The configured source-root marker
        marker: String,
        /// What is wrong with the path
        reason: String,
    },
    /// A folder name has no entry in the lookup table
    UnresolvedFolderType {
        /// The offending repository-relative path
        path: String,
        /// Folder name that failed to resolve
        folder: String,
    },
    /// Reading or writing a build artifact failed
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl BuildError {
    /// Create a path format error for `path`
    #[must_use]
    pub fn path_format(path: &str, marker: &str, reason: impl Into<String>) -> Self {
        Self::PathFormat {
            path: path.to_string(),
            marker: marker.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error concerns a single file and can be downgraded to a warning
    #[must_use]
    pub const fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::PathFormat { .. } | Self::UnresolvedFolderType { .. }
        )
    }

    /// Get a short description of the error type
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::ConfigLoad { .. } => "Definition Load Error",
            Self::PathFormat { .. } => "Path Format Error",
            Self::UnresolvedFolderType { .. } => "Unresolved Folder Type",
            Self::Io { .. } => "I/O Error",
        }
    }

    /// Get a user-friendly error message with actionable guidance
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigLoad { .. } => format!(
                "{self}\n\nSuggestions:\n\
                 - Check the definition file path\n\
                 - The file must be a JSON array of {{\"folderName\", \"metadataType\"}} objects"
            ),
            Self::PathFormat { marker, .. } => format!(
                "{self}\n\nSuggestions:\n\
                 - Check that the source directory argument ('{marker}') matches the repository layout\n\
                 - Files outside the source directory cannot be packaged"
            ),
            Self::UnresolvedFolderType { folder, .. } => format!(
                "{self}\n\nSuggestions:\n\
                 - Add an entry for folder '{folder}' to the definition file"
            ),
            Self::Io { .. } => format!(
                "{self}\n\nSuggestions:\n\
                 - Check file and directory permissions\n\
                 - Ensure there is enough disk space"
            ),
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigLoad { path, reason } => {
                write!(
                    f,
                    "cannot load definition file {}: {reason}",
                    path.display()
                )
            }
            Self::PathFormat {
                path,
                marker,
                reason,
            } => write!(f, "malformed path '{path}' (source dir '{marker}'): {reason}"),
            Self::UnresolvedFolderType { path, folder } => {
                write!(f, "no metadata type for folder '{folder}' (from '{path}')")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
