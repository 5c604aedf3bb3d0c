//! Path classification.
//!
//! A repository path is read as
//!
//! ```text
//! <scaffolding><source-root marker><folder>/<file>[/...]
//! ```
//!
//! The folder names the metadata type (through the [`TypeLookupTable`]) and
//! the file name, cut at its first `.`, names the object. Everything before
//! the first occurrence of the marker is repository scaffolding.

mod index;

pub use index::ClassificationIndex;

use crate::definitions::TypeLookupTable;
use crate::error::BuildError;
use std::fmt;

/// Paths whose remainder contains this text are metadata companions
/// (`Foo.cls-meta.xml`) or descriptors and never drive type discovery.
pub const METADATA_FILE_MARKER: &str = "xml";

/// Outcome of resolving a folder name against the lookup table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeResolution {
    /// Folder maps to this metadata type
    Resolved(String),
    /// Folder is not in the lookup table
    Unresolved {
        /// Folder name that failed to resolve
        folder: String,
    },
}

impl TypeResolution {
    /// The metadata type, if resolved
    #[must_use]
    pub fn metadata_type(&self) -> Option<&str> {
        match self {
            Self::Resolved(name) => Some(name),
            Self::Unresolved { .. } => None,
        }
    }

    /// Whether the folder resolved to a type
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl fmt::Display for TypeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(name) => write!(f, "{name}"),
            Self::Unresolved { folder } => write!(f, "<unresolved: {folder}>"),
        }
    }
}

/// An object discovered from one file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedObject {
    /// File name up to its first `.`
    pub object_name: String,
    /// Folder the file lives in
    pub folder: String,
    /// Metadata type of the folder
    pub resolution: TypeResolution,
}

/// Why a path did not produce an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Remainder after the marker has no folder component
    NoFolder,
    /// Remainder mentions `xml` (metadata companion or descriptor)
    MetadataFile,
    /// File name starts with `.`, leaving no object name; such files are
    /// dropped rather than recorded under an empty member name
    HiddenFile,
}

/// Result of classifying a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The path names an object
    Object(ClassifiedObject),
    /// The path is ignored for type discovery
    Skipped(SkipReason),
}

/// The `<folder>/<file>` head of a path below the source root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePath<'a> {
    /// First segment below the marker
    pub folder: &'a str,
    /// Second segment below the marker
    pub file_name: &'a str,
}

impl<'a> SourcePath<'a> {
    /// Split a marker-relative path into folder and file name.
    ///
    /// Returns `Ok(None)` when there is no `/`; deeper paths
    /// (`aura/Widget/Widget.cmp`) keep only the first two segments.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when either segment is empty.
    pub fn parse(relative: &'a str) -> Result<Option<Self>, &'static str> {
        let Some((folder, rest)) = relative.split_once('/') else {
            return Ok(None);
        };
        let file_name = rest.split('/').next().unwrap_or_default();

        if folder.is_empty() {
            return Err("empty folder name");
        }
        if file_name.is_empty() {
            return Err("empty file name");
        }

        Ok(Some(Self { folder, file_name }))
    }

    /// File name truncated at its first `.`
    #[must_use]
    pub fn object_name(&self) -> &'a str {
        self.file_name
            .split_once('.')
            .map_or(self.file_name, |(name, _)| name)
    }
}

/// Return the part of `path` after the first occurrence of `marker`
///
/// # Errors
///
/// Returns [`BuildError::PathFormat`] when the marker does not occur in `path`.
pub fn strip_source_root<'a>(path: &'a str, marker: &str) -> Result<&'a str, BuildError> {
    path.split_once(marker)
        .map(|(_, relative)| relative)
        .ok_or_else(|| BuildError::path_format(path, marker, "source directory not found in path"))
}

/// Classify one repository path
///
/// # Errors
///
/// Returns [`BuildError::PathFormat`] when the marker is missing or the
/// folder/file segments are empty. Unknown folders are not an error here;
/// they come back as [`TypeResolution::Unresolved`].
pub fn classify(
    path: &str,
    marker: &str,
    table: &TypeLookupTable,
) -> Result<Classification, BuildError> {
    let relative = strip_source_root(path, marker)?;

    if !relative.contains('/') {
        return Ok(Classification::Skipped(SkipReason::NoFolder));
    }
    if relative.contains(METADATA_FILE_MARKER) {
        return Ok(Classification::Skipped(SkipReason::MetadataFile));
    }

    let source = match SourcePath::parse(relative) {
        Ok(Some(source)) => source,
        Ok(None) => return Ok(Classification::Skipped(SkipReason::NoFolder)),
        Err(reason) => return Err(BuildError::path_format(path, marker, reason)),
    };

    let object_name = source.object_name();
    if object_name.is_empty() {
        return Ok(Classification::Skipped(SkipReason::HiddenFile));
    }

    let resolution = table.resolve(source.folder).map_or_else(
        || TypeResolution::Unresolved {
            folder: source.folder.to_string(),
        },
        |ty| TypeResolution::Resolved(ty.to_string()),
    );

    Ok(Classification::Object(ClassifiedObject {
        object_name: object_name.to_string(),
        folder: source.folder.to_string(),
        resolution,
    }))
}
