//! Folder-name to metadata-type lookup table.
//!
//! The definition file is a JSON array:
//!
//! ```json
//! [
//!   { "folderName": "classes", "metadataType": "ApexClass" },
//!   { "folderName": "triggers", "metadataType": "ApexTrigger" }
//! ]
//! ```
//!
//! Entries are collapsed into a map keyed by folder name; a repeated folder
//! name overwrites the earlier entry.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// One row of the definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderTypeEntry {
    /// Folder directly under the source root (e.g. `classes`)
    pub folder_name: String,
    /// Metadata type declared for that folder (e.g. `ApexClass`)
    pub metadata_type: String,
}

/// Immutable mapping from folder name to metadata type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeLookupTable {
    /// Folder name to metadata type
    types: HashMap<String, String>,
}

impl TypeLookupTable {
    /// Load the table from a JSON definition file
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ConfigLoad`] if the file cannot be read or is not a
    /// JSON array of folder/type entries.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let table = Self::from_json(&content).map_err(|e| BuildError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if table.is_empty() {
            warn!(path = %path.display(), "definition file contains no entries");
        }
        debug!(path = %path.display(), folders = table.len(), "loaded type definitions");

        Ok(table)
    }

    /// Parse the table from JSON text
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text is not a list of entries.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        let entries: Vec<FolderTypeEntry> = serde_json::from_str(content)?;
        Ok(Self::from_entries(entries))
    }

    /// Build the table from entries in order (last duplicate wins)
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = FolderTypeEntry>,
    {
        let types = entries
            .into_iter()
            .map(|entry| (entry.folder_name, entry.metadata_type))
            .collect();
        Self { types }
    }

    /// Resolve a folder name to its metadata type
    #[must_use]
    pub fn resolve(&self, folder: &str) -> Option<&str> {
        self.types.get(folder).map(String::as_str)
    }

    /// Number of distinct folder names
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, S)> for TypeLookupTable {
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        Self::from_entries(iter.into_iter().map(|(folder, ty)| FolderTypeEntry {
            folder_name: folder.into(),
            metadata_type: ty.into(),
        }))
    }
}
