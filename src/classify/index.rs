use super::{Classification, ClassifiedObject, TypeResolution, classify};
use crate::config::AnomalyPolicy;
use crate::definitions::TypeLookupTable;
use crate::error::BuildError;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{Level, debug, span, warn};

/// Objects and types discovered across a whole file list.
///
/// Object names are unique: recording the same name twice keeps the last
/// resolution. Iteration is sorted by name so descriptor output is stable.
#[derive(Debug, Default)]
pub struct ClassificationIndex {
    /// Object name to the type of the folder it was last seen in
    objects: BTreeMap<String, TypeResolution>,
    /// Every resolution recorded, unresolved folders included
    types: BTreeSet<TypeResolution>,
    /// Per-file anomalies downgraded to warnings
    warnings: Vec<BuildError>,
}

impl ClassificationIndex {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every path and accumulate the results
    ///
    /// With [`AnomalyPolicy::Warn`], malformed paths are skipped and unresolved
    /// folders are recorded as unresolved; both are kept as warnings.
    ///
    /// # Errors
    ///
    /// With [`AnomalyPolicy::Strict`], returns the first
    /// [`BuildError::PathFormat`] or [`BuildError::UnresolvedFolderType`].
    pub fn build<I, S>(
        paths: I,
        marker: &str,
        table: &TypeLookupTable,
        policy: AnomalyPolicy,
    ) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let span = span!(Level::DEBUG, "classify", marker);
        let _guard = span.enter();

        let mut index = Self::new();

        for path in paths {
            let path = path.as_ref();
            match classify(path, marker, table) {
                Ok(Classification::Object(object)) => {
                    if let TypeResolution::Unresolved { folder } = &object.resolution {
                        let anomaly = BuildError::UnresolvedFolderType {
                            path: path.to_string(),
                            folder: folder.clone(),
                        };
                        index.note(anomaly, policy)?;
                    }
                    debug!(path, object = %object.object_name, resolution = %object.resolution, "classified");
                    index.record(object);
                }
                Ok(Classification::Skipped(reason)) => {
                    debug!(path, ?reason, "skipped");
                }
                Err(err) => index.note(err, policy)?,
            }
        }

        Ok(index)
    }

    /// Record one object, replacing any earlier object of the same name
    pub fn record(&mut self, object: ClassifiedObject) {
        self.types.insert(object.resolution.clone());

        if let Some(previous) = self
            .objects
            .insert(object.object_name.clone(), object.resolution.clone())
            && previous != object.resolution
        {
            warn!(
                object = %object.object_name,
                from = %previous,
                to = %object.resolution,
                "object name seen under two types; keeping the last"
            );
        }
    }

    /// Keep a per-file anomaly, or fail under strict policy
    fn note(&mut self, anomaly: BuildError, policy: AnomalyPolicy) -> Result<(), BuildError> {
        match policy {
            AnomalyPolicy::Warn if anomaly.is_per_file() => {
                warn!(error = %anomaly, "skipping file");
                self.warnings.push(anomaly);
                Ok(())
            }
            _ => Err(anomaly),
        }
    }

    /// All objects in name order
    pub fn objects(&self) -> impl Iterator<Item = (&str, &TypeResolution)> {
        self.objects.iter().map(|(name, res)| (name.as_str(), res))
    }

    /// Every resolution recorded, in sorted order
    pub fn recorded_types(&self) -> impl Iterator<Item = &TypeResolution> {
        self.types.iter()
    }

    /// Resolved metadata types in name order
    pub fn metadata_types(&self) -> impl Iterator<Item = &str> {
        self.types.iter().filter_map(TypeResolution::metadata_type)
    }

    /// Object names currently classified as `metadata_type`, in name order
    pub fn members_of<'a>(&'a self, metadata_type: &'a str) -> impl Iterator<Item = &'a str> {
        self.objects
            .iter()
            .filter(move |(_, res)| res.metadata_type() == Some(metadata_type))
            .map(|(name, _)| name.as_str())
    }

    /// Objects whose folder did not resolve, as `(object, folder)`
    pub fn unresolved(&self) -> impl Iterator<Item = (&str, &str)> {
        self.objects.iter().filter_map(|(name, res)| match res {
            TypeResolution::Unresolved { folder } => Some((name.as_str(), folder.as_str())),
            TypeResolution::Resolved(_) => None,
        })
    }

    /// Anomalies that were downgraded to warnings
    #[must_use]
    pub fn warnings(&self) -> &[BuildError] {
        &self.warnings
    }

    /// Number of distinct objects
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no object was classified
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TypeLookupTable {
        [("classes", "ApexClass"), ("triggers", "ApexTrigger")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_build_groups_by_type() {
        let paths = [
            "src/classes/Foo.cls",
            "src/classes/Bar.cls",
            "src/triggers/OnInsert.trigger",
        ];
        let index =
            ClassificationIndex::build(paths, "src/", &table(), AnomalyPolicy::Warn).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(
            index.metadata_types().collect::<Vec<_>>(),
            ["ApexClass", "ApexTrigger"]
        );
        assert_eq!(
            index.members_of("ApexClass").collect::<Vec<_>>(),
            ["Bar", "Foo"]
        );
        assert!(index.warnings().is_empty());
    }

    #[test]
    fn test_duplicate_object_recorded_once() {
        let paths = ["src/classes/Foo.cls", "src/classes/Foo.cls"];
        let index =
            ClassificationIndex::build(paths, "src/", &table(), AnomalyPolicy::Warn).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.members_of("ApexClass").count(), 1);
    }

    #[test]
    fn test_last_write_wins_across_types() {
        let paths = ["src/classes/Shared.cls", "src/triggers/Shared.trigger"];
        let index =
            ClassificationIndex::build(paths, "src/", &table(), AnomalyPolicy::Warn).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.members_of("ApexClass").count(), 0);
        assert_eq!(
            index.members_of("ApexTrigger").collect::<Vec<_>>(),
            ["Shared"]
        );
    }

    #[test]
    fn test_unresolved_folder_recorded_with_warning() {
        let paths = ["src/widgets/Gadget.widget"];
        let index =
            ClassificationIndex::build(paths, "src/", &table(), AnomalyPolicy::Warn).unwrap();

        assert_eq!(index.unresolved().collect::<Vec<_>>(), [("Gadget", "widgets")]);
        assert_eq!(index.metadata_types().count(), 0);
        assert_eq!(index.recorded_types().count(), 1);
        assert!(matches!(
            index.warnings(),
            [BuildError::UnresolvedFolderType { .. }]
        ));
    }

    #[test]
    fn test_malformed_path_skipped_with_warning() {
        let paths = ["README.md", "src/classes/Foo.cls"];
        let index =
            ClassificationIndex::build(paths, "src/", &table(), AnomalyPolicy::Warn).unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.objects().all(|(name, _)| !name.is_empty()));
        assert!(matches!(index.warnings(), [BuildError::PathFormat { .. }]));
    }

    #[test]
    fn test_strict_policy_fails_fast() {
        let err = ClassificationIndex::build(
            ["src/widgets/Gadget.widget"],
            "src/",
            &table(),
            AnomalyPolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::UnresolvedFolderType { .. }));

        let err =
            ClassificationIndex::build(["README.md"], "src/", &table(), AnomalyPolicy::Strict)
                .unwrap_err();
        assert!(matches!(err, BuildError::PathFormat { .. }));
    }

    #[test]
    fn test_empty_input() {
        let index = ClassificationIndex::build(
            Vec::<String>::new(),
            "src/",
            &table(),
            AnomalyPolicy::Warn,
        )
        .unwrap();
        assert!(index.is_empty());
        assert_eq!(index.recorded_types().count(), 0);
    }
}
