//! Release manifest: the deployable files, relative to the source root.

use crate::MANIFEST_FILE;
use crate::classify::strip_source_root;
use crate::config::AnomalyPolicy;
use crate::error::BuildError;
use tracing::{debug, warn};

/// Paths containing this are descriptors or metadata companions.
pub const DESCRIPTOR_EXTENSION: &str = ".xml";

/// Line terminator expected by the deployment tool
pub const LINE_ENDING: &str = "\r\n";

/// Ordered list of deployable relative paths.
#[derive(Debug, Default)]
pub struct Manifest {
    entries: Vec<String>,
    warnings: Vec<BuildError>,
}

impl Manifest {
    /// Filter and relativize `paths`, keeping their order.
    ///
    /// A path is left out when it contains `.xml` or the manifest's own file
    /// name. Paths without the marker follow `policy`.
    ///
    /// # Errors
    ///
    /// Under [`AnomalyPolicy::Strict`], returns [`BuildError::PathFormat`] for
    /// the first included path that lacks the marker.
    pub fn build<I, S>(paths: I, marker: &str, policy: AnomalyPolicy) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut manifest = Self::default();

        for path in paths {
            let path = path.as_ref();
            if is_excluded(path) {
                debug!(path, "excluded from manifest");
                continue;
            }

            match strip_source_root(path, marker) {
                Ok(relative) => manifest.entries.push(relative.to_string()),
                Err(err) if policy == AnomalyPolicy::Warn && err.is_per_file() => {
                    warn!(error = %err, "leaving file out of manifest");
                    manifest.warnings.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(manifest)
    }

    /// Manifest entries in input order
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Anomalies that were downgraded to warnings
    #[must_use]
    pub fn warnings(&self) -> &[BuildError] {
        &self.warnings
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One entry per line, each terminated by `\r\n`
    #[must_use]
    pub fn render(&self) -> String {
        self.entries.iter().fold(String::new(), |mut out, entry| {
            out.push_str(entry);
            out.push_str(LINE_ENDING);
            out
        })
    }
}

/// Descriptor files and earlier manifests are never shipped
fn is_excluded(path: &str) -> bool {
    path.contains(DESCRIPTOR_EXTENSION) || path.contains(MANIFEST_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_and_strips() {
        let manifest = Manifest::build(
            [
                "force-app/main/default/classes/Foo.cls",
                "force-app/main/default/classes/Foo.cls-meta.xml",
                "force-app/main/default/package.xml",
                "force-app/main/default/release/main/manifest.txt",
                "force-app/main/default/staticresources/logo.png",
            ],
            "default/",
            AnomalyPolicy::Warn,
        )
        .unwrap();

        assert_eq!(
            manifest.entries(),
            ["classes/Foo.cls", "staticresources/logo.png"]
        );
        assert!(manifest.warnings().is_empty());
    }

    #[test]
    fn test_render_uses_crlf() {
        let manifest = Manifest::build(
            ["src/classes/A.cls", "src/classes/B.cls"],
            "src/",
            AnomalyPolicy::Warn,
        )
        .unwrap();
        assert_eq!(manifest.render(), "classes/A.cls\r\nclasses/B.cls\r\n");
    }

    #[test]
    fn test_empty_manifest_renders_empty() {
        let manifest = Manifest::build(Vec::<String>::new(), "src/", AnomalyPolicy::Warn).unwrap();
        assert!(manifest.is_empty());
        assert_eq!(manifest.render(), "");
    }

    #[test]
    fn test_root_level_file_is_kept() {
        let manifest =
            Manifest::build(["src/README"], "src/", AnomalyPolicy::Warn).unwrap();
        assert_eq!(manifest.entries(), ["README"]);
    }

    #[test]
    fn test_missing_marker_policy() {
        let manifest = Manifest::build(
            ["docs/guide.md", "src/classes/A.cls"],
            "src/",
            AnomalyPolicy::Warn,
        )
        .unwrap();
        assert_eq!(manifest.entries(), ["classes/A.cls"]);
        assert!(matches!(manifest.warnings(), [BuildError::PathFormat { .. }]));

        let err = Manifest::build(["docs/guide.md"], "src/", AnomalyPolicy::Strict).unwrap_err();
        assert!(matches!(err, BuildError::PathFormat { .. }));
    }

    #[test]
    fn test_excluded_paths_need_no_marker() {
        let manifest =
            Manifest::build(["docs/pom.xml"], "src/", AnomalyPolicy::Strict).unwrap();
        assert!(manifest.is_empty());
    }
}
