use crate::classify::ClassificationIndex;
use crate::config::BuildConfig;
use crate::config::validator::ConfigValidator;
use crate::definitions::TypeLookupTable;
use crate::git::{self, SourceRepository};
use crate::output;
use crate::package::{Manifest, PackageDescriptor};
use crate::workspace;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// What a build produced
#[derive(Debug)]
pub struct BuildReport {
    /// Commit the package was built from
    pub head_commit: String,
    /// Repository-relative files selected from the branch
    pub files: Vec<String>,
    /// The generated package descriptor
    pub descriptor: PackageDescriptor,
    /// Manifest lines, without line endings
    pub manifest_entries: Vec<String>,
    /// Objects left out of the descriptor, as `(object, folder)`
    pub unresolved: Vec<(String, String)>,
    /// Rendered warnings, each reported once
    pub warnings: Vec<String>,
    /// Where `package.xml` was written
    pub package_xml: PathBuf,
    /// Where `manifest.txt` was written
    pub manifest_path: PathBuf,
    /// Wall-clock duration of the build
    pub elapsed: Duration,
}

/// Build the package for `config`
///
/// Steps, in order: validate the configuration, load type definitions,
/// clear the build path, clone the branch, list its files, classify them,
/// copy them into the build path, then write `package.xml` and
/// `manifest.txt`.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid or git is not installed
/// - The definition file is missing or malformed
/// - The clone or file listing fails
/// - Strict mode is on and a file cannot be classified
/// - A file cannot be copied or an artifact cannot be written
pub fn execute(config: &BuildConfig) -> Result<BuildReport> {
    let started = Instant::now();

    for warning in ConfigValidator::new()?.validate(config)? {
        output::warning(&warning);
    }
    git::ensure_git_available()?;

    let table = TypeLookupTable::load(&config.definition_path)?;
    output::info(&format!(
        "Loaded {} folder definitions from {}",
        table.len(),
        config.definition_path.display()
    ));

    output::action("Cleaning", &config.build_path.display().to_string());
    workspace::clear_dir(&config.build_path)?;

    // Held until the end of the build; dropping it removes the clone
    let mut temp_dir = None;
    let clone_dest = match &config.work_dir {
        Some(dir) => {
            workspace::clear_dir(dir)?;
            dir.clone()
        }
        None => {
            let dir = tempfile::Builder::new()
                .prefix("sfdc-git-diff-")
                .tempdir()
                .context("Failed to create temporary work directory")?;
            let dest = dir.path().join("repo");
            temp_dir = Some(dir);
            dest
        }
    };

    output::action(
        "Cloning",
        &format!("{} (branch {})", config.repository, config.branch),
    );
    let repo = SourceRepository::clone_into(&config.repository, &config.branch, &clone_dest)?;
    let head_commit = repo.head_commit()?;
    let files = repo.list_files(config.selection)?;
    output::info(&format!(
        "{} files selected at {}",
        files.len(),
        head_commit.get(..12).unwrap_or(&head_commit)
    ));

    output::action("Classifying", &format!("{} files", files.len()));
    let index = ClassificationIndex::build(&files, &config.source_dir, &table, config.policy)?;
    for (object, resolution) in index.objects() {
        output::verbose(&format!("{resolution}: {object}"));
    }

    output::action("Copying", &format!("{} files", files.len()));
    workspace::stage_files(repo.path(), &files, &config.build_path)?;

    let descriptor = PackageDescriptor::build(&index, &config.version);
    let package_xml = config.package_xml_path();
    workspace::write_artifact(&package_xml, &descriptor.to_xml()?)?;
    output::success(&format!("Package XML saved to {}", package_xml.display()));

    let manifest = Manifest::build(&files, &config.source_dir, config.policy)?;
    let manifest_path = config.manifest_path();
    workspace::write_artifact(&manifest_path, &manifest.render())?;
    output::success(&format!("Manifest saved to {}", manifest_path.display()));

    let mut warnings: Vec<String> = Vec::new();
    for anomaly in index.warnings().iter().chain(manifest.warnings()) {
        let message = anomaly.to_string();
        if !warnings.contains(&message) {
            output::warning(&message);
            warnings.push(message);
        }
    }

    drop(temp_dir);
    let elapsed = started.elapsed();

    info!(
        files = files.len(),
        objects = descriptor.member_count(),
        types = descriptor.groups.len(),
        manifest = manifest.len(),
        warnings = warnings.len(),
        "build finished"
    );
    output::info(&format!(
        "{} objects in {} types, {} manifest entries, {} warnings ({})",
        descriptor.member_count(),
        descriptor.groups.len(),
        manifest.len(),
        warnings.len(),
        humantime::format_duration(round_to_millis(elapsed))
    ));

    Ok(BuildReport {
        head_commit,
        unresolved: index
            .unresolved()
            .map(|(object, folder)| (object.to_string(), folder.to_string()))
            .collect(),
        manifest_entries: manifest.entries().to_vec(),
        descriptor,
        files,
        warnings,
        package_xml,
        manifest_path,
        elapsed,
    })
}

/// `humantime` prints every unit down to nanoseconds
fn round_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
