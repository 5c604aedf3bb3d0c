#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # sfdc-git-diff - Salesforce deployment package builder
//!
//! Clones one branch of a git repository, classifies every file under a
//! source directory into a Salesforce metadata type, and writes the two
//! artifacts a deployment needs:
//!
//! - `package.xml`: metadata types, each with its object names, plus the API version
//! - `manifest.txt`: the packaged files relative to the source directory, CRLF-separated
//!
//! ## Architecture
//!
//! - [`definitions`]: folder name to metadata type lookup, loaded from JSON
//! - [`classify`]: path parsing and the per-branch classification index
//! - [`package`]: `package.xml` and `manifest.txt` generation
//! - [`git`]: cloning and file listing through the `git` binary
//! - [`workspace`]: build directory clearing, file staging, artifact writes
//! - [`commands`]: the end-to-end build
//! - [`config`]: build configuration and validation
//! - [`output`]: terminal output and progress display
//!
//! ## Example Usage
//!
//! ```no_run
//! use sfdc_git_diff::config::BuildConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = BuildConfig::new(
//!     "/tmp/build",
//!     "https://example.com/org/metadata.git",
//!     "58.0",
//!     "folder-types.json",
//!     "src/",
//!     "release-42",
//! );
//! let report = sfdc_git_diff::commands::build::execute(&config)?;
//! println!("{} objects packaged", report.descriptor.member_count());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// The build command.
pub mod commands;

/// Build configuration and validation.
pub mod config;

/// Path classification into metadata types.
pub mod classify;

/// Folder to metadata type definitions.
pub mod definitions;

/// Error types for loading definitions and classifying paths.
pub mod error;

/// Git repository access (clone, file listing).
pub mod git;

/// Output formatting and progress display.
pub mod output;

/// `package.xml` and `manifest.txt` generation.
pub mod package;

/// Build directory management.
pub mod workspace;

pub use error::BuildError;

/// Current version of the sfdc-git-diff binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the package descriptor.
pub const PACKAGE_XML: &str = "package.xml";

/// File name of the release manifest.
pub const MANIFEST_FILE: &str = "manifest.txt";

/// Directory under the build path that holds per-branch manifests.
pub const RELEASE_DIR: &str = "release";

/// XML namespace of the Salesforce Metadata API.
pub const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";
