//! Command-line interface definitions for sfdc-git-diff.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so
//! missing_docs is allowed for this module.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use crate::config::{AnomalyPolicy, BuildConfig, FileSelection};
use crate::output::Verbosity;
use clap::Parser;
use std::path::PathBuf;

/// Main CLI structure for sfdc-git-diff.
#[derive(Parser, Debug)]
#[command(
    name = "sfdc-git-diff",
    version = crate::VERSION,
    about = "Build a Salesforce deployment package from a git branch",
    long_about = "Clones a branch, copies its files into a build directory, and writes \
                  package.xml (metadata types and members) and manifest.txt (packaged files)"
)]
pub struct Cli {
    /// Directory the package is built in (cleared first)
    pub build_path: PathBuf,

    /// Repository URL or local path to clone
    pub repository: String,

    /// Metadata API version written to package.xml (e.g. 58.0)
    #[arg(id = "api_version", value_name = "VERSION")]
    pub version: String,

    /// JSON file mapping folder names to metadata types
    pub definition: PathBuf,

    /// Source directory inside the repository (e.g. src/)
    pub source_dir: String,

    /// Branch to clone
    pub branch: String,

    /// Package only files changed by the last commit on the branch
    #[arg(long)]
    pub since_last_commit: bool,

    /// Fail on the first file that cannot be classified
    #[arg(long)]
    pub strict: bool,

    /// Clone into this directory instead of a temporary one (cleared first)
    #[arg(long, env = "SFDC_GIT_DIFF_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Show every classified object and copied file
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Build configuration described by the arguments
    #[must_use]
    pub fn to_config(&self) -> BuildConfig {
        let mut config = BuildConfig::new(
            self.build_path.clone(),
            &self.repository,
            self.version.clone(),
            self.definition.clone(),
            self.source_dir.clone(),
            self.branch.clone(),
        );
        if self.since_last_commit {
            config.selection = FileSelection::SinceLastCommit;
        }
        if self.strict {
            config.policy = AnomalyPolicy::Strict;
        }
        config.work_dir.clone_from(&self.work_dir);
        config
    }

    /// Output verbosity requested by the flags
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoLocation;
    use clap::CommandFactory;

    const ARGS: [&str; 7] = [
        "sfdc-git-diff",
        "/tmp/build",
        "https://example.com/org/repo.git",
        "58.0",
        "types.json",
        "src/",
        "main",
    ];

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_arguments_map_to_config() {
        let cli = Cli::try_parse_from(ARGS).unwrap();
        let config = cli.to_config();

        assert_eq!(config.build_path, PathBuf::from("/tmp/build"));
        assert!(matches!(config.repository, RepoLocation::Remote(_)));
        assert_eq!(config.version, "58.0");
        assert_eq!(config.source_dir, "src/");
        assert_eq!(config.branch, "main");
        assert_eq!(config.selection, FileSelection::AllAtHead);
        assert_eq!(config.policy, AnomalyPolicy::Warn);
        assert_eq!(cli.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_flags() {
        let mut args = ARGS.to_vec();
        args.extend(["--since-last-commit", "--strict", "-q"]);
        let cli = Cli::try_parse_from(args).unwrap();
        let config = cli.to_config();

        assert_eq!(config.selection, FileSelection::SinceLastCommit);
        assert_eq!(config.policy, AnomalyPolicy::Strict);
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        assert!(Cli::try_parse_from(&ARGS[..6]).is_err());
    }

    #[test]
    fn test_extra_argument_is_rejected() {
        let mut args = ARGS.to_vec();
        args.push("unexpected");
        assert!(Cli::try_parse_from(args).is_err());
    }
}
