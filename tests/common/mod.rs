#![allow(dead_code)]

use anyhow::{Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Folder definitions used by most tests
pub const DEFINITIONS: &[(&str, &str)] = &[
    ("classes", "ApexClass"),
    ("triggers", "ApexTrigger"),
    ("objects", "CustomObject"),
    ("pages", "ApexPage"),
];

/// A throwaway source repository plus the directories a build needs
pub struct Fixture {
    pub temp_dir: TempDir,
    pub repo: PathBuf,
    pub build: PathBuf,
    pub definitions: PathBuf,
}

impl Fixture {
    /// Initialize a repository with `branch` checked out and write the
    /// standard definition file
    pub fn new(branch: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let repo = temp_dir.path().join("source");
        fs::create_dir_all(&repo)?;

        git(&repo, &["init", "--quiet"])?;
        git(&repo, &["checkout", "--quiet", "-b", branch])?;
        git(&repo, &["config", "user.email", "test@example.com"])?;
        git(&repo, &["config", "user.name", "Test User"])?;
        git(&repo, &["config", "commit.gpgsign", "false"])?;

        let definitions = temp_dir.path().join("types.json");
        write_definitions(&definitions, DEFINITIONS)?;

        Ok(Self {
            build: temp_dir.path().join("build"),
            temp_dir,
            repo,
            definitions,
        })
    }

    /// Write a file into the working tree
    pub fn write(&self, relative: &str, contents: &str) -> Result<()> {
        let path = self.repo.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    /// Delete a file from the working tree
    pub fn remove(&self, relative: &str) -> Result<()> {
        fs::remove_file(self.repo.join(relative))?;
        Ok(())
    }

    /// Stage everything and commit
    pub fn commit(&self, message: &str) -> Result<()> {
        git(&self.repo, &["add", "--all"])?;
        git(&self.repo, &["commit", "--quiet", "-m", message])
    }

    /// Write, then commit, a batch of files
    pub fn commit_files(&self, files: &[&str], message: &str) -> Result<()> {
        for file in files {
            self.write(file, &format!("// {file}"))?;
        }
        self.commit(message)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// Write a JSON definition file
pub fn write_definitions(path: &Path, entries: &[(&str, &str)]) -> Result<()> {
    let entries: Vec<serde_json::Value> = entries
        .iter()
        .map(|(folder, metadata_type)| {
            serde_json::json!({ "folderName": folder, "metadataType": metadata_type })
        })
        .collect();
    fs::write(path, serde_json::to_string_pretty(&entries)?)?;
    Ok(())
}

/// Run git in `dir`, failing on a non-zero exit
pub fn git(dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}
