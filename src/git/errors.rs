use std::fmt;

/// Categorized git operation errors with actionable guidance
#[derive(Debug)]
pub enum GitError {
    /// Network-related errors (DNS, connection timeout, unreachable)
    Network(String),
    /// Authentication failures (SSH keys, passwords, tokens)
    Authentication(String),
    /// Repository or branch not found
    NotFound(String),
    /// Bad revision, e.g. `HEAD~1` on a root commit
    InvalidRef(String),
    /// File system permission errors
    Permission(String),
    /// Unknown or uncategorized error
    Unknown(String),
}

impl GitError {
    /// Parse git command stderr to categorize the error
    #[must_use]
    pub fn from_stderr(command: &str, stderr: &str) -> Self {
        let stderr_lower = stderr.to_lowercase();
        let detail = extract_meaningful_message(stderr);

        if stderr_lower.contains("could not resolve host")
            || stderr_lower.contains("connection timed out")
            || stderr_lower.contains("network is unreachable")
            || stderr_lower.contains("failed to connect")
            || stderr_lower.contains("connection refused")
            || stderr_lower.contains("early eof")
        {
            return Self::Network(format!("{command}: Network error - {detail}"));
        }

        if stderr_lower.contains("authentication failed")
            || stderr_lower.contains("publickey")
            || stderr_lower.contains("access denied")
            || stderr_lower.contains("invalid credentials")
            || stderr_lower.contains("could not read username")
        {
            return Self::Authentication(format!("{command}: Authentication failed - {detail}"));
        }

        // "Permission denied" without "(publickey)" comes from the filesystem
        if stderr_lower.contains("permission denied")
            || stderr_lower.contains("unable to create")
            || stderr_lower.contains("read-only")
            || stderr_lower.contains("cannot open")
        {
            return Self::Permission(format!("{command}: Permission error - {detail}"));
        }

        if stderr_lower.contains("does not exist")
            || stderr_lower.contains("not found")
            || stderr_lower.contains("does not appear to be a git repository")
            || stderr_lower.contains("remote branch")
            || stderr_lower.contains("no such")
        {
            return Self::NotFound(format!("{command}: Not found - {detail}"));
        }

        if stderr_lower.contains("unknown revision")
            || stderr_lower.contains("bad revision")
            || stderr_lower.contains("ambiguous argument")
            || stderr_lower.contains("not a valid object name")
            || stderr_lower.contains("invalid ref")
        {
            return Self::InvalidRef(format!("{command}: Invalid reference - {detail}"));
        }

        Self::Unknown(format!("{command}: {detail}"))
    }

    /// Get a user-friendly error message with actionable guidance
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Check your internet connection\n\
                 - Verify the repository URL is correct\n\
                 - Check if a firewall or proxy is blocking the connection"
            ),
            Self::Authentication(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Verify your SSH key is configured (ssh-add -l)\n\
                 - Ensure your token/password hasn't expired\n\
                 - For HTTPS, you may need to set up a credential helper"
            ),
            Self::NotFound(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Verify the repository URL or path\n\
                 - Verify the branch exists (git ls-remote --heads <repository>)"
            ),
            Self::InvalidRef(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - The branch may have a single commit; build without --since-last-commit"
            ),
            Self::Permission(msg) => format!(
                "{msg}\n\nSuggestions:\n\
                 - Check file and directory permissions\n\
                 - Ensure the work directory is writable"
            ),
            Self::Unknown(msg) => format!(
                "{msg}\n\nThis is an unexpected error. Please check the message above for details."
            ),
        }
    }

    /// Check if this error type is transient and might succeed on retry
    #[must_use]
    pub const fn should_retry(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Get a short description of the error type
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Network(_) => "Network Error",
            Self::Authentication(_) => "Authentication Error",
            Self::NotFound(_) => "Not Found",
            Self::InvalidRef(_) => "Invalid Reference",
            Self::Permission(_) => "Permission Denied",
            Self::Unknown(_) => "Unknown Error",
        }
    }
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for GitError {}

/// First three non-empty stderr lines, joined
fn extract_meaningful_message(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(3)
        .collect();

    if lines.is_empty() {
        return "No error details available".to_string();
    }

    lines.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_detection() {
        let stderr = "fatal: unable to access 'https://github.com/a/b.git/': Could not resolve host: github.com";
        let error = GitError::from_stderr("git clone", stderr);
        assert!(matches!(error, GitError::Network(_)));
        assert!(error.should_retry());
    }

    #[test]
    fn test_auth_error_detection() {
        let stderr = "git@github.com: Permission denied (publickey).\nfatal: Could not read from remote repository.";
        let error = GitError::from_stderr("git clone", stderr);
        assert!(matches!(error, GitError::Authentication(_)));
        assert!(!error.should_retry());
    }

    #[test]
    fn test_missing_branch_detection() {
        let stderr = "warning: Could not find remote branch release to clone.\nfatal: Remote branch release not found in upstream origin";
        let error = GitError::from_stderr("git clone", stderr);
        assert!(matches!(error, GitError::NotFound(_)));
    }

    #[test]
    fn test_missing_repository_detection() {
        let stderr = "fatal: repository '/tmp/nope' does not exist";
        let error = GitError::from_stderr("git clone", stderr);
        assert!(matches!(error, GitError::NotFound(_)));
        assert_eq!(error.error_type(), "Not Found");
    }

    #[test]
    fn test_root_commit_parent_detection() {
        let stderr = "fatal: ambiguous argument 'HEAD~1': unknown revision or path not in the working tree.";
        let error = GitError::from_stderr("git diff", stderr);
        assert!(matches!(error, GitError::InvalidRef(_)));
    }

    #[test]
    fn test_empty_stderr() {
        let error = GitError::from_stderr("git ls-tree", "");
        assert!(matches!(error, GitError::Unknown(_)));
        assert!(error.to_string().contains("No error details available"));
    }
}
