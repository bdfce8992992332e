//! Git metadata lookup for markpress.
//!
//! Shells out to the system `git` binary rather than embedding a git
//! library, so authentication, user configuration, and platform quirks
//! remain git's problem. The repository handle is opened once per build
//! and is read-only; no write operations are ever issued.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use tracing::debug;

use markpress_shared::{MarkpressError, Result};

// ---------------------------------------------------------------------------
// GitFileInfo
// ---------------------------------------------------------------------------

/// Metadata extracted from the most recent commit whose tree contains a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitFileInfo {
    /// 7-character short commit hash.
    pub commit_short: String,
    /// Commit timestamp, normalized to UTC.
    pub committed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// GitRepo
// ---------------------------------------------------------------------------

/// Read-only handle to a local repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Open the repository rooted at `root`.
    ///
    /// `root` must contain a `.git` directory; use [`GitRepo::discover`]
    /// to locate one from an arbitrary starting directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(".git").is_dir() {
            return Err(MarkpressError::git(format!(
                "{} is not a git repository root",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Walk up from `start_dir` looking for a directory containing `.git`.
    ///
    /// Returns `None` when the filesystem root is reached without a match.
    pub fn discover(start_dir: &Path) -> Option<Self> {
        let start = start_dir.canonicalize().ok()?;
        let mut current = start.as_path();
        loop {
            if current.join(".git").is_dir() {
                return Some(Self {
                    root: current.to_path_buf(),
                });
            }
            current = current.parent()?;
        }
    }

    /// The repository root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the most recent commit (starting at `HEAD`, time-descending)
    /// whose tree contains `relative_path`, given with forward slashes
    /// relative to the repository root.
    ///
    /// Returns `Ok(None)` when no commit contains the path, when the
    /// repository has no commits yet, or when `HEAD` cannot be resolved.
    /// This is deliberately "most recent commit the file exists in", not
    /// "commit that last modified the file": a file untouched for many
    /// commits still matches at `HEAD`.
    pub fn find_file_info(&self, relative_path: &str) -> Result<Option<GitFileInfo>> {
        let output = self.run_git(&["rev-list", "--date-order", "--format=%ct", "HEAD"])?;

        if !output.status.success() {
            // No commits yet, unborn HEAD, or not actually a repository:
            // all degrade to "no metadata" rather than failing the build.
            debug!(
                root = %self.root.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "rev-list failed, treating as no history"
            );
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for (commit, timestamp) in parse_rev_list(&stdout) {
            if self.tree_contains(commit, relative_path)? {
                let committed_at = DateTime::<Utc>::from_timestamp(timestamp, 0)
                    .ok_or_else(|| {
                        MarkpressError::git(format!(
                            "commit {commit} has out-of-range timestamp {timestamp}"
                        ))
                    })?;
                return Ok(Some(GitFileInfo {
                    commit_short: commit.chars().take(7).collect(),
                    committed_at,
                }));
            }
        }

        Ok(None)
    }

    /// Whether `commit`'s tree has an entry at `relative_path`.
    fn tree_contains(&self, commit: &str, relative_path: &str) -> Result<bool> {
        let spec = format!("{commit}:{relative_path}");
        let output = self.run_git(&["cat-file", "-e", &spec])?;
        Ok(output.status.success())
    }

    /// Run a git subcommand in the repository root and capture its output.
    ///
    /// A non-zero exit is not an error here; callers inspect the status.
    /// Only a failure to launch git at all is fatal.
    fn run_git(&self, args: &[&str]) -> Result<std::process::Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| {
                MarkpressError::git(format!(
                    "failed to run git {}: {e}. Is git installed?",
                    args.first().copied().unwrap_or_default()
                ))
            })
    }
}

/// Parse `git rev-list --format=%ct` output into `(hash, timestamp)` pairs.
///
/// The output alternates `commit <hash>` header lines with the formatted
/// timestamp lines.
fn parse_rev_list(stdout: &str) -> Vec<(&str, i64)> {
    let mut pairs = Vec::new();
    let mut current: Option<&str> = None;

    for line in stdout.lines() {
        if let Some(hash) = line.strip_prefix("commit ") {
            current = Some(hash.trim());
        } else if let (Some(hash), Ok(ts)) = (current.take(), line.trim().parse::<i64>()) {
            pairs.push((hash, ts));
        }
    }

    pairs
}
