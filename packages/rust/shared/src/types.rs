//! Core domain types for markpress builds.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GitProvider
// ---------------------------------------------------------------------------

/// Git hosting provider used when rendering "view source" footer links.
///
/// Only GitHub is defined today; adding a provider means adding a variant
/// and its path templates, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProvider {
    Github,
}

impl GitProvider {
    /// Stable identifier, as accepted on the CLI and in config.
    pub fn name(self) -> &'static str {
        match self {
            Self::Github => "github",
        }
    }
}

impl std::fmt::Display for GitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for GitProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Self::Github),
            other => Err(format!("unknown git provider '{other}': expected 'github'")),
        }
    }
}

// ---------------------------------------------------------------------------
// PathInfo
// ---------------------------------------------------------------------------

/// The three views of one source file's location, derived once before
/// processing begins and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo {
    /// Path relative to the project root (the repo root when one exists).
    pub project_relative_path: PathBuf,
    /// Absolute path of the file in the source tree.
    pub absolute_source_path: PathBuf,
    /// Absolute destination path in the build tree.
    pub absolute_build_path: PathBuf,
}

impl PathInfo {
    /// Project-relative path with forward-slash separators, the form used
    /// in git tree lookups and footer URLs.
    pub fn relative_slash_path(&self) -> String {
        self.project_relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn provider_roundtrip() {
        let p: GitProvider = "github".parse().expect("parse provider");
        assert_eq!(p, GitProvider::Github);
        assert_eq!(p.to_string(), "github");

        let p: GitProvider = "GitHub".parse().expect("case-insensitive parse");
        assert_eq!(p, GitProvider::Github);
    }

    #[test]
    fn provider_unknown_rejected() {
        let err = "sourcehut".parse::<GitProvider>().unwrap_err();
        assert!(err.contains("sourcehut"));
    }

    #[test]
    fn relative_slash_path_joins_components() {
        let info = PathInfo {
            project_relative_path: Path::new("docs").join("guide").join("intro.md"),
            absolute_source_path: PathBuf::from("/project/docs/guide/intro.md"),
            absolute_build_path: PathBuf::from("/project/build/guide/intro.md"),
        };
        assert_eq!(info.relative_slash_path(), "docs/guide/intro.md");
    }
}
