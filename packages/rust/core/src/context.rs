//! Per-build context and path derivation.

use std::path::{Path, PathBuf};

use url::Url;

use markpress_git::GitRepo;
use markpress_shared::{GitProvider, MarkpressError, PathInfo, Result};

/// Process-wide configuration for one build invocation.
///
/// Constructed once at the start of a build command, immutable for the
/// run's duration, and passed by reference into every component. Never
/// persisted.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Output directory, cleared at the start of the build.
    pub build_dir: PathBuf,
    /// Project root: the repository root when one exists, else the source dir.
    pub project_root: PathBuf,
    /// Directory whose files are processed.
    pub source_dir: PathBuf,
    /// Repository handle, absent when the source tree is not under git.
    pub repo: Option<GitRepo>,
    /// Base URL for "view source" footer links.
    pub git_url_base: Option<Url>,
    /// Provider whose path templates shape the footer links.
    pub git_provider: GitProvider,
    /// Git reference named in footer links.
    pub git_ref: String,
    /// Path to the bundled gemoji conversion helper.
    pub gemoji_script: PathBuf,
}

impl BuildContext {
    /// Derive the path triple for one source file.
    ///
    /// `project_relative_path` is relative to the project root; the build
    /// destination mirrors the file's position relative to the source dir.
    pub fn source_path_info(&self, project_relative_path: &Path) -> Result<PathInfo> {
        let absolute_source_path = self.project_root.join(project_relative_path);
        let relative_source_path = absolute_source_path
            .strip_prefix(&self.source_dir)
            .map_err(|_| {
                MarkpressError::config(format!(
                    "source file {} is outside the source directory {}",
                    absolute_source_path.display(),
                    self.source_dir.display()
                ))
            })?;
        let absolute_build_path = self.build_dir.join(relative_source_path);

        Ok(PathInfo {
            project_relative_path: project_relative_path.to_path_buf(),
            absolute_source_path,
            absolute_build_path,
        })
    }
}
