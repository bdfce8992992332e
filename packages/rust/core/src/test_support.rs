//! Helpers shared by this crate's test modules.

use std::path::{Path, PathBuf};

use markpress_shared::GitProvider;

use crate::context::BuildContext;

/// A build context rooted at `root`: no repository, no base URL, build
/// output under `root/build`.
pub(crate) fn bare_context(root: &Path) -> BuildContext {
    BuildContext {
        build_dir: root.join("build"),
        project_root: root.to_path_buf(),
        source_dir: root.to_path_buf(),
        repo: None,
        git_url_base: None,
        git_provider: GitProvider::Github,
        git_ref: "HEAD".into(),
        gemoji_script: PathBuf::from("scripts/convert-gemoji-to-unicode.mjs"),
    }
}

/// Write an executable shell script into `dir` and return its path.
#[cfg(unix)]
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}
