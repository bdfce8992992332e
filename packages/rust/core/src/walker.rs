//! Source tree walking.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use markpress_shared::{MarkpressError, Result};

/// List every file under `source_dir` as a path relative to
/// `project_root`, in deterministic name-sorted order.
///
/// `source_dir` must live at or below `project_root`; both are expected
/// to be absolute.
pub fn list_source_files(source_dir: &Path, project_root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source_dir.to_path_buf());
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            MarkpressError::io(path, io)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(project_root).map_err(|_| {
            MarkpressError::config(format!(
                "source file {} is outside the project root {}",
                entry.path().display(),
                project_root.display()
            ))
        })?;
        files.push(relative.to_path_buf());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, "x").expect("write");
    }

    #[test]
    fn lists_nested_files_relative_to_project_root() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().canonicalize().expect("canonicalize");
        touch(&root.join("README.md"));
        touch(&root.join("docs/guide/intro.md"));
        touch(&root.join("docs/logo.png"));

        let files = list_source_files(&root, &root).expect("walk");

        assert_eq!(
            files,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("docs/guide/intro.md"),
                PathBuf::from("docs/logo.png"),
            ]
        );
    }

    #[test]
    fn source_below_project_root_keeps_prefix() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().canonicalize().expect("canonicalize");
        let source = root.join("site");
        touch(&source.join("index.md"));
        touch(&root.join("outside.md"));

        let files = list_source_files(&source, &root).expect("walk");

        // Only files under the source dir, but named relative to the root.
        assert_eq!(files, vec![PathBuf::from("site/index.md")]);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().canonicalize().expect("canonicalize");
        let files = list_source_files(&root, &root).expect("walk");
        assert!(files.is_empty());
    }
}
