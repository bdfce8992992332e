//! End-to-end `build` pipeline: resolve chains → walk → process → write.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument};
use url::Url;

use markpress_git::GitRepo;
use markpress_shared::{GitProvider, MarkpressError, Result};

use crate::chain::{self, ChainTable};
use crate::context::BuildContext;
use crate::engine;
use crate::spec::{DEFAULT_STACK, ProcessorSpec};
use crate::walker;

/// Configuration for one `build` invocation.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory whose files are processed.
    pub source_dir: PathBuf,
    /// Output directory, cleared at the start of every build.
    pub build_dir: PathBuf,
    /// Base URL for "view source" footer links.
    pub git_url_base: Option<Url>,
    /// Git hosting provider for footer link templates.
    pub git_provider: GitProvider,
    /// Git reference named in footer links.
    pub git_ref: String,
    /// Raw processor specifications; empty means the builtin default stack.
    pub processors: Vec<String>,
    /// Path to the bundled gemoji conversion helper.
    pub gemoji_script: PathBuf,
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildResult {
    /// The populated build directory.
    pub build_dir: PathBuf,
    /// Project root the build ran against.
    pub project_root: PathBuf,
    /// Number of files written.
    pub files_processed: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each file starts processing.
    fn file_processed(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_processed(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full `build` pipeline.
///
/// 1. Discover the repository and construct the build context
/// 2. Parse processor specs and resolve chains (fatal before any file)
/// 3. Clear the build directory
/// 4. Walk the source tree and process files sequentially
///
/// One file is fully processed before the next begins; a failure aborts
/// the build immediately, leaving whatever was already written.
#[instrument(skip_all, fields(source = %config.source_dir.display(), build = %config.build_dir.display()))]
pub fn build(config: &BuildConfig, progress: &dyn ProgressReporter) -> Result<BuildResult> {
    let start = Instant::now();

    // --- Phase 1: build context ---
    progress.phase("Preparing build context");
    let source_dir = config
        .source_dir
        .canonicalize()
        .map_err(|e| MarkpressError::io(&config.source_dir, e))?;

    let repo = GitRepo::discover(&source_dir);
    let project_root = repo
        .as_ref()
        .map(|r| r.root().to_path_buf())
        .unwrap_or_else(|| source_dir.clone());

    let ctx = BuildContext {
        build_dir: config.build_dir.clone(),
        project_root,
        source_dir,
        repo,
        git_url_base: config.git_url_base.clone(),
        git_provider: config.git_provider,
        git_ref: config.git_ref.clone(),
        gemoji_script: config.gemoji_script.clone(),
    };

    info!(
        project_root = %ctx.project_root.display(),
        repo = ctx.repo.is_some(),
        "build context ready"
    );

    // --- Phase 2: processor chains ---
    // Spec errors abort here, before any file has been touched.
    progress.phase("Resolving processor chains");
    let chains = resolve_chains(&config.processors)?;

    // --- Phase 3: fresh build directory ---
    progress.phase("Clearing build directory");
    match std::fs::remove_dir_all(&ctx.build_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(MarkpressError::io(&ctx.build_dir, e)),
    }

    // --- Phase 4: process files ---
    progress.phase("Processing files");
    let files = walker::list_source_files(&ctx.source_dir, &ctx.project_root)?;
    let total = files.len();

    for (i, project_relative_path) in files.iter().enumerate() {
        let path_info = ctx.source_path_info(project_relative_path)?;
        let ext = extension_of(project_relative_path);
        let steps = chains.chain_for(&ext);

        debug!(
            file = %project_relative_path.display(),
            ext,
            steps = steps.len(),
            "processing"
        );
        progress.file_processed(&path_info.relative_slash_path(), i + 1, total);

        let output = engine::process_file(&path_info, &ctx, steps)?;

        if let Some(parent) = path_info.absolute_build_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MarkpressError::io(parent, e))?;
        }
        std::fs::write(&path_info.absolute_build_path, output)
            .map_err(|e| MarkpressError::io(&path_info.absolute_build_path, e))?;
    }

    let result = BuildResult {
        build_dir: ctx.build_dir.clone(),
        project_root: ctx.project_root.clone(),
        files_processed: total,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        files = result.files_processed,
        elapsed_ms = result.elapsed.as_millis(),
        "build complete"
    );

    Ok(result)
}

/// Parse the raw specifications (or the default stack) and resolve the
/// per-extension chain table.
fn resolve_chains(raw_specs: &[String]) -> Result<ChainTable> {
    let mut specs = Vec::new();

    if raw_specs.is_empty() {
        for raw in DEFAULT_STACK {
            specs.push(ProcessorSpec::parse(raw)?);
        }
    } else {
        for raw in raw_specs {
            specs.push(ProcessorSpec::parse(raw)?);
        }
    }

    Ok(chain::resolve(&specs))
}

/// Chain-lookup key for a file: the part after the last dot, or empty
/// for extensionless files.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
