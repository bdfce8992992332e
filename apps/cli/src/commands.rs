//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use markpress_core::pipeline::{self, BuildConfig, BuildResult, ProgressReporter};
use markpress_shared::{AppConfig, GitProvider, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// markpress — build Markdown trees through processor chains.
#[derive(Parser)]
#[command(
    name = "markpress",
    version,
    about = "Run a source tree through per-extension processor chains into a build directory.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Process a source tree into a fresh build directory.
    Build {
        /// Directory containing the source files.
        source_dir: PathBuf,

        /// Output directory (cleared on every build).
        build_dir: PathBuf,

        /// Base URL for "view source" footer links.
        #[arg(long)]
        git_url_base: Option<String>,

        /// Git hosting provider for footer link templates.
        #[arg(long)]
        git_provider: Option<String>,

        /// Git reference named in footer links.
        #[arg(long)]
        git_ref: Option<String>,

        /// Processor specification: '<path>', 'builtin:<name>',
        /// '<ext>:<path>', '<ext>:<other-ext>', or '<ext>:builtin:<name>'.
        /// Repeatable; order is execution order.
        #[arg(short = 'p', long = "processor")]
        processors: Vec<String>,
    },

    /// Upload a build directory with the external publishing tool.
    Publish {
        /// Build directory to upload.
        build_dir: PathBuf,

        /// Target page identifier.
        #[arg(short, long, env = "NOTION_PAGE_ID")]
        page_id: String,

        /// API token for the publishing tool.
        #[arg(short, long, env = "NOTION_TOKEN", hide_env_values = true)]
        token: String,

        /// Publisher command (defaults from config).
        #[arg(long)]
        publisher: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "markpress=info",
        1 => "markpress=debug",
        _ => "markpress=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            source_dir,
            build_dir,
            git_url_base,
            git_provider,
            git_ref,
            processors,
        } => cmd_build(
            source_dir,
            build_dir,
            git_url_base.as_deref(),
            git_provider.as_deref(),
            git_ref,
            processors,
        ),
        Command::Publish {
            build_dir,
            page_id,
            token,
            publisher,
        } => cmd_publish(&build_dir, &page_id, &token, publisher),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

fn cmd_build(
    source_dir: PathBuf,
    build_dir: PathBuf,
    git_url_base: Option<&str>,
    git_provider: Option<&str>,
    git_ref: Option<String>,
    processors: Vec<String>,
) -> Result<()> {
    let config = load_config()?;

    // CLI flags override config values, which override defaults.
    let provider: GitProvider = match git_provider {
        Some(name) => name.parse().map_err(|e: String| eyre!(e))?,
        None => config.defaults.git_provider,
    };

    let git_ref = git_ref.unwrap_or_else(|| config.defaults.git_ref.clone());

    let processors = if processors.is_empty() {
        config.defaults.processors.clone()
    } else {
        processors
    };

    let git_url_base = git_url_base
        .map(|raw| Url::parse(raw).map_err(|e| eyre!("invalid --git-url-base '{raw}': {e}")))
        .transpose()?;

    let build_config = BuildConfig {
        source_dir,
        build_dir,
        git_url_base,
        git_provider: provider,
        git_ref,
        processors,
        gemoji_script: PathBuf::from(&config.scripts.gemoji),
    };

    info!(
        source = %build_config.source_dir.display(),
        build = %build_config.build_dir.display(),
        provider = %build_config.git_provider,
        "starting build"
    );

    let reporter = CliProgress::new();
    let result = pipeline::build(&build_config, &reporter)?;

    println!();
    println!("  Build complete!");
    println!("  Project root: {}", result.project_root.display());
    println!("  Files:        {}", result.files_processed);
    println!("  Output:       {}", result.build_dir.display());
    println!("  Time:         {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// publish
// ---------------------------------------------------------------------------

fn cmd_publish(
    build_dir: &std::path::Path,
    page_id: &str,
    token: &str,
    publisher: Option<String>,
) -> Result<()> {
    let config = load_config()?;
    let publisher = publisher.unwrap_or_else(|| config.publish.publisher.clone());

    if !build_dir.is_dir() {
        return Err(eyre!(
            "build directory '{}' does not exist — run `markpress build` first",
            build_dir.display()
        ));
    }

    info!(
        publisher,
        build_dir = %build_dir.display(),
        "publishing build directory"
    );

    let status = std::process::Command::new(&publisher)
        .arg("--timeout")
        .arg(config.publish.timeout_ms.to_string())
        .arg(build_dir)
        .arg("-t")
        .arg(token)
        .arg("-p")
        .arg(page_id)
        .arg("-d")
        .stdin(std::process::Stdio::inherit())
        .stdout(std::process::Stdio::inherit())
        .stderr(std::process::Stdio::inherit())
        .status()
        .map_err(|e| eyre!("failed to spawn '{publisher}': {e}"))?;

    if !status.success() {
        return Err(eyre!(
            "publisher exited with status: {}",
            status.code().unwrap_or(-1)
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn file_processed(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Processing [{current}/{total}] {path}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
