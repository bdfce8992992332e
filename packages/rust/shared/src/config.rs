//! Application configuration for markpress.
//!
//! User config lives at `~/.markpress/markpress.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MarkpressError, Result};
use crate::types::GitProvider;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "markpress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".markpress";

// ---------------------------------------------------------------------------
// Config structs (matching markpress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Build defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Publish settings.
    #[serde(default)]
    pub publish: PublishConfig,

    /// Bundled helper script locations.
    #[serde(default)]
    pub scripts: ScriptsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Git hosting provider for footer links.
    #[serde(default = "default_git_provider")]
    pub git_provider: GitProvider,

    /// Git reference used in "view source" links.
    #[serde(default = "default_git_ref")]
    pub git_ref: String,

    /// Processor specifications applied when none are given on the CLI.
    /// An empty list falls back to the builtin default stack.
    #[serde(default)]
    pub processors: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            git_provider: default_git_provider(),
            git_ref: default_git_ref(),
            processors: Vec::new(),
        }
    }
}

fn default_git_provider() -> GitProvider {
    GitProvider::Github
}
fn default_git_ref() -> String {
    "HEAD".into()
}

/// `[publish]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Command that uploads a build tree to the publishing target.
    #[serde(default = "default_publisher")]
    pub publisher: String,

    /// Per-request timeout handed to the publisher, in milliseconds.
    #[serde(default = "default_publish_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            publisher: default_publisher(),
            timeout_ms: default_publish_timeout_ms(),
        }
    }
}

fn default_publisher() -> String {
    "node_modules/.bin/md-to-notion".into()
}
fn default_publish_timeout_ms() -> u64 {
    30_000
}

/// `[scripts]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptsConfig {
    /// Path to the gemoji conversion helper, resolved against the
    /// working directory when relative.
    #[serde(default = "default_gemoji_script")]
    pub gemoji: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            gemoji: default_gemoji_script(),
        }
    }
}

fn default_gemoji_script() -> String {
    "scripts/convert-gemoji-to-unicode.mjs".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.markpress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MarkpressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.markpress/markpress.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MarkpressError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        MarkpressError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MarkpressError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MarkpressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MarkpressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
