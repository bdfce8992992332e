//! Shared types, error model, and configuration for markpress.
//!
//! This crate is the foundation depended on by all other markpress crates.
//! It provides:
//! - [`MarkpressError`] — the unified error type
//! - Domain types ([`PathInfo`], [`GitProvider`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, PublishConfig, ScriptsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{MarkpressError, Result};
pub use types::{GitProvider, PathInfo};
