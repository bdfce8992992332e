//! markpress CLI — content build pipeline for Markdown trees.
//!
//! Runs source files through per-extension processor chains into a build
//! directory, then hands the result to an external publishing tool.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
