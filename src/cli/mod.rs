//! cli
//!
//! Command-line interface layer for sipweave.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve the workspace and its configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! handlers that call into [`crate::structmap`], [`crate::compile`] and
//! [`crate::mets`]. Handlers never touch workspace files directly.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::ui::output::Verbosity;

/// Execution context shared by all command handlers.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Directory relative paths are resolved against
    pub cwd: Option<PathBuf>,
    /// Debug output enabled
    pub debug: bool,
    /// Minimal output
    pub quiet: bool,
}

impl Context {
    /// Output verbosity derived from the global flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Resolve `path` against `--cwd`, if given.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.cwd {
            Some(cwd) if path.is_relative() => cwd.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Determine the workspace directory and load its configuration.
    ///
    /// The `--workspace` flag wins over the configured workspace, which
    /// wins over the default.
    pub fn load_workspace(&self, flag: Option<&Path>) -> Result<(PathBuf, Config)> {
        let dir = match flag {
            Some(dir) => dir.to_path_buf(),
            None => Config::load(None)
                .context("Failed to load global configuration")?
                .workspace_dir(),
        };
        let dir = self.resolve(&dir);
        let config = Config::load(Some(&dir))
            .with_context(|| format!("Failed to load configuration for '{}'", dir.display()))?;
        if let Some(path) = config.workspace_config_loaded_from() {
            tracing::debug!(path = %path.display(), "loaded workspace config");
        }
        Ok((dir, config))
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
