//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves the workspace and its configuration
//! 2. Calls the library to build, merge or import fragments
//! 3. Formats and displays output
//!
//! Handlers return `anyhow::Result` and attach context to library errors.

mod add_md;
mod clean;
mod compile_mets;
mod compile_structmap;
mod completion;

// Re-export command functions for testing and direct invocation
pub use add_md::{add_md, AddMdArgs};
pub use clean::clean;
pub use compile_mets::{compile_mets, CompileMetsArgs};
pub use compile_structmap::compile_structmap;
pub use completion::completion;

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::cli::Context;
use crate::workspace::DirWorkspace;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::CompileStructmap {
            workspace,
            structmap_type,
            root_type,
            dmdsec_loc,
            stdout,
        } => compile_structmap::compile_structmap(
            ctx,
            workspace.as_deref(),
            structmap_type.as_deref(),
            root_type.as_deref(),
            dmdsec_loc.as_deref(),
            stdout,
        ),
        Command::CompileMets {
            profile,
            organization,
            contractid,
            workspace,
            base_path,
            objid,
            label,
            contentid,
            create_date,
            last_moddate,
            record_status,
            clean,
            copy_files,
            stdout,
            packaging_service,
        } => compile_mets::compile_mets(
            ctx,
            CompileMetsArgs {
                profile,
                organization,
                contractid,
                workspace,
                base_path,
                objid,
                label,
                contentid,
                create_date,
                last_moddate,
                record_status,
                clean,
                copy_files,
                stdout,
                packaging_service,
            },
        ),
        Command::AddMd {
            record,
            section,
            md_type,
            target_file,
            stream,
            directory,
            order,
            workspace,
        } => add_md::add_md(
            ctx,
            AddMdArgs {
                record,
                section,
                md_type,
                target_file,
                stream,
                directory,
                order,
                workspace,
            },
        ),
        Command::Clean { workspace } => clean::clean(ctx, workspace.as_deref()),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Open an existing workspace directory.
fn open_workspace(dir: &Path) -> Result<DirWorkspace> {
    DirWorkspace::open(dir).with_context(|| format!("Workspace '{}' not found", dir.display()))
}

/// Open a workspace directory, creating it if needed.
fn create_workspace(dir: &Path) -> Result<DirWorkspace> {
    DirWorkspace::create(dir)
        .with_context(|| format!("Failed to create workspace '{}'", dir.display()))
}
