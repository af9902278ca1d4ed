//! clean command - Remove intermediate files from a workspace

use std::path::Path;

use anyhow::Result;

use super::open_workspace;
use crate::cli::Context;
use crate::compile::housekeeping;
use crate::ui::output;

/// Remove fragments, reference tables and property files.
pub fn clean(ctx: &Context, workspace: Option<&Path>) -> Result<()> {
    let verbosity = ctx.verbosity();
    let (dir, _config) = ctx.load_workspace(workspace)?;
    let ws = open_workspace(&dir)?;

    let removed = housekeeping::clean_workspace(&ws)?;
    if removed.is_empty() {
        verbosity.status("Nothing to clean");
    } else {
        verbosity.status(format!("Removed {} files from {}", removed.len(), dir.display()));
        verbosity.detail(output::format_list(&removed, "  - "));
    }
    Ok(())
}
