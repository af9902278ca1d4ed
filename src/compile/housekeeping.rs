//! compile::housekeeping
//!
//! Side effects around compilation: copying objects into the workspace
//! and removing intermediate files afterwards.

use std::fs;
use std::path::Path;

use super::CompileError;
use crate::core::paths::WorkspacePaths;
use crate::core::types::ObjectPath;
use crate::workspace::WorkspaceStore;

/// Remove every fragment, reference table and property record.
///
/// Only top-level entries are considered; copied objects and the
/// compiled document stay. Returns the removed names.
pub fn clean_workspace(ws: &dyn WorkspaceStore) -> Result<Vec<String>, CompileError> {
    let mut removed = Vec::new();
    for name in ws.list()? {
        if WorkspacePaths::is_work_file(&name) {
            ws.remove(&name)?;
            tracing::debug!(entry = %name, "removed intermediate file");
            removed.push(name);
        }
    }
    Ok(removed)
}

/// Copy `objects` from `base` into the workspace directory tree.
///
/// Each object `p` is copied from `<base>/<p>` to `<workspace>/<p>`,
/// creating parent directories. Returns the number of files copied.
///
/// # Errors
///
/// Returns `CompileError::MissingObject` if a source file does not exist.
pub fn copy_objects(
    base: &Path,
    workspace: &WorkspacePaths,
    objects: &[ObjectPath],
) -> Result<usize, CompileError> {
    let source_paths = WorkspacePaths::new(base.to_path_buf());
    for object in objects {
        let from = source_paths.object_path(object);
        let to = workspace.object_path(object);
        if !from.is_file() {
            return Err(CompileError::MissingObject {
                path: from.display().to_string(),
            });
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|source| CompileError::Copy {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::copy(&from, &to).map_err(|source| CompileError::Copy {
            path: to.display().to_string(),
            source,
        })?;
        tracing::debug!(from = %from.display(), to = %to.display(), "copied object");
    }
    Ok(objects.len())
}
