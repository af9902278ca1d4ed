//! structmap::properties
//!
//! Per-file property records written by earlier stages.
//!
//! Stored as `<encoded path>-properties.json`:
//!
//! ```json
//! {"order": 3}
//! ```

use serde::{Deserialize, Serialize};

use super::StructmapError;
use crate::core::paths::WorkspacePaths;
use crate::core::types::ObjectPath;
use crate::workspace::WorkspaceStore;

/// Properties of one packaged file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProperties {
    /// Explicit position among sibling files in the structural map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

/// Read the property record of `path`, if one exists.
pub fn read(
    ws: &dyn WorkspaceStore,
    path: &ObjectPath,
) -> Result<Option<FileProperties>, StructmapError> {
    let name = WorkspacePaths::properties_name(path);
    let Some(contents) = ws.read(&name)? else {
        return Ok(None);
    };
    let properties = serde_json::from_str(&contents)
        .map_err(|source| StructmapError::Properties { name, source })?;
    Ok(Some(properties))
}

/// Store the property record of `path`, replacing any previous one.
pub fn write(
    ws: &dyn WorkspaceStore,
    path: &ObjectPath,
    properties: &FileProperties,
) -> Result<(), StructmapError> {
    let name = WorkspacePaths::properties_name(path);
    let contents = serde_json::to_string(properties)
        .map_err(|source| StructmapError::Properties {
            name: name.clone(),
            source,
        })?;
    ws.write(&name, &contents)?;
    Ok(())
}
