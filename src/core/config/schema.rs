//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$SIPWEAVE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/sipweave/config.toml`
//! 3. `~/.sipweave/config.toml` (canonical write location)
//!
//! # Workspace Config
//!
//! Located at `<workspace>/sipweave.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., record status must be a known status).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{RecordStatus, StructmapType};

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// workspace = "/var/spool/sip"
/// record_status = "submission"
/// packaging_service = "Packaging Service"
/// catalog_version = "1.7.1"
/// specification_version = "1.7.1"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default workspace directory
    pub workspace: Option<String>,

    /// Default record status of compiled documents
    pub record_status: Option<String>,

    /// Name of the packaging service software agent
    pub packaging_service: Option<String>,

    /// fi:CATALOG version
    pub catalog_version: Option<String>,

    /// fi:SPECIFICATION version
    pub specification_version: Option<String>,

    /// Default structmap TYPE
    pub structmap_type: Option<String>,

    /// Default root div TYPE
    pub root_type: Option<String>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_common(
            self.record_status.as_deref(),
            self.structmap_type.as_deref(),
        )?;
        if let Some(workspace) = &self.workspace {
            if workspace.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "workspace cannot be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Workspace configuration.
///
/// # Example
///
/// ```toml
/// record_status = "update"
/// structmap_type = "Directory-physical"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub record_status: Option<String>,
    pub packaging_service: Option<String>,
    pub catalog_version: Option<String>,
    pub specification_version: Option<String>,
    pub structmap_type: Option<String>,
    pub root_type: Option<String>,
}

impl WorkspaceConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_common(
            self.record_status.as_deref(),
            self.structmap_type.as_deref(),
        )
    }
}

fn validate_common(
    record_status: Option<&str>,
    structmap_type: Option<&str>,
) -> Result<(), ConfigError> {
    if let Some(status) = record_status {
        status
            .parse::<RecordStatus>()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
    }
    if let Some(kind) = structmap_type {
        StructmapType::new(kind).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
    }
    Ok(())
}
