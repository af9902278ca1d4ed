//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! sipweave has two configuration scopes:
//! - **Global**: User-level settings
//! - **Workspace**: Settings stored next to the fragments of one package
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Workspace config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$SIPWEAVE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/sipweave/config.toml`
//! 3. `~/.sipweave/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use sipweave::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("./workspace"))).unwrap();
//! println!("Record status: {}", config.record_status());
//! println!("Catalog: {}", config.catalog_version());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, WorkspaceConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::paths::CONFIG_FILE;
use crate::core::types::RecordStatus;

/// Default workspace directory, relative to the current directory.
pub const DEFAULT_WORKSPACE: &str = "./workspace";

/// Default fi:CATALOG and fi:SPECIFICATION version.
pub const DEFAULT_SCHEMA_VERSION: &str = "1.7.1";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence rules; workspace config overrides global
/// config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Workspace configuration (if present)
    pub workspace: Option<WorkspaceConfig>,
    global_path: Option<PathBuf>,
    workspace_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `workspace` is provided, also loads `<workspace>/sipweave.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or
    /// hold invalid values. Missing files are not an error.
    pub fn load(workspace: Option<&Path>) -> Result<Config, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), workspace)
    }

    /// Load configuration from an explicit global config file.
    pub fn load_from(
        global_path: Option<&Path>,
        workspace: Option<&Path>,
    ) -> Result<Config, ConfigError> {
        let global: GlobalConfig = match global_path {
            Some(path) => read_config(path)?,
            None => GlobalConfig::default(),
        };
        global.validate()?;

        let workspace_path = workspace
            .map(|dir| dir.join(CONFIG_FILE))
            .filter(|path| path.exists());
        let workspace_config = match &workspace_path {
            Some(path) => {
                let config: WorkspaceConfig = read_config(path)?;
                config.validate()?;
                Some(config)
            }
            None => None,
        };

        Ok(Config {
            global,
            workspace: workspace_config,
            global_path: global_path.map(Path::to_path_buf),
            workspace_path,
        })
    }

    /// Locate the global config file, if any.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $SIPWEAVE_CONFIG
        if let Ok(path) = std::env::var("SIPWEAVE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/sipweave/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("sipweave/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.sipweave/config.toml
        dirs::home_dir()
            .map(|home| home.join(".sipweave/config.toml"))
            .filter(|path| path.exists())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn pick<'a>(
        &'a self,
        workspace: impl Fn(&'a WorkspaceConfig) -> Option<&'a String>,
        global: impl Fn(&'a GlobalConfig) -> Option<&'a String>,
    ) -> Option<&'a str> {
        self.workspace
            .as_ref()
            .and_then(workspace)
            .or_else(|| global(&self.global))
            .map(String::as_str)
    }

    /// Get the workspace directory.
    ///
    /// Defaults to `./workspace` if not configured.
    pub fn workspace_dir(&self) -> PathBuf {
        PathBuf::from(
            self.global
                .workspace
                .as_deref()
                .unwrap_or(DEFAULT_WORKSPACE),
        )
    }

    /// Get the record status.
    ///
    /// Defaults to `submission` if not configured.
    pub fn record_status(&self) -> RecordStatus {
        self.pick(|w| w.record_status.as_ref(), |g| g.record_status.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get the packaging service name, if any.
    pub fn packaging_service(&self) -> Option<&str> {
        self.pick(
            |w| w.packaging_service.as_ref(),
            |g| g.packaging_service.as_ref(),
        )
    }

    /// Get the fi:CATALOG version.
    pub fn catalog_version(&self) -> &str {
        self.pick(|w| w.catalog_version.as_ref(), |g| g.catalog_version.as_ref())
            .unwrap_or(DEFAULT_SCHEMA_VERSION)
    }

    /// Get the fi:SPECIFICATION version.
    pub fn specification_version(&self) -> &str {
        self.pick(
            |w| w.specification_version.as_ref(),
            |g| g.specification_version.as_ref(),
        )
        .unwrap_or(DEFAULT_SCHEMA_VERSION)
    }

    /// Get the default structmap TYPE, if configured.
    pub fn structmap_type(&self) -> Option<&str> {
        self.pick(|w| w.structmap_type.as_ref(), |g| g.structmap_type.as_ref())
    }

    /// Get the default root div TYPE, if configured.
    pub fn root_type(&self) -> Option<&str> {
        self.pick(|w| w.root_type.as_ref(), |g| g.root_type.as_ref())
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded workspace config file.
    pub fn workspace_config_loaded_from(&self) -> Option<&Path> {
        self.workspace_path.as_deref()
    }
}

/// Read and parse a config file.
fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_empty_defaults() {
        let config = Config::load_from(None, None).unwrap();

        assert_eq!(config.workspace_dir(), PathBuf::from("./workspace"));
        assert_eq!(config.record_status(), RecordStatus::Submission);
        assert_eq!(config.catalog_version(), "1.7.1");
        assert_eq!(config.specification_version(), "1.7.1");
        assert!(config.packaging_service().is_none());
        assert!(config.structmap_type().is_none());
        assert!(config.global_config_loaded_from().is_none());
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
            workspace = "/srv/sip"
            packaging_service = "Packager"
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(&config_path), None).unwrap();
        assert_eq!(config.workspace_dir(), PathBuf::from("/srv/sip"));
        assert_eq!(config.packaging_service(), Some("Packager"));
        assert_eq!(config.global_config_loaded_from(), Some(config_path.as_path()));
    }

    #[test]
    fn load_workspace_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("sipweave.toml"),
            r#"
            record_status = "dissemination"
            structmap_type = "EAD3-logical"
            "#,
        )
        .unwrap();

        let config = Config::load_from(None, Some(temp.path())).unwrap();
        assert_eq!(config.record_status(), RecordStatus::Dissemination);
        assert_eq!(config.structmap_type(), Some("EAD3-logical"));
        assert!(config.workspace_config_loaded_from().is_some());
    }

    #[test]
    fn missing_workspace_config_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(None, Some(temp.path())).unwrap();
        assert!(config.workspace.is_none());
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("sipweave.toml"), "record_status = \"draft\"").unwrap();
        let result = Config::load_from(None, Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("sipweave.toml"),
            r#"
            record_status = "update"
            unknown_field = true
            "#,
        )
        .unwrap();
        let result = Config::load_from(None, Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn precedence_workspace_overrides_global() {
        let config = Config {
            global: GlobalConfig {
                catalog_version: Some("1.6.0".to_string()),
                specification_version: Some("1.6.0".to_string()),
                ..Default::default()
            },
            workspace: Some(WorkspaceConfig {
                catalog_version: Some("1.7.0".to_string()),
                ..Default::default()
            }),
            global_path: None,
            workspace_path: None,
        };

        assert_eq!(config.catalog_version(), "1.7.0");
        assert_eq!(config.specification_version(), "1.6.0");
    }
}
