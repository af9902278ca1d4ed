//! workspace::traits
//!
//! Workspace storage trait definition.
//!
//! # Design
//!
//! A workspace is a flat namespace of named entries (fragments, reference
//! tables, property records). Stages hand data to each other only through
//! it, one stage at a time; implementations perform no locking.
//!
//! # Example
//!
//! ```
//! use sipweave::workspace::{MemoryWorkspace, WorkspaceStore};
//!
//! let ws = MemoryWorkspace::new();
//! ws.write("structmap.xml", "<x/>").unwrap();
//! assert_eq!(ws.read("structmap.xml").unwrap().as_deref(), Some("<x/>"));
//! assert_eq!(ws.list_matching(&["map.xml"]).unwrap(), vec!["structmap.xml"]);
//! ```

use thiserror::Error;

/// Errors from workspace storage operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Entry names must be a single, non-special path component.
    #[error("invalid workspace entry name: '{0}'")]
    InvalidName(String),

    /// The workspace itself does not exist.
    #[error("workspace not found: {0}")]
    NotFound(String),

    /// Underlying I/O failure, propagated as-is.
    #[error("workspace I/O error on '{name}': {source}")]
    Io {
        name: String,
        source: std::io::Error,
    },
}

/// Trait for workspace storage backends.
pub trait WorkspaceStore {
    /// Read an entry.
    ///
    /// Returns `Ok(None)` if the entry does not exist.
    fn read(&self, name: &str) -> Result<Option<String>, WorkspaceError>;

    /// Write an entry, replacing any existing content.
    fn write(&self, name: &str, contents: &str) -> Result<(), WorkspaceError>;

    /// Remove an entry.
    ///
    /// Returns `Ok(())` even if the entry did not exist.
    fn remove(&self, name: &str) -> Result<(), WorkspaceError>;

    /// All entry names, sorted.
    fn list(&self) -> Result<Vec<String>, WorkspaceError>;

    /// Check if an entry exists.
    ///
    /// Default implementation uses `read()` and checks for `Some`.
    fn exists(&self, name: &str) -> Result<bool, WorkspaceError> {
        Ok(self.read(name)?.is_some())
    }

    /// Sorted entry names ending with any of `suffixes`.
    fn list_matching(&self, suffixes: &[&str]) -> Result<Vec<String>, WorkspaceError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|name| suffixes.iter().any(|suffix| name.ends_with(suffix)))
            .collect())
    }
}

/// Validate an entry name.
pub fn validate_name(name: &str) -> Result<(), WorkspaceError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(WorkspaceError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation() {
        assert!(validate_name("dmdsec.xml").is_ok());
        assert!(validate_name("a%2Fb-dmdsec.xml").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b.xml").is_err());
        assert!(validate_name("a\\b.xml").is_err());
    }

    #[test]
    fn error_display_formatting() {
        let err = WorkspaceError::InvalidName("a/b".into());
        assert!(err.to_string().contains("a/b"));

        let err = WorkspaceError::Io {
            name: "x.xml".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(err.to_string().contains("x.xml"));
        assert!(err.to_string().contains("disk full"));
    }
}
