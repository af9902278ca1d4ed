//! workspace::memory_store
//!
//! In-memory workspace for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::traits::{validate_name, WorkspaceError, WorkspaceStore};

/// Workspace kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryWorkspace {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a workspace pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Result<Self, WorkspaceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let ws = Self::new();
        for (name, contents) in entries {
            ws.write(&name.into(), &contents.into())?;
        }
        Ok(ws)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still structurally valid.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WorkspaceStore for MemoryWorkspace {
    fn read(&self, name: &str) -> Result<Option<String>, WorkspaceError> {
        validate_name(name)?;
        Ok(self.lock().get(name).cloned())
    }

    fn write(&self, name: &str, contents: &str) -> Result<(), WorkspaceError> {
        validate_name(name)?;
        self.lock().insert(name.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), WorkspaceError> {
        validate_name(name)?;
        self.lock().remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, WorkspaceError> {
        Ok(self.lock().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_operations() {
        let ws = MemoryWorkspace::new();
        assert!(ws.read("a.xml").unwrap().is_none());
        ws.write("a.xml", "1").unwrap();
        assert_eq!(ws.read("a.xml").unwrap().as_deref(), Some("1"));
        ws.remove("a.xml").unwrap();
        assert!(!ws.exists("a.xml").unwrap());
    }

    #[test]
    fn list_matching_filters_by_suffix() {
        let ws = MemoryWorkspace::with_entries([
            ("x-amd.xml", ""),
            ("dmdsec.xml", ""),
            ("notes.txt", ""),
        ])
        .unwrap();
        assert_eq!(
            ws.list_matching(&["-amd.xml", "dmdsec.xml"]).unwrap(),
            vec!["dmdsec.xml", "x-amd.xml"]
        );
    }

    #[test]
    fn rejects_invalid_names() {
        let ws = MemoryWorkspace::new();
        assert!(ws.write("a/b", "").is_err());
    }
}
