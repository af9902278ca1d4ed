//! workspace::dir_store
//!
//! Directory-backed workspace.
//!
//! Entries are files directly under the workspace directory. Writes are
//! atomic (write to a temp file, then rename), so a later stage never
//! observes a half-written fragment.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::traits::{validate_name, WorkspaceError, WorkspaceStore};

/// Workspace stored in a filesystem directory.
#[derive(Debug, Clone)]
pub struct DirWorkspace {
    root: PathBuf,
}

impl DirWorkspace {
    /// Open an existing workspace directory.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::NotFound` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(WorkspaceError::NotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }

    /// Open a workspace, creating the directory if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| WorkspaceError::Io {
            name: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Get the workspace directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf, WorkspaceError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

fn io_error(name: &str) -> impl FnOnce(std::io::Error) -> WorkspaceError + '_ {
    move |source| WorkspaceError::Io {
        name: name.to_string(),
        source,
    }
}

impl WorkspaceStore for DirWorkspace {
    fn read(&self, name: &str) -> Result<Option<String>, WorkspaceError> {
        let path = self.entry_path(name)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(name)(e)),
        }
    }

    fn write(&self, name: &str, contents: &str) -> Result<(), WorkspaceError> {
        let path = self.entry_path(name)?;
        let temp_path = self.root.join(format!(".{}.tmp", name));

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(io_error(name))?;
            file.write_all(contents.as_bytes())
                .map_err(io_error(name))?;
            file.sync_all().map_err(io_error(name))?;
        }

        fs::rename(&temp_path, &path).map_err(io_error(name))?;
        tracing::debug!(entry = name, bytes = contents.len(), "wrote workspace entry");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), WorkspaceError> {
        let path = self.entry_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(name)(e)),
        }
    }

    fn list(&self) -> Result<Vec<String>, WorkspaceError> {
        let root_name = self.root.display().to_string();
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_error(&root_name))? {
            let entry = entry.map_err(io_error(&root_name))?;
            let is_file = entry
                .file_type()
                .map_err(io_error(&root_name))?
                .is_file();
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
