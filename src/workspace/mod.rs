//! workspace
//!
//! Storage abstraction for the shared workspace stages hand data through.
//!
//! # Architecture
//!
//! Fragments, reference tables and property records are stored through
//! the [`WorkspaceStore`] trait, which has two implementations:
//!
//! - [`DirWorkspace`]: a flat directory on disk (default)
//! - [`MemoryWorkspace`]: an in-memory map, used by tests
//!
//! # Consistency
//!
//! The workspace is a sequential hand-off log: one stage runs to
//! completion before the next starts. Directory writes are atomic
//! (temp file + rename), but nothing is locked, and concurrent writers
//! to one workspace are unsupported.
//!
//! # Example
//!
//! ```
//! use sipweave::workspace::{DirWorkspace, WorkspaceStore};
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! let ws = DirWorkspace::open(temp.path()).unwrap();
//! ws.write("dmdsec.xml", "<dmd/>").unwrap();
//! assert_eq!(ws.list().unwrap(), vec!["dmdsec.xml"]);
//! ```

mod dir_store;
mod memory_store;
mod traits;

pub use dir_store::DirWorkspace;
pub use memory_store::MemoryWorkspace;
pub use traits::{validate_name, WorkspaceError, WorkspaceStore};
