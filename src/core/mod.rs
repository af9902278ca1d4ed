//! core
//!
//! Core domain types, identifiers and persisted state for sipweave.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ObjectPath, LogicalTarget, MdId, FileId, etc.
//! - [`naming`] - Identifier codec and deterministic metadata ids
//! - [`paths`] - Centralized naming of workspace entries
//! - [`references`] - Reference tables linking records to targets
//! - [`tree`] - Directory tree built from sorted object paths
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Metadata ids and file ids live in separate id spaces
//! - Workspace entry names are derived in one place

pub mod config;
pub mod naming;
pub mod paths;
pub mod references;
pub mod tree;
pub mod types;
