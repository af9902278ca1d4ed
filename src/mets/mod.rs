//! mets
//!
//! METS vocabulary: element builders and single-section fragments.
//!
//! # Modules
//!
//! - [`elements`] - Builders for divs, file pointers, fileSec entries, header and agents
//! - [`fragment`] - Fragment documents: wrap, unwrap, read, write, import records

pub mod elements;
pub mod fragment;

use thiserror::Error;

use crate::core::references::ReferenceError;
use crate::core::types::MetadataCategory;
use crate::workspace::WorkspaceError;
use crate::xml::XmlError;

/// Errors from fragment operations.
#[derive(Debug, Error)]
pub enum FragmentError {
    /// The fragment wrapper holds no section.
    #[error("fragment '{name}' contains no section")]
    Empty { name: String },

    /// The fragment is not well-formed XML.
    #[error("failed to parse fragment '{name}': {source}")]
    Parse { name: String, source: XmlError },

    /// A record cannot describe the requested target.
    #[error("{category} metadata cannot describe {target}")]
    InvalidTarget {
        category: MetadataCategory,
        target: String,
    },

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    References(#[from] ReferenceError),
}
