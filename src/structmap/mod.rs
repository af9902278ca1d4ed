//! structmap
//!
//! Synthesis of the mutually consistent fileSec / structMap pair.
//!
//! # Strategies
//!
//! - [`filesystem`]: divs mirror the directory tree of the packaged objects
//! - [`ead3`]: divs mirror the components of an EAD3 finding aid
//!
//! Both strategies register files through a shared [`FileSection`], so
//! every `mets:fptr` they emit names an entry of the fileSec, and a file
//! linked twice gets one entry.
//!
//! # Example
//!
//! ```
//! use sipweave::core::references::ReferenceIndex;
//! use sipweave::core::types::{ObjectPath, StructmapType};
//! use sipweave::structmap::{filesystem, StructmapOptions};
//! use sipweave::workspace::MemoryWorkspace;
//!
//! let ws = MemoryWorkspace::new();
//! let objects = vec![ObjectPath::new("a/1.txt").unwrap()];
//! let options = StructmapOptions::new(StructmapType::new("PHYSICAL").unwrap());
//!
//! let output = filesystem::build(&objects, &ws, &ReferenceIndex::default(), &options).unwrap();
//! assert_eq!(output.file_count(), 1);
//! ```

pub mod ead3;
pub mod filesystem;
pub mod properties;

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::core::paths::{FILESEC_FILE, STRUCTMAP_FILE};
use crate::core::references::{ReferenceError, ReferenceIndex};
use crate::core::tree::TreeError;
use crate::core::types::{FileId, LogicalTarget, MdId, ObjectPath, StructmapType, ValidationError};
use crate::mets::{elements, fragment, FragmentError};
use crate::workspace::{WorkspaceError, WorkspaceStore};
use crate::xml::{Element, NamespaceMap, XmlError};

/// Errors from structural map synthesis.
#[derive(Debug, Error)]
pub enum StructmapError {
    /// A finding-aid link matches no packaged object.
    #[error("cannot resolve digital object link '{href}' to a packaged file")]
    ReferenceResolution { href: String },

    /// The finding aid lacks a required element.
    #[error("invalid finding aid: {0}")]
    FindingAid(String),

    /// A property record is not valid JSON.
    #[error("invalid property record '{name}': {source}")]
    Properties {
        name: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    References(#[from] ReferenceError),

    #[error(transparent)]
    Fragment(#[from] FragmentError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// Options shared by both strategies.
#[derive(Debug, Clone)]
pub struct StructmapOptions {
    /// TYPE of the structMap element.
    pub structmap_type: StructmapType,
    /// TYPE override of the root div.
    pub root_type: Option<String>,
}

impl StructmapOptions {
    pub fn new(structmap_type: StructmapType) -> Self {
        Self {
            structmap_type,
            root_type: None,
        }
    }

    pub fn with_root_type(mut self, root_type: Option<String>) -> Self {
        self.root_type = root_type;
        self
    }
}

/// fileSec entries built while walking a structure.
///
/// Entries are created on first use and reused afterwards, in creation
/// order.
#[derive(Debug)]
pub struct FileSection<'a> {
    index: &'a ReferenceIndex,
    ids: HashMap<ObjectPath, FileId>,
    files: Vec<Element>,
}

impl<'a> FileSection<'a> {
    pub fn new(index: &'a ReferenceIndex) -> Self {
        Self {
            index,
            ids: HashMap::new(),
            files: Vec::new(),
        }
    }

    /// File id of `path`, creating its fileSec entry on first use.
    ///
    /// A new entry carries the administrative ids of the file and one
    /// stream element per stream known to the reference index.
    pub fn file_id(&mut self, path: &ObjectPath) -> FileId {
        if let Some(id) = self.ids.get(path) {
            return id.clone();
        }

        let id = FileId::generate();
        let admids = self.index.lookup(&LogicalTarget::File(path.clone()));
        let streams: Vec<BTreeSet<MdId>> = self
            .index
            .streams(path)
            .into_iter()
            .map(|i| self.index.lookup(&LogicalTarget::FileStream(path.clone(), i)))
            .collect();

        self.files.push(elements::file(&id, path, &admids, &streams));
        self.ids.insert(path.clone(), id.clone());
        tracing::debug!(path = %path, file_id = %id, "added fileSec entry");
        id
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Finish into a `mets:fileSec` element.
    pub fn into_element(self) -> Element {
        elements::file_sec(self.files)
    }
}

/// The fileSec / structMap pair produced by a strategy.
#[derive(Debug, Clone)]
pub struct StructmapOutput {
    pub filesec: Element,
    pub structmap: Element,
    file_count: usize,
}

impl StructmapOutput {
    fn new(files: FileSection<'_>, structmap: Element) -> Self {
        let file_count = files.len();
        Self {
            filesec: files.into_element(),
            structmap,
            file_count,
        }
    }

    /// Number of fileSec entries.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Store both sections as `filesec.xml` and `structmap.xml`.
    pub fn write(&self, ws: &dyn WorkspaceStore) -> Result<(), StructmapError> {
        fragment::write(ws, FILESEC_FILE, self.filesec.clone(), NamespaceMap::new())?;
        fragment::write(ws, STRUCTMAP_FILE, self.structmap.clone(), NamespaceMap::new())?;
        Ok(())
    }
}
