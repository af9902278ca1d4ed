//! core::references
//!
//! Persisted many-to-many table between metadata records and the
//! files, streams and directories they describe.
//!
//! # Architecture
//!
//! A stage that produces administrative metadata buffers references in a
//! [`ReferenceStore`] and persists them with [`ReferenceStore::write`].
//! Every store writes its own table, named after its category and a run
//! token (`techmd-<run>-references.xml`, `digiprovmd-<run>-references.xml`,
//! ...). Existing tables are never rewritten. Later stages load every
//! table once into a [`ReferenceIndex`], which drops duplicate pairs.
//!
//! # Table Format
//!
//! ```xml
//! <mdReferences>
//!   <mdReference file="data/a.tif">_3f1c...</mdReference>
//!   <mdReference file="data/a.tif" stream="0">_9b2e...</mdReference>
//!   <mdReference directory="data">_77aa...</mdReference>
//! </mdReferences>
//! ```
//!
//! # Example
//!
//! ```
//! use sipweave::core::references::{ReferenceIndex, ReferenceStore};
//! use sipweave::core::types::{LogicalTarget, MdId, MetadataCategory, ObjectPath};
//! use sipweave::workspace::MemoryWorkspace;
//!
//! let ws = MemoryWorkspace::new();
//! let target = LogicalTarget::File(ObjectPath::new("x/y.txt").unwrap());
//!
//! let mut store = ReferenceStore::new(MetadataCategory::Technical).unwrap();
//! store.add_reference(MdId::new("id1").unwrap(), target.clone());
//! store.write(&ws).unwrap();
//!
//! let index = ReferenceIndex::load(&ws).unwrap();
//! assert_eq!(index.lookup(&target).len(), 1);
//! ```

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use super::paths::WorkspacePaths;
use super::types::{LogicalTarget, MdId, MetadataCategory, ObjectPath, ValidationError};
use crate::workspace::{WorkspaceError, WorkspaceStore};
use crate::xml::{self, Document, Element, Name, XmlError};

const TABLE_ELEMENT: &str = "mdReferences";
const ENTRY_ELEMENT: &str = "mdReference";

/// Errors from reference table operations.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// The category has no reference table (descriptive metadata).
    #[error("metadata category '{0}' has no reference table")]
    NoTable(MetadataCategory),

    /// A table exists but its content is not a valid reference table.
    #[error("malformed reference table '{table}': {reason}")]
    Malformed { table: String, reason: String },

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One (target, record id) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub target: LogicalTarget,
    pub id: MdId,
}

/// Buffered writer for one run's reference table of a category.
#[derive(Debug)]
pub struct ReferenceStore {
    category: MetadataCategory,
    run: String,
    pending: Vec<Reference>,
}

impl ReferenceStore {
    /// Create a store for an administrative category.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError::NoTable` for descriptive metadata.
    pub fn new(category: MetadataCategory) -> Result<Self, ReferenceError> {
        if !category.is_administrative() {
            return Err(ReferenceError::NoTable(category));
        }
        Ok(Self {
            category,
            run: uuid::Uuid::new_v4().simple().to_string(),
            pending: Vec::new(),
        })
    }

    pub fn category(&self) -> MetadataCategory {
        self.category
    }

    /// Buffer a reference for this run. No I/O happens until [`write`](Self::write).
    pub fn add_reference(&mut self, id: MdId, target: LogicalTarget) {
        self.pending.push(Reference { target, id });
    }

    /// Number of buffered references.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Name of the table this store writes.
    pub fn table_name(&self) -> Result<String, ReferenceError> {
        WorkspacePaths::references_name(self.category, &self.run)
            .ok_or(ReferenceError::NoTable(self.category))
    }

    /// Persist buffered references into this run's table.
    ///
    /// Tables of other runs are left untouched. Identical (target, id)
    /// pairs are stored once. Returns the number of entries written.
    pub fn write(&mut self, ws: &dyn WorkspaceStore) -> Result<usize, ReferenceError> {
        let table = self.table_name()?;
        let mut entries = match ws.read(&table)? {
            Some(contents) => parse_table(&table, &contents)?,
            None => Vec::new(),
        };

        let mut seen: HashSet<Reference> = entries.iter().cloned().collect();
        let before = entries.len();
        for reference in self.pending.drain(..) {
            if seen.insert(reference.clone()) {
                entries.push(reference);
            }
        }
        let added = entries.len() - before;

        ws.write(&table, &render_table(&entries)?)?;
        tracing::debug!(table = %table, added, total = entries.len(), "wrote reference table");
        Ok(added)
    }
}

fn render_table(entries: &[Reference]) -> Result<String, ReferenceError> {
    let mut root = Element::new(Name::local(TABLE_ELEMENT));
    for reference in entries {
        let mut entry = Element::new(Name::local(ENTRY_ELEMENT));
        match &reference.target {
            LogicalTarget::File(path) => {
                entry.set_attr(Name::local("file"), path.as_str());
            }
            LogicalTarget::FileStream(path, index) => {
                entry.set_attr(Name::local("file"), path.as_str());
                entry.set_attr(Name::local("stream"), index.to_string());
            }
            LogicalTarget::Directory(path) => {
                entry.set_attr(Name::local("directory"), path.as_str());
            }
        }
        entry.push_text(reference.id.as_str());
        root.push(entry);
    }
    Ok(Document::new(root).to_xml_string()?)
}

fn parse_table(table: &str, contents: &str) -> Result<Vec<Reference>, ReferenceError> {
    let malformed = |reason: String| ReferenceError::Malformed {
        table: table.to_string(),
        reason,
    };

    let doc = xml::parse(contents)?;
    if !doc.root.name.is(None, TABLE_ELEMENT) {
        return Err(malformed(format!(
            "expected root element '{}', found '{}'",
            TABLE_ELEMENT, doc.root.name.local
        )));
    }

    let mut entries = Vec::new();
    for entry in doc.root.children_named(None, ENTRY_ELEMENT) {
        let target = match (entry.attr("file"), entry.attr("stream"), entry.attr("directory")) {
            (Some(file), None, None) => LogicalTarget::File(ObjectPath::new(file)?),
            (Some(file), Some(stream), None) => {
                let index = stream
                    .parse::<u32>()
                    .map_err(|_| malformed(format!("invalid stream index '{}'", stream)))?;
                LogicalTarget::FileStream(ObjectPath::new(file)?, index)
            }
            (None, None, Some(directory)) => LogicalTarget::Directory(ObjectPath::new(directory)?),
            _ => {
                return Err(malformed(
                    "entry must set either 'file' (optionally with 'stream') or 'directory'"
                        .into(),
                ))
            }
        };
        let id = MdId::new(entry.text().trim())?;
        entries.push(Reference { target, id });
    }
    Ok(entries)
}

/// Read-only view over every reference table in a workspace.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    entries: Vec<Reference>,
}

impl ReferenceIndex {
    /// Load all `*-references.xml` tables in the workspace.
    ///
    /// A pair recorded by several runs is kept once. A workspace without
    /// tables yields an empty index.
    pub fn load(ws: &dyn WorkspaceStore) -> Result<Self, ReferenceError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for table in ws.list()? {
            if !WorkspacePaths::is_reference_table(&table) {
                continue;
            }
            if let Some(contents) = ws.read(&table)? {
                let parsed = parse_table(&table, &contents)?;
                tracing::debug!(table = %table, entries = parsed.len(), "loaded reference table");
                entries.extend(parsed.into_iter().filter(|r| seen.insert(r.clone())));
            }
        }
        Ok(Self { entries })
    }

    /// Build an index from in-memory references.
    pub fn from_references(entries: impl IntoIterator<Item = Reference>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Ids of every record describing exactly `target`.
    ///
    /// A directory lookup never matches file entries, a file lookup never
    /// matches stream entries, and a stream lookup needs the same index.
    pub fn lookup(&self, target: &LogicalTarget) -> BTreeSet<MdId> {
        self.entries
            .iter()
            .filter(|r| &r.target == target)
            .map(|r| r.id.clone())
            .collect()
    }

    /// Distinct file paths referenced by any file or stream entry, sorted.
    pub fn objects(&self) -> Vec<ObjectPath> {
        let objects: BTreeSet<&ObjectPath> = self
            .entries
            .iter()
            .filter_map(|r| match &r.target {
                LogicalTarget::File(path) | LogicalTarget::FileStream(path, _) => Some(path),
                LogicalTarget::Directory(_) => None,
            })
            .collect();
        objects.into_iter().cloned().collect()
    }

    /// Stream indices recorded for `path`, sorted.
    pub fn streams(&self, path: &ObjectPath) -> Vec<u32> {
        let streams: BTreeSet<u32> = self
            .entries
            .iter()
            .filter_map(|r| match &r.target {
                LogicalTarget::FileStream(p, index) if p == path => Some(*index),
                _ => None,
            })
            .collect();
        streams.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::MemoryWorkspace;

    fn path(s: &str) -> ObjectPath {
        ObjectPath::new(s).unwrap()
    }

    fn id(s: &str) -> MdId {
        MdId::new(s).unwrap()
    }

    fn ids(values: &[&str]) -> BTreeSet<MdId> {
        values.iter().map(|v| id(v)).collect()
    }

    #[test]
    fn descriptive_category_has_no_table() {
        assert!(matches!(
            ReferenceStore::new(MetadataCategory::Descriptive),
            Err(ReferenceError::NoTable(_))
        ));
    }

    #[test]
    fn add_reference_buffers_without_io() {
        let ws = MemoryWorkspace::new();
        let mut store = ReferenceStore::new(MetadataCategory::Technical).unwrap();
        store.add_reference(id("_a"), LogicalTarget::File(path("a.txt")));
        assert_eq!(store.pending(), 1);
        assert!(ws.list().unwrap().is_empty());
    }

    #[test]
    fn lookup_discriminates_targets() {
        let ws = MemoryWorkspace::new();
        let mut store = ReferenceStore::new(MetadataCategory::Technical).unwrap();
        store.add_reference(id("_file"), LogicalTarget::File(path("x/y.txt")));
        store.add_reference(id("_s0"), LogicalTarget::FileStream(path("x/y.txt"), 0));
        store.add_reference(id("_s1"), LogicalTarget::FileStream(path("x/y.txt"), 1));
        store.add_reference(id("_dir"), LogicalTarget::Directory(path("x")));
        store.write(&ws).unwrap();

        let index = ReferenceIndex::load(&ws).unwrap();
        assert_eq!(index.lookup(&LogicalTarget::File(path("x/y.txt"))), ids(&["_file"]));
        assert_eq!(
            index.lookup(&LogicalTarget::FileStream(path("x/y.txt"), 1)),
            ids(&["_s1"])
        );
        assert_eq!(index.lookup(&LogicalTarget::Directory(path("x"))), ids(&["_dir"]));
        assert!(index.lookup(&LogicalTarget::Directory(path("x/y.txt"))).is_empty());
        assert!(index.lookup(&LogicalTarget::File(path("x"))).is_empty());
        assert_eq!(index.streams(&path("x/y.txt")), vec![0, 1]);
        assert_eq!(index.objects(), vec![path("x/y.txt")]);
    }

    #[test]
    fn lookup_normalizes_paths() {
        let ws = MemoryWorkspace::new();
        let mut store = ReferenceStore::new(MetadataCategory::Provenance).unwrap();
        store.add_reference(id("_e"), LogicalTarget::Directory(path("./data/")));
        store.write(&ws).unwrap();

        let index = ReferenceIndex::load(&ws).unwrap();
        assert_eq!(index.lookup(&LogicalTarget::Directory(path("data"))), ids(&["_e"]));
    }

    #[test]
    fn missing_tables_yield_empty_results() {
        let index = ReferenceIndex::load(&MemoryWorkspace::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.lookup(&LogicalTarget::File(path("a"))).is_empty());
        assert!(index.objects().is_empty());
    }

    #[test]
    fn successive_runs_write_separate_tables() {
        let ws = MemoryWorkspace::new();
        let target = LogicalTarget::File(path("a.txt"));

        let mut first = ReferenceStore::new(MetadataCategory::Technical).unwrap();
        first.add_reference(id("_1"), target.clone());
        assert_eq!(first.write(&ws).unwrap(), 1);
        let first_table = ws.read(&first.table_name().unwrap()).unwrap();

        let mut second = ReferenceStore::new(MetadataCategory::Technical).unwrap();
        second.add_reference(id("_1"), target.clone());
        second.add_reference(id("_2"), target.clone());
        second.add_reference(id("_2"), target.clone());
        assert_eq!(second.write(&ws).unwrap(), 2);

        let tables = ws.list().unwrap();
        assert_eq!(tables.len(), 2);
        assert!(tables.iter().all(|t| t.starts_with("techmd-")));
        assert!(tables.iter().all(|t| WorkspacePaths::is_reference_table(t)));
        assert_eq!(ws.read(&first.table_name().unwrap()).unwrap(), first_table);

        let index = ReferenceIndex::load(&ws).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(&target), ids(&["_1", "_2"]));
    }

    #[test]
    fn categories_use_separate_tables() {
        let ws = MemoryWorkspace::new();
        let target = LogicalTarget::File(path("a.txt"));

        let mut tech = ReferenceStore::new(MetadataCategory::Technical).unwrap();
        tech.add_reference(id("_t"), target.clone());
        tech.write(&ws).unwrap();
        let mut events = ReferenceStore::new(MetadataCategory::Provenance).unwrap();
        events.add_reference(id("_p"), target.clone());
        events.write(&ws).unwrap();

        let tables = ws.list().unwrap();
        assert_eq!(tables.len(), 2);
        assert!(tables[0].starts_with("digiprovmd-"));
        assert!(tables[1].starts_with("techmd-"));
        let index = ReferenceIndex::load(&ws).unwrap();
        assert_eq!(index.lookup(&target), ids(&["_p", "_t"]));
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let ws = MemoryWorkspace::with_entries([(
            "techmd-references.xml",
            r#"<mdReferences><mdReference file="a" directory="b">_x</mdReference></mdReferences>"#,
        )])
        .unwrap();
        assert!(matches!(
            ReferenceIndex::load(&ws),
            Err(ReferenceError::Malformed { .. })
        ));

        let ws = MemoryWorkspace::with_entries([(
            "techmd-references.xml",
            r#"<mdReferences><mdReference file="a" stream="x">_x</mdReference></mdReferences>"#,
        )])
        .unwrap();
        assert!(ReferenceIndex::load(&ws).is_err());
    }
}
