//! core::paths
//!
//! Centralized naming of workspace entries.
//!
//! # Architecture
//!
//! Stages never talk to each other directly; they agree on filenames.
//! Every entry name written to or looked up in a workspace is computed
//! here, so the convention lives in exactly one place.
//!
//! # Workspace Layout
//!
//! All entries are flat, directly under the workspace root:
//! - `<id>-<type>-amd.xml` - administrative metadata fragments
//! - `dmdsec.xml`, `<dir>-dmdsec.xml` - descriptive metadata fragments
//! - `filesec.xml`, `structmap.xml` - structural fragments
//! - `<category>-references.xml` - reference tables
//! - `<path>-properties.json` - per-file property records
//! - `mets.xml` - the compiled document
//! - `sipweave.toml` - workspace configuration
//!
//! # Example
//!
//! ```
//! use sipweave::core::paths::WorkspacePaths;
//! use sipweave::core::types::ObjectPath;
//! use std::path::PathBuf;
//!
//! let paths = WorkspacePaths::new(PathBuf::from("/work"));
//! assert_eq!(paths.mets_document_path(), PathBuf::from("/work/mets.xml"));
//!
//! let dir = ObjectPath::new("data/images").unwrap();
//! assert_eq!(WorkspacePaths::dmdsec_name(&dir), "data%2Fimages-dmdsec.xml");
//! ```

use std::path::{Path, PathBuf};

use super::naming::{encode_path, encode_path_with};
use super::types::{MdId, MetadataCategory, ObjectPath};

/// Filename of the compiled document.
pub const METS_FILE: &str = "mets.xml";
/// Filename of the fileSec fragment.
pub const FILESEC_FILE: &str = "filesec.xml";
/// Filename of the structMap fragment.
pub const STRUCTMAP_FILE: &str = "structmap.xml";
/// Filename of the package-level descriptive fragment.
pub const DMDSEC_FILE: &str = "dmdsec.xml";
/// Filename of the workspace configuration.
pub const CONFIG_FILE: &str = "sipweave.toml";

/// Suffixes of fragments picked up by the compiler.
pub const FRAGMENT_SUFFIXES: [&str; 5] = [
    "-amd.xml",
    "dmdsec.xml",
    "structmap.xml",
    "filesec.xml",
    "rightsmd.xml",
];

const REFERENCES_SUFFIX: &str = "-references.xml";
const PROPERTIES_SUFFIX: &str = "-properties.json";
const AMD_SUFFIX: &str = "-amd.xml";

/// Path routing for one workspace directory.
///
/// Associated functions compute flat entry names; methods resolve
/// them (and copied objects) against the workspace root on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    root: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the compiled document.
    pub fn mets_document_path(&self) -> PathBuf {
        self.root.join(METS_FILE)
    }

    /// Location of the workspace configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Location an object is copied to inside the workspace.
    pub fn object_path(&self, object: &ObjectPath) -> PathBuf {
        object
            .segments()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    // =========================================================================
    // Entry names
    // =========================================================================

    /// Reference table written by run `run` for an administrative category.
    ///
    /// Returns `None` for descriptive metadata, which is linked by
    /// fragment presence instead of a table.
    pub fn references_name(category: MetadataCategory, run: &str) -> Option<String> {
        if !category.is_administrative() {
            return None;
        }
        Some(format!("{}md-{}{}", category.as_str(), run, REFERENCES_SUFFIX))
    }

    /// Descriptive fragment of directory `dir`.
    pub fn dmdsec_name(dir: &ObjectPath) -> String {
        if dir.is_root() {
            DMDSEC_FILE.to_string()
        } else {
            encode_path_with(dir.as_str(), "", &format!("-{}", DMDSEC_FILE))
        }
    }

    /// Administrative fragment holding record `id` of metadata type `md_type`.
    pub fn amd_fragment_name(id: &MdId, md_type: &str) -> String {
        encode_path_with(md_type, &format!("{}-", id.bare()), AMD_SUFFIX)
    }

    /// Property record of object `path`.
    pub fn properties_name(path: &ObjectPath) -> String {
        format!("{}{}", encode_path(path.as_str()), PROPERTIES_SUFFIX)
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Whether `name` is a fragment the compiler merges.
    pub fn is_fragment(name: &str) -> bool {
        FRAGMENT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
    }

    /// Whether `name` is a reference table.
    pub fn is_reference_table(name: &str) -> bool {
        name.ends_with(REFERENCES_SUFFIX)
    }

    /// Whether `name` is an intermediate entry removed by cleanup.
    pub fn is_work_file(name: &str) -> bool {
        Self::is_fragment(name)
            || Self::is_reference_table(name)
            || name.ends_with(PROPERTIES_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> ObjectPath {
        ObjectPath::new(s).unwrap()
    }

    #[test]
    fn document_and_config_paths() {
        let paths = WorkspacePaths::new(PathBuf::from("/work"));
        assert_eq!(paths.mets_document_path(), PathBuf::from("/work/mets.xml"));
        assert_eq!(paths.config_path(), PathBuf::from("/work/sipweave.toml"));
        assert_eq!(paths.root(), Path::new("/work"));
    }

    #[test]
    fn object_path_nests_under_root() {
        let paths = WorkspacePaths::new(PathBuf::from("/work"));
        assert_eq!(
            paths.object_path(&path("data/a.txt")),
            PathBuf::from("/work/data/a.txt")
        );
    }

    #[test]
    fn references_names() {
        let tech = WorkspacePaths::references_name(MetadataCategory::Technical, "r1");
        assert_eq!(tech.as_deref(), Some("techmd-r1-references.xml"));
        assert!(WorkspacePaths::is_reference_table(&tech.unwrap()));
        assert_eq!(
            WorkspacePaths::references_name(MetadataCategory::Provenance, "r2").as_deref(),
            Some("digiprovmd-r2-references.xml")
        );
        assert!(WorkspacePaths::references_name(MetadataCategory::Descriptive, "r1").is_none());
    }

    #[test]
    fn dmdsec_names() {
        assert_eq!(WorkspacePaths::dmdsec_name(&ObjectPath::root()), "dmdsec.xml");
        assert_eq!(WorkspacePaths::dmdsec_name(&path("a/b")), "a%2Fb-dmdsec.xml");
    }

    #[test]
    fn amd_fragment_name_encodes_type() {
        let id = MdId::new("_4a4a5d87").unwrap();
        assert_eq!(
            WorkspacePaths::amd_fragment_name(&id, "PREMIS:EVENT"),
            "4a4a5d87-PREMIS%3AEVENT-amd.xml"
        );
    }

    #[test]
    fn classification() {
        assert!(WorkspacePaths::is_fragment("abc-NISOIMG-amd.xml"));
        assert!(WorkspacePaths::is_fragment("dmdsec.xml"));
        assert!(WorkspacePaths::is_fragment("a%2Fb-dmdsec.xml"));
        assert!(WorkspacePaths::is_fragment("structmap.xml"));
        assert!(WorkspacePaths::is_fragment("filesec.xml"));
        assert!(WorkspacePaths::is_fragment("rightsmd.xml"));
        assert!(!WorkspacePaths::is_fragment("mets.xml"));
        assert!(!WorkspacePaths::is_fragment("techmd-references.xml"));

        assert!(WorkspacePaths::is_work_file("techmd-references.xml"));
        assert!(WorkspacePaths::is_work_file("a.txt-properties.json"));
        assert!(!WorkspacePaths::is_work_file("mets.xml"));
        assert!(!WorkspacePaths::is_work_file("sipweave.toml"));
    }
}
