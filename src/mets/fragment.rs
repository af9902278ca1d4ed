//! mets::fragment
//!
//! Reading and writing single-section fragment documents.
//!
//! A fragment is a `mets:mets` root wrapping exactly one semantic
//! section (`dmdSec`, `amdSec`, `fileSec` or `structMap`). Bare sections
//! without the wrapper are accepted when reading.

use crate::core::naming::{descriptive_id, metadata_id};
use crate::core::paths::WorkspacePaths;
use crate::core::references::ReferenceStore;
use crate::core::types::{LogicalTarget, MdId, MetadataCategory, ObjectPath};
use crate::workspace::WorkspaceStore;
use crate::xml::{self, Document, Element, Name, NamespaceMap};

use super::elements::{is_mets, md_wrap};
use super::FragmentError;

/// Wrap a section into a fragment document.
pub fn wrap(section: Element, namespaces: NamespaceMap) -> Document {
    Document {
        root: Element::mets("mets").with_child(section),
        namespaces,
    }
}

/// Extract the single semantic section of a parsed fragment.
///
/// # Errors
///
/// Returns `FragmentError::Empty` if a `mets:mets` wrapper has no
/// element child.
pub fn unwrap(name: &str, doc: Document) -> Result<(Element, NamespaceMap), FragmentError> {
    let Document { root, namespaces } = doc;
    if !is_mets(&root, "mets") {
        return Ok((root, namespaces));
    }

    let mut sections = root.into_elements().into_iter();
    let section = sections.next().ok_or_else(|| FragmentError::Empty {
        name: name.to_string(),
    })?;
    if sections.next().is_some() {
        tracing::warn!(fragment = name, "fragment wraps more than one section; using the first");
    }
    Ok((section, namespaces))
}

/// Serialize `section` as a fragment and store it under `name`.
pub fn write(
    ws: &dyn WorkspaceStore,
    name: &str,
    section: Element,
    namespaces: NamespaceMap,
) -> Result<(), FragmentError> {
    let contents = wrap(section, namespaces).to_xml_string()?;
    ws.write(name, &contents)?;
    tracing::debug!(fragment = name, "wrote fragment");
    Ok(())
}

/// Read fragment `name` and return its section, or `None` if absent.
pub fn read(
    ws: &dyn WorkspaceStore,
    name: &str,
) -> Result<Option<(Element, NamespaceMap)>, FragmentError> {
    let Some(contents) = ws.read(name)? else {
        return Ok(None);
    };
    let doc = xml::parse(&contents).map_err(|source| FragmentError::Parse {
        name: name.to_string(),
        source,
    })?;
    unwrap(name, doc).map(Some)
}

/// A metadata record imported into the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedRecord {
    pub id: MdId,
    pub fragment: String,
    pub target: LogicalTarget,
}

/// Wrap an existing XML record into a metadata fragment.
///
/// Descriptive records attach to a directory (the package root when
/// `target` is `None`) and are found by the structmap builders through
/// the fragment's name. Administrative records get an id derived from
/// `section`, `md_type` and the target, and are registered in the
/// category's reference table.
///
/// # Errors
///
/// Returns `FragmentError::InvalidTarget` for a descriptive record
/// aimed at a file or stream.
pub fn import_record(
    ws: &dyn WorkspaceStore,
    record: Document,
    category: MetadataCategory,
    md_type: &str,
    target: Option<LogicalTarget>,
) -> Result<ImportedRecord, FragmentError> {
    let target = target.unwrap_or_else(|| LogicalTarget::Directory(ObjectPath::root()));
    let Document {
        root: record,
        namespaces,
    } = record;

    if !category.is_administrative() {
        let LogicalTarget::Directory(dir) = &target else {
            return Err(FragmentError::InvalidTarget {
                category,
                target: target.to_string(),
            });
        };
        let id = descriptive_id(dir);
        let fragment = WorkspacePaths::dmdsec_name(dir);
        let section = Element::mets(category.section_element())
            .with_attr(Name::local("ID"), id.as_str())
            .with_child(md_wrap(md_type, record));
        write(ws, &fragment, section, namespaces)?;
        return Ok(ImportedRecord {
            id,
            fragment,
            target,
        });
    }

    let tag = format!("{}:{}", category.section_element(), md_type);
    let id = metadata_id(&tag, &target);
    let fragment = WorkspacePaths::amd_fragment_name(&id, md_type);
    let section = Element::mets("amdSec").with_child(
        Element::mets(category.section_element())
            .with_attr(Name::local("ID"), id.as_str())
            .with_child(md_wrap(md_type, record)),
    );
    write(ws, &fragment, section, namespaces)?;

    let mut references = ReferenceStore::new(category)?;
    references.add_reference(id.clone(), target.clone());
    references.write(ws)?;

    Ok(ImportedRecord {
        id,
        fragment,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::references::ReferenceIndex;
    use crate::workspace::MemoryWorkspace;
    use crate::xml::namespaces;

    fn record(xml: &str) -> Document {
        xml::parse(xml).unwrap()
    }

    #[test]
    fn wrap_and_read_back() {
        let ws = MemoryWorkspace::new();
        let section = Element::mets("fileSec");
        write(&ws, "filesec.xml", section.clone(), NamespaceMap::new()).unwrap();

        let (read_back, _) = read(&ws, "filesec.xml").unwrap().unwrap();
        assert_eq!(read_back, section);
        assert!(read(&ws, "structmap.xml").unwrap().is_none());
    }

    #[test]
    fn bare_sections_are_accepted() {
        let doc = record(r#"<mets:amdSec xmlns:mets="http://www.loc.gov/METS/" ID="_a"/>"#);
        let (section, _) = unwrap("x-amd.xml", doc).unwrap();
        assert!(is_mets(&section, "amdSec"));
    }

    #[test]
    fn empty_wrapper_is_an_error() {
        let doc = record(r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/"/>"#);
        assert!(matches!(
            unwrap("dmdsec.xml", doc),
            Err(FragmentError::Empty { .. })
        ));
    }

    #[test]
    fn import_descriptive_record_for_root() {
        let ws = MemoryWorkspace::new();
        let imported = import_record(
            &ws,
            record(r#"<dc:title xmlns:dc="http://purl.org/dc/elements/1.1/">T</dc:title>"#),
            MetadataCategory::Descriptive,
            "DC",
            None,
        )
        .unwrap();

        assert_eq!(imported.fragment, "dmdsec.xml");
        assert_eq!(imported.id, descriptive_id(&ObjectPath::root()));
        let (section, _) = read(&ws, "dmdsec.xml").unwrap().unwrap();
        assert_eq!(section.attr("ID"), Some(imported.id.as_str()));
        assert!(section
            .descendant(Some("http://purl.org/dc/elements/1.1/"), "title")
            .is_some());
    }

    #[test]
    fn import_descriptive_record_rejects_files() {
        let ws = MemoryWorkspace::new();
        let result = import_record(
            &ws,
            record("<r/>"),
            MetadataCategory::Descriptive,
            "DC",
            Some(LogicalTarget::File(ObjectPath::new("a.txt").unwrap())),
        );
        assert!(matches!(result, Err(FragmentError::InvalidTarget { .. })));
    }

    #[test]
    fn import_administrative_record_registers_reference() {
        let ws = MemoryWorkspace::new();
        let target = LogicalTarget::File(ObjectPath::new("data/a.tif").unwrap());
        let imported = import_record(
            &ws,
            record(r#"<mix:mix xmlns:mix="http://www.loc.gov/mix/v20"/>"#),
            MetadataCategory::Technical,
            "NISOIMG",
            Some(target.clone()),
        )
        .unwrap();

        assert!(imported.fragment.ends_with("-NISOIMG-amd.xml"));
        assert!(ws.exists(&imported.fragment).unwrap());

        let index = ReferenceIndex::load(&ws).unwrap();
        assert!(index.lookup(&target).contains(&imported.id));

        let (section, _) = read(&ws, &imported.fragment).unwrap().unwrap();
        let techmd = section.child(Some(namespaces::METS), "techMD").unwrap();
        assert_eq!(techmd.attr("ID"), Some(imported.id.as_str()));
    }

    #[test]
    fn import_is_deterministic() {
        let ws = MemoryWorkspace::new();
        let target = Some(LogicalTarget::Directory(ObjectPath::root()));
        let first = import_record(
            &ws,
            record("<e/>"),
            MetadataCategory::Provenance,
            "PREMIS:EVENT",
            target.clone(),
        )
        .unwrap();
        let second = import_record(
            &ws,
            record("<e/>"),
            MetadataCategory::Provenance,
            "PREMIS:EVENT",
            target,
        )
        .unwrap();
        assert_eq!(first, second);
        assert_eq!(ReferenceIndex::load(&ws).unwrap().len(), 1);
    }
}
