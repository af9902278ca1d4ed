//! mets::elements
//!
//! Builders for the METS elements sipweave emits.

use std::collections::BTreeSet;

use crate::core::naming::encode_path;
use crate::core::types::{FileId, MdId, ObjectPath};
use crate::xml::{namespaces, Element, Name};

/// Space-separated, sorted id list for DMDID/ADMID, or `None` if empty.
pub fn id_list<'a>(ids: impl IntoIterator<Item = &'a MdId>) -> Option<String> {
    let ids: BTreeSet<&str> = ids.into_iter().map(MdId::as_str).collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids.into_iter().collect::<Vec<_>>().join(" "))
    }
}

/// Location URI of an object in the package.
///
/// # Example
///
/// ```
/// use sipweave::core::types::ObjectPath;
/// use sipweave::mets::elements::href;
///
/// assert_eq!(href(&ObjectPath::new("a/1.txt").unwrap()), "file://a%2F1.txt");
/// ```
pub fn href(path: &ObjectPath) -> String {
    format!("file://{}", encode_path(path.as_str()))
}

/// `mets:div` with a TYPE and optional LABEL.
pub fn div(div_type: &str, label: Option<&str>) -> Element {
    let mut div = Element::mets("div").with_attr(Name::local("TYPE"), div_type);
    div.set_opt_attr("LABEL", label);
    div
}

/// Attach DMDID/ADMID to a div when the id sets are non-empty.
pub fn set_md_ids(element: &mut Element, dmdids: &BTreeSet<MdId>, admids: &BTreeSet<MdId>) {
    element.set_opt_attr("DMDID", id_list(dmdids).as_deref());
    element.set_opt_attr("ADMID", id_list(admids).as_deref());
}

/// `mets:fptr` pointing at a fileSec entry.
pub fn fptr(file_id: &FileId) -> Element {
    Element::mets("fptr").with_attr(Name::local("FILEID"), file_id.as_str())
}

/// `mets:file` with its `FLocat` and one `mets:stream` per stream id set.
pub fn file(
    file_id: &FileId,
    path: &ObjectPath,
    admids: &BTreeSet<MdId>,
    streams: &[BTreeSet<MdId>],
) -> Element {
    let mut file = Element::mets("file").with_attr(Name::local("ID"), file_id.as_str());
    file.set_opt_attr("ADMID", id_list(admids).as_deref());

    file.push(
        Element::mets("FLocat")
            .with_attr(Name::local("LOCTYPE"), "URL")
            .with_attr(Name::xlink("href"), href(path))
            .with_attr(Name::xlink("type"), "simple"),
    );

    for stream_ids in streams {
        let mut stream = Element::mets("stream");
        stream.set_opt_attr("ADMID", id_list(stream_ids).as_deref());
        file.push(stream);
    }
    file
}

/// `mets:fileSec` holding one `mets:fileGrp` with `files`.
pub fn file_sec(files: Vec<Element>) -> Element {
    let mut group = Element::mets("fileGrp");
    for file in files {
        group.push(file);
    }
    Element::mets("fileSec").with_child(group)
}

/// `mets:structMap` of the given TYPE around a root div.
pub fn struct_map(structmap_type: &str, root: Element) -> Element {
    Element::mets("structMap")
        .with_attr(Name::local("TYPE"), structmap_type)
        .with_child(root)
}

/// Agent role and type pair written to the METS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Organization that created the package.
    Creator,
    /// Organization that archives a package created by a service.
    Archivist,
    /// Packaging software that created the package.
    Software,
}

/// `mets:agent` with a `mets:name`.
pub fn agent(kind: AgentKind, name: &str) -> Element {
    let mut agent = Element::mets("agent");
    match kind {
        AgentKind::Creator => {
            agent.set_attr(Name::local("ROLE"), "CREATOR");
            agent.set_attr(Name::local("TYPE"), "ORGANIZATION");
        }
        AgentKind::Archivist => {
            agent.set_attr(Name::local("ROLE"), "ARCHIVIST");
            agent.set_attr(Name::local("TYPE"), "ORGANIZATION");
        }
        AgentKind::Software => {
            agent.set_attr(Name::local("ROLE"), "CREATOR");
            agent.set_attr(Name::local("TYPE"), "OTHER");
            agent.set_attr(Name::local("OTHERTYPE"), "SOFTWARE");
        }
    }
    let mut name_element = Element::mets("name");
    name_element.push_text(name);
    agent.with_child(name_element)
}

/// `mets:metsHdr` with dates, record status and agents.
pub fn mets_hdr(
    create_date: &str,
    last_mod_date: Option<&str>,
    record_status: &str,
    agents: Vec<Element>,
) -> Element {
    let mut hdr = Element::mets("metsHdr").with_attr(Name::local("CREATEDATE"), create_date);
    hdr.set_opt_attr("LASTMODDATE", last_mod_date);
    hdr.set_attr(Name::local("RECORDSTATUS"), record_status);
    for agent in agents {
        hdr.push(agent);
    }
    hdr
}

/// `mets:mdWrap` around an XML record.
///
/// Types outside the METS MDTYPE vocabulary are written as
/// `MDTYPE="OTHER"` with `OTHERMDTYPE`.
pub fn md_wrap(md_type: &str, record: Element) -> Element {
    let mut wrap = Element::mets("mdWrap");
    if KNOWN_MDTYPES.contains(&md_type) {
        wrap.set_attr(Name::local("MDTYPE"), md_type);
    } else {
        wrap.set_attr(Name::local("MDTYPE"), "OTHER");
        wrap.set_attr(Name::local("OTHERMDTYPE"), md_type);
    }
    wrap.with_child(Element::mets("xmlData").with_child(record))
}

const KNOWN_MDTYPES: [&str; 21] = [
    "MARC",
    "MODS",
    "EAD",
    "DC",
    "NISOIMG",
    "LC-AV",
    "VRA",
    "TEIHDR",
    "DDI",
    "FGDC",
    "LOM",
    "PREMIS",
    "PREMIS:OBJECT",
    "PREMIS:AGENT",
    "PREMIS:RIGHTS",
    "PREMIS:EVENT",
    "TEXTMD",
    "METSRIGHTS",
    "ISO 19115:2003 NAP",
    "EAC-CPF",
    "LIDO",
];

/// Whether `element` is the METS element `local`.
pub fn is_mets(element: &Element, local: &str) -> bool {
    element.name.is(Some(namespaces::METS), local)
}
