//! compile::merge
//!
//! Collect fragments from a workspace and reconcile duplicate sections.
//!
//! # Rules
//!
//! - Fragment names are processed in sorted order.
//! - `amdSec` fragments sharing an `ID` (or all lacking one) merge into a
//!   single `amdSec`; children are concatenated in scan order, and a
//!   child whose `ID` was already seen is dropped.
//! - `dmdSec` is keyed by `ID`; `fileSec` and `structMap` are single.
//!   For these, a later fragment replaces an earlier one with a warning.
//! - Output order is dmdSec*, amdSec*, fileSec, structMap.

use std::collections::{HashMap, HashSet};

use super::CompileError;
use crate::core::paths::FRAGMENT_SUFFIXES;
use crate::mets::elements::is_mets;
use crate::mets::fragment;
use crate::workspace::WorkspaceStore;
use crate::xml::{Element, NamespaceMap, Node};

/// Sections merged from all fragments, in canonical order.
#[derive(Debug, Clone, Default)]
pub struct MergedSections {
    pub sections: Vec<Element>,
    pub namespaces: NamespaceMap,
    /// Fragments that contributed, in scan order.
    pub fragments: Vec<String>,
}

#[derive(Debug)]
struct AmdGroup {
    section: Element,
    child_ids: HashSet<String>,
}

impl AmdGroup {
    fn new(section: Element) -> Self {
        let mut group = AmdGroup {
            section: Element {
                name: section.name.clone(),
                attributes: section.attributes.clone(),
                children: Vec::new(),
            },
            child_ids: HashSet::new(),
        };
        group.absorb(section);
        group
    }

    fn absorb(&mut self, section: Element) {
        for child in section.into_elements() {
            if let Some(id) = child.attr("ID") {
                if !self.child_ids.insert(id.to_string()) {
                    tracing::debug!(id, "dropping duplicate amdSec child");
                    continue;
                }
            }
            self.section.children.push(Node::Element(child));
        }
    }
}

/// Read and merge every fragment in the workspace.
pub fn merge_fragments(ws: &dyn WorkspaceStore) -> Result<MergedSections, CompileError> {
    let mut namespaces = NamespaceMap::new();
    let mut fragments = Vec::new();

    let mut dmd_secs: Vec<Element> = Vec::new();
    let mut dmd_positions: HashMap<Option<String>, usize> = HashMap::new();
    let mut amd_groups: Vec<AmdGroup> = Vec::new();
    let mut amd_positions: HashMap<Option<String>, usize> = HashMap::new();
    let mut file_sec: Option<Element> = None;
    let mut struct_map: Option<Element> = None;

    for name in ws.list_matching(&FRAGMENT_SUFFIXES)? {
        let Some((section, hints)) = fragment::read(ws, &name)? else {
            continue;
        };
        namespaces.extend(&hints);
        let id = section.attr("ID").map(str::to_string);

        if is_mets(&section, "amdSec") {
            match amd_positions.get(&id) {
                Some(&index) => amd_groups[index].absorb(section),
                None => {
                    amd_positions.insert(id, amd_groups.len());
                    amd_groups.push(AmdGroup::new(section));
                }
            }
        } else if is_mets(&section, "dmdSec") {
            match dmd_positions.get(&id) {
                Some(&index) => {
                    tracing::warn!(fragment = %name, id = ?id, "replacing duplicate dmdSec");
                    dmd_secs[index] = section;
                }
                None => {
                    dmd_positions.insert(id, dmd_secs.len());
                    dmd_secs.push(section);
                }
            }
        } else if is_mets(&section, "fileSec") {
            if file_sec.replace(section).is_some() {
                tracing::warn!(fragment = %name, "replacing duplicate fileSec");
            }
        } else if is_mets(&section, "structMap") {
            if struct_map.replace(section).is_some() {
                tracing::warn!(fragment = %name, "replacing duplicate structMap");
            }
        } else {
            tracing::warn!(
                fragment = %name,
                element = %section.name.local,
                "ignoring fragment with unrecognized section"
            );
            continue;
        }

        tracing::debug!(fragment = %name, "merged fragment");
        fragments.push(name);
    }

    let mut sections = dmd_secs;
    sections.extend(amd_groups.into_iter().map(|group| group.section));
    sections.extend(file_sec);
    sections.extend(struct_map);

    Ok(MergedSections {
        sections,
        namespaces,
        fragments,
    })
}
