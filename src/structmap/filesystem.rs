//! structmap::filesystem
//!
//! Structural map mirroring the directory tree of the packaged objects.
//!
//! # Div Layout
//!
//! Every directory becomes a div carrying the directory's descriptive id
//! (when a descriptive fragment exists for it) and administrative ids.
//! Within one div, children are emitted as:
//!
//! 1. bare file pointers, in input order
//! 2. `div TYPE="file" ORDER="n"` wrappers for files with an explicit
//!    order property, sorted by `n`
//! 3. sub-directory divs, in input order

use std::collections::BTreeSet;

use super::properties;
use super::{FileSection, StructmapError, StructmapOptions, StructmapOutput};
use crate::core::naming::descriptive_id;
use crate::core::paths::WorkspacePaths;
use crate::core::references::ReferenceIndex;
use crate::core::tree::{self, Directory, TreeNode};
use crate::core::types::{LogicalTarget, MdId, ObjectPath};
use crate::mets::elements;
use crate::workspace::WorkspaceStore;
use crate::xml::{Element, Name};

/// TYPE of directory divs in `Directory-physical` maps, and the default
/// root div TYPE otherwise.
const DIRECTORY_TYPE: &str = "directory";

/// Build the fileSec / structMap pair for `objects`.
///
/// `objects` must be sorted; their order determines sibling order.
///
/// # Errors
///
/// Returns `StructmapError::Tree` if a path is both a file and a
/// directory, in which case nothing is emitted.
pub fn build(
    objects: &[ObjectPath],
    ws: &dyn WorkspaceStore,
    index: &ReferenceIndex,
    options: &StructmapOptions,
) -> Result<StructmapOutput, StructmapError> {
    let tree = tree::build(objects)?;
    let physical = options.structmap_type.is_directory_physical();

    let mut walk = Walk {
        ws,
        index,
        files: FileSection::new(index),
        physical,
    };

    let root = if physical {
        walk.directory(&tree, DIRECTORY_TYPE, Some("."))?
    } else {
        let root_type = options.root_type.as_deref().unwrap_or(DIRECTORY_TYPE);
        walk.directory(&tree, root_type, None)?
    };

    tracing::debug!(
        files = walk.files.len(),
        structmap_type = options.structmap_type.as_str(),
        "built filesystem structural map"
    );
    let structmap = elements::struct_map(options.structmap_type.as_str(), root);
    Ok(StructmapOutput::new(walk.files, structmap))
}

struct Walk<'a> {
    ws: &'a dyn WorkspaceStore,
    index: &'a ReferenceIndex,
    files: FileSection<'a>,
    physical: bool,
}

impl Walk<'_> {
    fn directory(
        &mut self,
        dir: &Directory,
        div_type: &str,
        label: Option<&str>,
    ) -> Result<Element, StructmapError> {
        let mut div = elements::div(div_type, label);

        let dmdids = self.descriptive_ids(dir.path())?;
        let admids = self
            .index
            .lookup(&LogicalTarget::Directory(dir.path().clone()));
        elements::set_md_ids(&mut div, &dmdids, &admids);

        let mut pointers = Vec::new();
        let mut ordered: Vec<(u32, Element)> = Vec::new();
        let mut subdirectories = Vec::new();

        for (name, node) in dir.children() {
            match node {
                TreeNode::Leaf(path) => {
                    let pointer = elements::fptr(&self.files.file_id(path));
                    let order = properties::read(self.ws, path)?.and_then(|p| p.order);
                    match order {
                        Some(order) => {
                            let wrapper = elements::div("file", None)
                                .with_attr(Name::local("ORDER"), order.to_string())
                                .with_child(pointer);
                            ordered.push((order, wrapper));
                        }
                        None => pointers.push(pointer),
                    }
                }
                TreeNode::Internal(sub) => {
                    let child = if self.physical {
                        self.directory(sub, DIRECTORY_TYPE, Some(name))?
                    } else {
                        self.directory(sub, name, None)?
                    };
                    subdirectories.push(child);
                }
            }
        }

        ordered.sort_by_key(|(order, _)| *order);
        for pointer in pointers {
            div.push(pointer);
        }
        for (_, wrapper) in ordered {
            div.push(wrapper);
        }
        for child in subdirectories {
            div.push(child);
        }
        Ok(div)
    }

    fn descriptive_ids(&self, dir: &ObjectPath) -> Result<BTreeSet<MdId>, StructmapError> {
        let mut ids = BTreeSet::new();
        if self.ws.exists(&WorkspacePaths::dmdsec_name(dir))? {
            ids.insert(descriptive_id(dir));
        }
        Ok(ids)
    }
}
