//! core::tree
//!
//! Ordered directory tree built from a flat list of object paths.
//!
//! # Ordering
//!
//! The tree never sorts. Sibling order is the order in which names first
//! appear in the input, so callers pass paths pre-sorted and every
//! structural map built from the tree inherits that order.
//!
//! # Example
//!
//! ```
//! use sipweave::core::tree::{build, flatten};
//! use sipweave::core::types::ObjectPath;
//!
//! let paths: Vec<ObjectPath> = ["a/1.txt", "a/2.txt", "b/3.txt"]
//!     .iter()
//!     .map(|p| ObjectPath::new(p).unwrap())
//!     .collect();
//! let tree = build(&paths).unwrap();
//!
//! assert_eq!(tree.len(), 2);
//! assert_eq!(flatten(&tree), paths);
//! ```

use std::collections::HashMap;

use thiserror::Error;

use super::types::ObjectPath;

/// Deepest path accepted by [`build`].
///
/// Downstream walks recurse once per level, so this also bounds their
/// stack use.
pub const MAX_DEPTH: usize = 256;

/// Errors from tree construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A path is both a file and a prefix of other paths.
    #[error("structure conflict: '{path}' is both a file and a directory")]
    StructureConflict { path: String },

    #[error("path '{path}' is nested deeper than {limit} levels")]
    TooDeep { path: String, limit: usize },
}

/// A node in the directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// A file.
    Leaf(ObjectPath),
    /// A directory with ordered children.
    Internal(Directory),
}

/// A directory: its path plus children in first-insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    path: ObjectPath,
    entries: Vec<(String, TreeNode)>,
    positions: HashMap<String, usize>,
}

impl Directory {
    fn new(path: ObjectPath) -> Self {
        Self {
            path,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Path of this directory (`.` for the root).
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Child with the given name.
    pub fn get(&self, name: &str) -> Option<&TreeNode> {
        self.positions.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn subdirectory(&mut self, name: &str) -> Result<&mut Directory, TreeError> {
        let index = match self.positions.get(name) {
            Some(&index) => index,
            None => {
                let child = Directory::new(self.path.join(name));
                self.insert(name, TreeNode::Internal(child))
            }
        };
        match &mut self.entries[index].1 {
            TreeNode::Internal(dir) => Ok(dir),
            TreeNode::Leaf(path) => Err(TreeError::StructureConflict {
                path: path.to_string(),
            }),
        }
    }

    fn add_leaf(&mut self, name: &str, path: &ObjectPath) -> Result<(), TreeError> {
        match self.positions.get(name).map(|&i| &self.entries[i].1) {
            None => {
                self.insert(name, TreeNode::Leaf(path.clone()));
                Ok(())
            }
            Some(TreeNode::Leaf(_)) => {
                tracing::debug!(path = %path, "duplicate object path ignored");
                Ok(())
            }
            Some(TreeNode::Internal(_)) => Err(TreeError::StructureConflict {
                path: path.to_string(),
            }),
        }
    }

    fn insert(&mut self, name: &str, node: TreeNode) -> usize {
        let index = self.entries.len();
        self.entries.push((name.to_string(), node));
        self.positions.insert(name.to_string(), index);
        index
    }
}

/// Build a tree from `paths`, one level per path segment.
///
/// The returned root directory has path `.`.
///
/// # Errors
///
/// - `TreeError::StructureConflict` if a path is both a file and a
///   directory prefix of another path (or is the root itself).
/// - `TreeError::TooDeep` if a path has more than [`MAX_DEPTH`] segments.
pub fn build(paths: &[ObjectPath]) -> Result<Directory, TreeError> {
    let mut root = Directory::new(ObjectPath::root());

    for path in paths {
        if path.depth() > MAX_DEPTH {
            return Err(TreeError::TooDeep {
                path: path.to_string(),
                limit: MAX_DEPTH,
            });
        }

        let segments: Vec<&str> = path.segments().collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(TreeError::StructureConflict {
                path: path.to_string(),
            });
        };

        let mut dir = &mut root;
        for segment in parents {
            dir = dir.subdirectory(segment)?;
        }
        dir.add_leaf(last, path)?;
    }

    Ok(root)
}

/// Every leaf path of the tree, depth-first in sibling order.
///
/// For a pre-sorted, duplicate-free input, `flatten(&build(paths)?)`
/// returns `paths` unchanged.
pub fn flatten(root: &Directory) -> Vec<ObjectPath> {
    let mut out = Vec::new();
    let mut stack: Vec<std::slice::Iter<'_, (String, TreeNode)>> = vec![root.entries.iter()];

    while let Some(iter) = stack.last_mut() {
        match iter.next() {
            Some((_, TreeNode::Leaf(path))) => out.push(path.clone()),
            Some((_, TreeNode::Internal(dir))) => stack.push(dir.entries.iter()),
            None => {
                stack.pop();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(values: &[&str]) -> Vec<ObjectPath> {
        values.iter().map(|v| ObjectPath::new(v).unwrap()).collect()
    }

    #[test]
    fn builds_nested_directories() {
        let input = paths(&["a/1.txt", "a/2.txt", "b/3.txt"]);
        let root = build(&input).unwrap();

        let names: Vec<&str> = root.children().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);

        let Some(TreeNode::Internal(a)) = root.get("a") else {
            panic!("expected directory");
        };
        assert_eq!(a.path().as_str(), "a");
        assert_eq!(a.len(), 2);
        assert!(matches!(a.get("1.txt"), Some(TreeNode::Leaf(p)) if p.as_str() == "a/1.txt"));
    }

    #[test]
    fn sibling_order_follows_input() {
        let root = build(&paths(&["z.txt", "a.txt", "m/x"])).unwrap();
        let names: Vec<&str> = root.children().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["z.txt", "a.txt", "m"]);
    }

    #[test]
    fn flatten_recovers_input() {
        let input = paths(&["a.txt", "a/1.txt", "a/b/c/d.txt", "a/b/e.txt", "b.txt"]);
        let root = build(&input).unwrap();
        assert_eq!(flatten(&root), input);
    }

    #[test]
    fn empty_input_gives_empty_root() {
        let root = build(&[]).unwrap();
        assert!(root.is_empty());
        assert!(root.path().is_root());
        assert!(flatten(&root).is_empty());
    }

    #[test]
    fn leaf_then_directory_conflicts() {
        let err = build(&paths(&["a", "a/b.txt"])).unwrap_err();
        assert_eq!(err, TreeError::StructureConflict { path: "a".into() });
    }

    #[test]
    fn directory_then_leaf_conflicts() {
        let err = build(&paths(&["a/b.txt", "a"])).unwrap_err();
        assert_eq!(err, TreeError::StructureConflict { path: "a".into() });
    }

    #[test]
    fn root_as_object_conflicts() {
        assert!(build(&[ObjectPath::root()]).is_err());
    }

    #[test]
    fn duplicates_are_ignored() {
        let root = build(&paths(&["a.txt", "a.txt"])).unwrap();
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn depth_guard() {
        let deep = vec!["d"; MAX_DEPTH + 1].join("/");
        let err = build(&paths(&[deep.as_str()])).unwrap_err();
        assert!(matches!(err, TreeError::TooDeep { limit: MAX_DEPTH, .. }));

        let ok = vec!["d"; MAX_DEPTH].join("/");
        assert!(build(&paths(&[ok.as_str()])).is_ok());
    }
}
