//! Property-based tests for identifiers, trees and structural maps.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;

use sipweave::core::naming::{decode_path, encode_path, encode_path_with, metadata_id};
use sipweave::core::references::ReferenceIndex;
use sipweave::core::tree;
use sipweave::core::types::{LogicalTarget, ObjectPath, StructmapType};
use sipweave::structmap::{filesystem, StructmapOptions};
use sipweave::workspace::MemoryWorkspace;
use sipweave::xml::{namespaces, Element};

/// Strategy for one path segment.
fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-c]{1,2}",
        "[a-z0-9]{1,6}\\.txt",
        "[a-z ]{1,4}",
    ]
}

/// Strategy for a relative object path of one to four segments.
fn object_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|segments| segments.join("/"))
}

/// Sorted, duplicate-free object paths where no path is a directory of another.
fn object_list() -> impl Strategy<Value = Vec<ObjectPath>> {
    prop::collection::btree_set(object_path(), 0..25).prop_map(|set| {
        let paths: Vec<String> = set.into_iter().collect();
        let conflict_free: Vec<ObjectPath> = paths
            .iter()
            .filter(|p| {
                let prefix = format!("{}/", p);
                !paths.iter().any(|q| q.starts_with(&prefix))
            })
            .map(|p| ObjectPath::new(p).unwrap())
            .collect();
        let mut sorted = conflict_free;
        sorted.sort();
        sorted.dedup();
        sorted
    })
}

fn collect<'a>(element: &'a Element, local: &str, out: &mut Vec<&'a Element>) {
    for child in element.elements() {
        if child.name.is(Some(namespaces::METS), local) {
            out.push(child);
        }
        collect(child, local, out);
    }
}

proptest! {
    /// Decoding an encoded path returns the original path.
    #[test]
    fn codec_round_trip(path in "\\PC{0,40}", suffix in "(-amd\\.xml|-dmdsec\\.xml|)") {
        let encoded = encode_path_with(&path, "", &suffix);
        prop_assert_eq!(decode_path(&encoded, &suffix).unwrap(), path);
    }

    /// Distinct paths never share an encoding.
    #[test]
    fn codec_is_injective(a in "\\PC{0,20}", b in "\\PC{0,20}") {
        prop_assume!(a != b);
        prop_assert_ne!(encode_path(&a), encode_path(&b));
    }

    /// Encoded paths are single filename-safe tokens.
    #[test]
    fn encoding_has_no_separator(path in "\\PC{0,40}") {
        let encoded = encode_path(&path);
        prop_assert!(!encoded.contains('/'));
        prop_assert!(encoded.is_ascii());
    }

    /// The same tag and target always give the same id.
    #[test]
    fn metadata_id_is_deterministic(tag in "[a-zA-Z:]{1,20}", path in object_path(), stream in 0u32..8) {
        let path = ObjectPath::new(&path).unwrap();
        for target in [
            LogicalTarget::File(path.clone()),
            LogicalTarget::FileStream(path.clone(), stream),
            LogicalTarget::Directory(path.clone()),
        ] {
            prop_assert_eq!(metadata_id(&tag, &target), metadata_id(&tag, &target));
        }
    }

    /// File, stream and directory targets of one path get distinct ids.
    #[test]
    fn metadata_id_separates_target_kinds(path in object_path()) {
        let path = ObjectPath::new(&path).unwrap();
        let ids: BTreeSet<_> = [
            LogicalTarget::File(path.clone()),
            LogicalTarget::FileStream(path.clone(), 1),
            LogicalTarget::Directory(path.clone()),
        ]
        .iter()
        .map(|target| metadata_id("techMD:OTHER", target))
        .collect();
        prop_assert_eq!(ids.len(), 3);
    }

    /// Flattening a built tree recovers the input list.
    #[test]
    fn tree_fidelity(paths in object_list()) {
        let root = tree::build(&paths).unwrap();
        prop_assert_eq!(tree::flatten(&root), paths);
    }

    /// Every file pointer resolves to exactly one fileSec entry.
    #[test]
    fn file_pointers_match_file_section(paths in object_list()) {
        let ws = MemoryWorkspace::new();
        let index = ReferenceIndex::default();
        let options = StructmapOptions::new(StructmapType::new("Directory-physical").unwrap());

        let built = filesystem::build(&paths, &ws, &index, &options).unwrap();

        let mut files = Vec::new();
        collect(&built.filesec, "file", &mut files);
        let mut file_ids: HashMap<&str, usize> = HashMap::new();
        for file in &files {
            *file_ids.entry(file.attr("ID").unwrap()).or_default() += 1;
        }

        let mut fptrs = Vec::new();
        collect(&built.structmap, "fptr", &mut fptrs);

        prop_assert_eq!(fptrs.len(), paths.len());
        prop_assert_eq!(files.len(), paths.len());
        for fptr in fptrs {
            let id = fptr.attr("FILEID").unwrap();
            prop_assert_eq!(file_ids.get(id).copied(), Some(1));
        }
    }
}
