//! structmap::ead3
//!
//! Structural map mirroring the components of an EAD3 finding aid.
//!
//! # Mapping
//!
//! ```text
//! structMap TYPE=<type>
//! └── div TYPE="logical"
//!     └── div TYPE="archdesc" LABEL=<level>        (package DMDID/ADMID)
//!         └── div TYPE="c01" LABEL=<level>          (one per component)
//!             ├── fptr ...                          (the component's own links)
//!             └── div TYPE="c02" ...                (nested components)
//! ```
//!
//! Components are the elements `c` and `c01` .. `c12`. Every component
//! child of a `dsc` or of another component becomes a nested div, whatever
//! its number, so unnumbered and skipped levels are kept. A component's
//! own file pointers come before its nested component divs.
//!
//! Links in `archdesc/did` are resolved as well and attach to the
//! archdesc div, next to the package-level metadata ids.
//!
//! # Link Resolution
//!
//! A `dao/@href` is matched against the packaged objects, trying in turn
//! an exact path match, a match on trailing path segments, and plain
//! containment. The first object in sorted order wins. A link that
//! matches nothing aborts the build.

use std::collections::BTreeSet;

use super::{FileSection, StructmapError, StructmapOptions, StructmapOutput};
use crate::core::naming::descriptive_id;
use crate::core::paths::WorkspacePaths;
use crate::core::references::ReferenceIndex;
use crate::core::tree::{TreeError, MAX_DEPTH};
use crate::core::types::{LogicalTarget, MdId, ObjectPath};
use crate::mets::elements;
use crate::workspace::WorkspaceStore;
use crate::xml::{namespaces, Element};

const LOGICAL_TYPE: &str = "logical";
const ARCHDESC_TYPE: &str = "archdesc";
const LAST_NUMBERED_LEVEL: u8 = 12;

/// Build the fileSec / structMap pair from a finding aid.
///
/// `objects` must be sorted; they are the candidates links resolve to.
///
/// # Errors
///
/// - `StructmapError::FindingAid` if there is no `archdesc`
/// - `StructmapError::ReferenceResolution` for a link matching no object
pub fn build(
    finding_aid: &Element,
    objects: &[ObjectPath],
    ws: &dyn WorkspaceStore,
    index: &ReferenceIndex,
    options: &StructmapOptions,
) -> Result<StructmapOutput, StructmapError> {
    let archdesc = if is_ead(finding_aid, ARCHDESC_TYPE) {
        finding_aid
    } else {
        finding_aid
            .elements()
            .find(|e| is_ead(e, ARCHDESC_TYPE))
            .ok_or_else(|| StructmapError::FindingAid("missing archdesc element".into()))?
    };

    let mut walk = Walk {
        objects,
        files: FileSection::new(index),
    };

    let components: Vec<&Element> = archdesc
        .elements()
        .filter(|e| is_ead(e, "dsc"))
        .flat_map(components)
        .collect();
    let mut archdesc_div = walk.component(archdesc, ARCHDESC_TYPE, components, 0)?;

    let root = ObjectPath::root();
    let mut dmdids = BTreeSet::new();
    if ws.exists(&WorkspacePaths::dmdsec_name(&root))? {
        dmdids.insert(descriptive_id(&root));
    }
    let admids: BTreeSet<MdId> = index.lookup(&LogicalTarget::Directory(root));
    elements::set_md_ids(&mut archdesc_div, &dmdids, &admids);

    let logical_type = options.root_type.as_deref().unwrap_or(LOGICAL_TYPE);
    let logical = elements::div(logical_type, None).with_child(archdesc_div);

    tracing::debug!(files = walk.files.len(), "built EAD3 structural map");
    let structmap = elements::struct_map(options.structmap_type.as_str(), logical);
    Ok(StructmapOutput::new(walk.files, structmap))
}

struct Walk<'a> {
    objects: &'a [ObjectPath],
    files: FileSection<'a>,
}

impl Walk<'_> {
    fn component(
        &mut self,
        node: &Element,
        div_type: &str,
        children: Vec<&Element>,
        depth: usize,
    ) -> Result<Element, StructmapError> {
        if depth > MAX_DEPTH {
            return Err(TreeError::TooDeep {
                path: div_type.to_string(),
                limit: MAX_DEPTH,
            }
            .into());
        }

        let mut div = elements::div(div_type, level_label(node));

        for href in links(node) {
            let path = resolve(href, self.objects)?;
            div.push(elements::fptr(&self.files.file_id(path)));
        }

        for child in children {
            let nested = components(child);
            div.push(self.component(child, &child.name.local, nested, depth + 1)?);
        }
        Ok(div)
    }
}

fn is_ead(element: &Element, local: &str) -> bool {
    element.name.local == local
        && matches!(element.name.ns.as_deref(), None | Some(namespaces::EAD3))
}

/// `@otherlevel`, falling back to `@level`.
fn level_label(node: &Element) -> Option<&str> {
    node.attr("otherlevel").or_else(|| node.attr("level"))
}

/// Whether `element` is a `c` or `c01` .. `c12` component.
fn is_component(element: &Element) -> bool {
    if !is_ead(element, &element.name.local) {
        return false;
    }
    match element.name.local.as_str() {
        "c" => true,
        tag => {
            let Some(number) = tag.strip_prefix('c').filter(|n| n.len() == 2) else {
                return false;
            };
            number
                .parse::<u8>()
                .is_ok_and(|level| (1..=LAST_NUMBERED_LEVEL).contains(&level))
        }
    }
}

/// Component children of `node`, in document order.
fn components(node: &Element) -> Vec<&Element> {
    node.elements().filter(|e| is_component(e)).collect()
}

/// Digital object links carried directly by a component.
///
/// Every `did/dao` counts, and the first `dao` of each `did/daoset`.
fn links(node: &Element) -> Vec<&str> {
    let mut hrefs = Vec::new();
    for did in node.elements().filter(|e| is_ead(e, "did")) {
        for child in did.elements() {
            let dao = if is_ead(child, "dao") {
                Some(child)
            } else if is_ead(child, "daoset") {
                child.elements().find(|e| is_ead(e, "dao"))
            } else {
                None
            };
            if let Some(href) = dao.and_then(|d| d.attr("href")) {
                hrefs.push(href);
            }
        }
    }
    hrefs
}

/// Resolve a link to a packaged object.
///
/// # Example
///
/// ```
/// use sipweave::core::types::ObjectPath;
/// use sipweave::structmap::ead3::resolve;
///
/// let objects = vec![ObjectPath::new("data/foo/bar.txt").unwrap()];
/// assert_eq!(resolve("/foo/bar.txt", &objects).unwrap(), &objects[0]);
/// assert!(resolve("/foo/missing.txt", &objects).is_err());
/// ```
pub fn resolve<'o>(href: &str, objects: &'o [ObjectPath]) -> Result<&'o ObjectPath, StructmapError> {
    let unresolved = || StructmapError::ReferenceResolution {
        href: href.to_string(),
    };

    let raw = href.strip_prefix("file://").unwrap_or(href);
    let wanted = ObjectPath::new(raw).map_err(|_| unresolved())?;
    if wanted.is_root() {
        return Err(unresolved());
    }
    let wanted = wanted.as_str();
    let suffix = format!("/{}", wanted);

    objects
        .iter()
        .find(|o| o.as_str() == wanted)
        .or_else(|| objects.iter().find(|o| o.as_str().ends_with(&suffix)))
        .or_else(|| objects.iter().find(|o| o.as_str().contains(wanted)))
        .ok_or_else(unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::StructmapType;
    use crate::workspace::MemoryWorkspace;
    use crate::xml;

    const FINDING_AID: &str = r#"<ead xmlns="http://ead3.archivists.org/schema/">
      <control/>
      <archdesc level="fonds">
        <did><dao href="/readme.txt"/></did>
        <dsc>
          <c01 level="series">
            <did><dao href="/docs/a.txt"/></did>
            <c02 level="otherlevel" otherlevel="folder">
              <did>
                <daoset>
                  <dao href="docs/b.txt"/>
                  <dao href="docs/missing.txt"/>
                </daoset>
              </did>
            </c02>
          </c01>
          <c01 level="series">
            <did><dao href="/docs/a.txt"/></did>
          </c01>
        </dsc>
      </archdesc>
    </ead>"#;

    fn objects() -> Vec<ObjectPath> {
        ["data/docs/a.txt", "data/docs/b.txt", "data/readme.txt"]
            .iter()
            .map(|p| ObjectPath::new(p).unwrap())
            .collect()
    }

    fn options() -> StructmapOptions {
        StructmapOptions::new(StructmapType::new(StructmapType::EAD3_LOGICAL).unwrap())
    }

    fn mets_divs(element: &Element) -> Vec<&Element> {
        element.children_named(Some(namespaces::METS), "div").collect()
    }

    #[test]
    fn builds_component_hierarchy() {
        let doc = xml::parse(FINDING_AID).unwrap();
        let ws = MemoryWorkspace::new();
        let output = build(&doc.root, &objects(), &ws, &ReferenceIndex::default(), &options())
            .unwrap();

        assert_eq!(output.structmap.attr("TYPE"), Some("EAD3-logical"));
        let logical = mets_divs(&output.structmap)[0];
        assert_eq!(logical.attr("TYPE"), Some("logical"));

        let archdesc = mets_divs(logical)[0];
        assert_eq!(archdesc.attr("TYPE"), Some("archdesc"));
        assert_eq!(archdesc.attr("LABEL"), Some("fonds"));

        let series = mets_divs(archdesc);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].attr("TYPE"), Some("c01"));
        assert_eq!(series[0].attr("LABEL"), Some("series"));

        let folder = mets_divs(series[0])[0];
        assert_eq!(folder.attr("TYPE"), Some("c02"));
        assert_eq!(folder.attr("LABEL"), Some("folder"));

        // a.txt is linked twice but listed once; missing.txt in the daoset is not a link
        assert_eq!(output.file_count(), 3);
    }

    #[test]
    fn own_pointers_precede_nested_components() {
        let doc = xml::parse(FINDING_AID).unwrap();
        let ws = MemoryWorkspace::new();
        let output = build(&doc.root, &objects(), &ws, &ReferenceIndex::default(), &options())
            .unwrap();

        let archdesc = mets_divs(mets_divs(&output.structmap)[0])[0];
        let series = mets_divs(archdesc)[0];
        let order: Vec<&str> = series.elements().map(|e| e.name.local.as_str()).collect();
        assert_eq!(order, vec!["fptr", "div"]);

        let archdesc_order: Vec<&str> = archdesc.elements().map(|e| e.name.local.as_str()).collect();
        assert_eq!(archdesc_order, vec!["fptr", "div", "div"]);
    }

    #[test]
    fn repeated_links_share_a_file_id() {
        let doc = xml::parse(FINDING_AID).unwrap();
        let ws = MemoryWorkspace::new();
        let output = build(&doc.root, &objects(), &ws, &ReferenceIndex::default(), &options())
            .unwrap();

        let archdesc = mets_divs(mets_divs(&output.structmap)[0])[0];
        let series = mets_divs(archdesc);
        let first = series[0].child(Some(namespaces::METS), "fptr").unwrap();
        let second = series[1].child(Some(namespaces::METS), "fptr").unwrap();
        assert_eq!(first.attr("FILEID"), second.attr("FILEID"));
    }

    #[test]
    fn package_descriptive_metadata_on_archdesc() {
        let doc = xml::parse(FINDING_AID).unwrap();
        let ws = MemoryWorkspace::with_entries([("dmdsec.xml", "<x/>")]).unwrap();
        let output = build(&doc.root, &objects(), &ws, &ReferenceIndex::default(), &options())
            .unwrap();
        let archdesc = mets_divs(mets_divs(&output.structmap)[0])[0];
        assert_eq!(
            archdesc.attr("DMDID"),
            Some(descriptive_id(&ObjectPath::root()).as_str())
        );
    }

    #[test]
    fn unresolved_link_is_fatal() {
        let doc = xml::parse(
            r#"<ead xmlns="http://ead3.archivists.org/schema/"><archdesc level="fonds"><dsc>
                 <c><did><dao href="/nowhere.txt"/></did></c>
               </dsc></archdesc></ead>"#,
        )
        .unwrap();
        let ws = MemoryWorkspace::new();
        let err = build(&doc.root, &objects(), &ws, &ReferenceIndex::default(), &options())
            .unwrap_err();
        assert!(matches!(
            err,
            StructmapError::ReferenceResolution { ref href } if href == "/nowhere.txt"
        ));
    }

    #[test]
    fn missing_archdesc_is_rejected() {
        let doc = xml::parse(r#"<ead xmlns="http://ead3.archivists.org/schema/"/>"#).unwrap();
        let ws = MemoryWorkspace::new();
        assert!(matches!(
            build(&doc.root, &objects(), &ws, &ReferenceIndex::default(), &options()),
            Err(StructmapError::FindingAid(_))
        ));
    }

    #[test]
    fn resolution_prefers_exact_then_suffix_then_containment() {
        let objects: Vec<ObjectPath> = ["a/x.txt", "b/a/x.txt", "x.txt", "zx.txt.bak"]
            .iter()
            .map(|p| ObjectPath::new(p).unwrap())
            .collect();

        assert_eq!(resolve("x.txt", &objects).unwrap().as_str(), "x.txt");
        assert_eq!(resolve("/a/x.txt", &objects).unwrap().as_str(), "a/x.txt");
        assert_eq!(resolve("file://x.txt", &objects).unwrap().as_str(), "x.txt");
        assert_eq!(resolve("txt.bak", &objects).unwrap().as_str(), "zx.txt.bak");
        assert!(resolve("/", &objects).is_err());
    }

    #[test]
    fn component_tags() {
        let doc = xml::parse(
            r#"<x xmlns="http://ead3.archivists.org/schema/"><c/><c01/><c12/><c13/><c1/><did/></x>"#,
        )
        .unwrap();
        let recognized: Vec<&str> = doc
            .root
            .elements()
            .filter(|e| is_component(e))
            .map(|e| e.name.local.as_str())
            .collect();
        assert_eq!(recognized, vec!["c", "c01", "c12"]);
    }

    const MIXED_NESTING: &str = r#"<ead xmlns="http://ead3.archivists.org/schema/">
      <archdesc level="fonds">
        <dsc>
          <c01 level="series">
            <c level="file"><did><dao href="/a.txt"/></did></c>
            <c03 level="item"><did><dao href="LINK"/></did></c03>
          </c01>
        </dsc>
      </archdesc>
    </ead>"#;

    #[test]
    fn unnumbered_and_skipped_levels_are_walked() {
        let objects: Vec<ObjectPath> = ["data/a.txt", "data/b.txt"]
            .iter()
            .map(|p| ObjectPath::new(p).unwrap())
            .collect();
        let doc = xml::parse(&MIXED_NESTING.replace("LINK", "/b.txt")).unwrap();
        let ws = MemoryWorkspace::new();
        let output =
            build(&doc.root, &objects, &ws, &ReferenceIndex::default(), &options()).unwrap();
        assert_eq!(output.file_count(), 2);

        let archdesc = mets_divs(mets_divs(&output.structmap)[0])[0];
        let series = mets_divs(archdesc)[0];
        let types: Vec<Option<&str>> = mets_divs(series).iter().map(|d| d.attr("TYPE")).collect();
        assert_eq!(types, vec![Some("c"), Some("c03")]);
    }

    #[test]
    fn unresolved_link_in_skipped_level_is_fatal() {
        let objects = vec![ObjectPath::new("data/a.txt").unwrap()];
        let doc = xml::parse(&MIXED_NESTING.replace("LINK", "/nowhere.txt")).unwrap();
        let ws = MemoryWorkspace::new();
        let result = build(&doc.root, &objects, &ws, &ReferenceIndex::default(), &options());
        assert!(matches!(
            result,
            Err(StructmapError::ReferenceResolution { ref href }) if href == "/nowhere.txt"
        ));
    }
}
