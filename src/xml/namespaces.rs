//! xml::namespaces
//!
//! Namespace URIs and prefix assignment.

use std::collections::BTreeMap;

pub const METS: &str = "http://www.loc.gov/METS/";
pub const XLINK: &str = "http://www.w3.org/1999/xlink";
pub const FI: &str = "http://digitalpreservation.fi/schemas/mets/fi-extensions";
pub const PREMIS: &str = "info:lc/xmlns/premis-v2";
pub const EAD3: &str = "http://ead3.archivists.org/schema/";
pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Canonical prefixes for namespaces commonly found in SIP fragments.
const KNOWN: [(&str, &str); 16] = [
    ("mets", METS),
    ("xlink", XLINK),
    ("fi", FI),
    ("premis", PREMIS),
    ("ead3", EAD3),
    ("xsi", XSI),
    ("mix", "http://www.loc.gov/mix/v20"),
    ("mods", "http://www.loc.gov/mods/v3"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("addml", "http://www.arkivverket.no/standarder/addml"),
    ("audiomd", "http://www.loc.gov/audioMD/"),
    ("videomd", "http://www.loc.gov/videoMD/"),
    ("ead", "urn:isbn:1-931666-22-9"),
    ("marc21", "http://www.loc.gov/MARC21/slim"),
    ("lido", "http://www.lido-schema.org"),
];

/// Mapping from namespace URI to the prefix used when serializing.
///
/// Known namespaces always get their canonical prefix. Other namespaces
/// keep the prefix they were declared with in the parsed input, as long
/// as that prefix is not already taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    hints: BTreeMap<String, String>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the prefix `prefix` seen for `uri`. First hint wins.
    pub fn hint(&mut self, prefix: &str, uri: &str) {
        if prefix.is_empty() || prefix == "xml" || prefix.starts_with("xmlns") {
            return;
        }
        self.hints
            .entry(uri.to_string())
            .or_insert_with(|| prefix.to_string());
    }

    /// Merge hints from another map; existing hints take precedence.
    pub fn extend(&mut self, other: &NamespaceMap) {
        for (uri, prefix) in &other.hints {
            self.hint(prefix, uri);
        }
    }

    /// Canonical prefix of a known namespace.
    pub fn known_prefix(uri: &str) -> Option<&'static str> {
        if uri == XML {
            return Some("xml");
        }
        KNOWN
            .iter()
            .find(|(_, known)| *known == uri)
            .map(|(prefix, _)| *prefix)
    }

    /// Assign prefixes to every URI in `used`, in order.
    ///
    /// Returns `(uri, prefix)` pairs. Collisions between hinted prefixes
    /// and unhinted URIs are resolved with generated `nsN` prefixes.
    pub fn assign(&self, used: &[String]) -> Vec<(String, String)> {
        let mut taken: Vec<String> = Vec::new();
        let mut assigned = Vec::new();
        let mut counter = 0;

        for uri in used {
            let candidate = Self::known_prefix(uri)
                .map(str::to_string)
                .or_else(|| self.hints.get(uri).cloned())
                .filter(|p| {
                    !taken.contains(p) && Self::known_uri(p).map_or(true, |k| k == uri.as_str())
                });

            let prefix = match candidate {
                Some(prefix) => prefix,
                None => loop {
                    let generated = format!("ns{}", counter);
                    counter += 1;
                    if !taken.contains(&generated) {
                        break generated;
                    }
                },
            };
            taken.push(prefix.clone());
            assigned.push((uri.clone(), prefix));
        }
        assigned
    }

    fn known_uri(prefix: &str) -> Option<&'static str> {
        KNOWN
            .iter()
            .find(|(known, _)| *known == prefix)
            .map(|(_, uri)| *uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_namespaces_use_canonical_prefix() {
        let map = NamespaceMap::new();
        let assigned = map.assign(&[METS.to_string(), XLINK.to_string()]);
        assert_eq!(
            assigned,
            vec![
                (METS.to_string(), "mets".to_string()),
                (XLINK.to_string(), "xlink".to_string())
            ]
        );
    }

    #[test]
    fn hinted_prefix_is_kept() {
        let mut map = NamespaceMap::new();
        map.hint("foo", "urn:example:foo");
        let assigned = map.assign(&["urn:example:foo".to_string()]);
        assert_eq!(assigned[0].1, "foo");
    }

    #[test]
    fn hint_cannot_steal_known_prefix() {
        let mut map = NamespaceMap::new();
        map.hint("mets", "urn:not:mets");
        let assigned = map.assign(&["urn:not:mets".to_string()]);
        assert_eq!(assigned[0].1, "ns0");
    }

    #[test]
    fn unknown_namespaces_get_generated_prefixes() {
        let map = NamespaceMap::new();
        let assigned = map.assign(&["urn:a".to_string(), "urn:b".to_string()]);
        assert_eq!(assigned[0].1, "ns0");
        assert_eq!(assigned[1].1, "ns1");
    }

    #[test]
    fn first_hint_wins() {
        let mut map = NamespaceMap::new();
        map.hint("a", "urn:x");
        map.hint("b", "urn:x");
        assert_eq!(map.assign(&["urn:x".to_string()])[0].1, "a");
    }
}
