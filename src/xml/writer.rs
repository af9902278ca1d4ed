//! xml::writer
//!
//! Serialize an [`Element`] tree with pruned namespace declarations.

use std::collections::HashMap;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::element::{Element, Name, Node};
use super::namespaces::{NamespaceMap, XML};
use super::XmlError;

/// Serialize `root` as a UTF-8 document with two-space indentation.
///
/// Only namespaces that are actually used by some element or attribute
/// are declared, all of them on the root element.
pub fn to_string(root: &Element, namespaces: &NamespaceMap) -> Result<String, XmlError> {
    let used = root.used_namespaces();
    let assigned = namespaces.assign(&used);
    let prefixes: HashMap<&str, &str> = assigned
        .iter()
        .map(|(uri, prefix)| (uri.as_str(), prefix.as_str()))
        .collect();

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut declarations: Vec<(String, String)> = assigned
        .iter()
        .filter(|(uri, _)| uri != XML)
        .map(|(uri, prefix)| (format!("xmlns:{}", prefix), uri.clone()))
        .collect();
    declarations.sort();

    write_element(&mut writer, root, &prefixes, Some(&declarations))?;

    let mut output = String::from_utf8(writer.into_inner())?;
    output.push('\n');
    Ok(output)
}

fn qualified(name: &Name, prefixes: &HashMap<&str, &str>) -> String {
    match name.ns.as_deref().and_then(|ns| prefixes.get(ns)) {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.clone(),
    }
}

/// Write `element` with one element per line.
///
/// Elements holding text are written inline as a whole, so indentation
/// never enters mixed content.
fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    prefixes: &HashMap<&str, &str>,
    declarations: Option<&[(String, String)]>,
) -> Result<(), XmlError> {
    if has_text(element) {
        let mut inline = Writer::new(Vec::new());
        write_inline(&mut inline, element, prefixes, declarations)?;
        writer.write_indent()?;
        writer.get_mut().extend_from_slice(&inline.into_inner());
        return Ok(());
    }

    let tag = qualified(&element.name, prefixes);
    let start = start_tag(&tag, element, prefixes, declarations);
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in element.elements() {
        write_element(writer, child, prefixes, None)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
    Ok(())
}

/// Write `element` and its subtree exactly as stored.
fn write_inline<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
    prefixes: &HashMap<&str, &str>,
    declarations: Option<&[(String, String)]>,
) -> Result<(), XmlError> {
    let tag = qualified(&element.name, prefixes);
    let start = start_tag(&tag, element, prefixes, declarations);
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_inline(writer, e, prefixes, None)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
    Ok(())
}

fn start_tag<'t>(
    tag: &'t str,
    element: &Element,
    prefixes: &HashMap<&str, &str>,
    declarations: Option<&[(String, String)]>,
) -> BytesStart<'t> {
    let mut start = BytesStart::new(tag);
    for (key, value) in declarations.unwrap_or_default() {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    for attr in &element.attributes {
        let key = qualified(&attr.name, prefixes);
        start.push_attribute((key.as_str(), attr.value.as_str()));
    }
    start
}

fn has_text(element: &Element) -> bool {
    element
        .children
        .iter()
        .any(|node| matches!(node, Node::Text(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{namespaces, parse};

    #[test]
    fn declares_only_used_namespaces() {
        let root = Element::mets("mets").with_child(Element::mets("structMap"));
        let mut hints = NamespaceMap::new();
        hints.hint("premis", namespaces::PREMIS);
        let out = to_string(&root, &hints).unwrap();

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(out.contains("xmlns:mets=\"http://www.loc.gov/METS/\""));
        assert!(!out.contains("xmlns:premis"));
        assert!(!out.contains("xmlns:xlink"));
        assert!(out.contains("<mets:structMap/>"));
    }

    #[test]
    fn escapes_attribute_values_and_text() {
        let mut root = Element::new(Name::local("a")).with_attr(Name::local("v"), "x\"<y");
        root.push_text("1 < 2 & 3");
        let out = to_string(&root, &NamespaceMap::new()).unwrap();
        let reparsed = parse(&out).unwrap();
        assert_eq!(reparsed.root.attr("v"), Some("x\"<y"));
        assert_eq!(reparsed.root.text(), "1 < 2 & 3");
    }

    #[test]
    fn round_trips_namespaced_tree() {
        let input = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:unused="urn:unused"><mets:file ID="_1"><mets:FLocat xlink:href="file://a"/></mets:file></mets:mets>"#;
        let doc = parse(input).unwrap();
        let out = to_string(&doc.root, &doc.namespaces).unwrap();
        assert!(!out.contains("urn:unused"));
        let again = parse(&out).unwrap();
        assert_eq!(again.root, doc.root);
    }

    #[test]
    fn mixed_content_is_not_indented() {
        let doc = parse(
            r#"<div xmlns="urn:x"><p>Letters from <name>X</name> to the board</p><q/></div>"#,
        )
        .unwrap();
        let out = to_string(&doc.root, &doc.namespaces).unwrap();
        assert!(out.contains("<ns0:p>Letters from <ns0:name>X</ns0:name> to the board</ns0:p>"));
        let again = parse(&out).unwrap();
        assert_eq!(again.root, doc.root);
    }

    #[test]
    fn xml_namespace_is_never_declared() {
        let root = Element::new(Name::local("a"))
            .with_attr(Name::new(Some(XML), "lang"), "fi");
        let out = to_string(&root, &NamespaceMap::new()).unwrap();
        assert!(out.contains("xml:lang=\"fi\""));
        assert!(!out.contains("xmlns:xml"));
    }
}
