//! xml::reader
//!
//! Parse XML text into an [`Element`] tree with resolved namespaces.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::NsReader;

use super::element::{Attribute, Element, Name, Node};
use super::namespaces::NamespaceMap;
use super::{Document, XmlError};

/// Parse a complete document.
///
/// Text is kept verbatim. Whitespace-only text is dropped only from
/// elements that hold no other text, so layout between child elements
/// disappears while mixed content keeps its spacing. Comments and
/// processing instructions are ignored.
///
/// # Errors
///
/// Returns an [`XmlError`] for malformed XML, unbound prefixes, or a
/// document without a root element.
pub fn parse(input: &str) -> Result<Document, XmlError> {
    let mut reader = NsReader::from_str(input);

    let mut namespaces = NamespaceMap::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let element = build_element(&reader, &start, &mut namespaces)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = build_element(&reader, &start, &mut namespaces)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let mut element = stack.pop().ok_or(XmlError::Malformed(
                    "closing tag without matching start".into(),
                ))?;
                drop_layout_whitespace(&mut element);
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if let Some(parent) = stack.last_mut() {
                    if !text.is_empty() {
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(&data)?.to_string();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Malformed("unexpected end of document".into()));
    }
    let root = root.ok_or(XmlError::Malformed("document has no root element".into()))?;
    Ok(Document { root, namespaces })
}

/// Remove whitespace-only text unless the element has real text content.
fn drop_layout_whitespace(element: &mut Element) {
    let is_blank = |node: &Node| matches!(node, Node::Text(t) if t.trim().is_empty());
    let mixed = element
        .children
        .iter()
        .any(|node| matches!(node, Node::Text(_)) && !is_blank(node));
    if !mixed {
        element.children.retain(|node| !is_blank(node));
    }
}

fn attach(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::Malformed("multiple root elements".into())),
    }
}

fn build_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    namespaces: &mut NamespaceMap,
) -> Result<Element, XmlError> {
    let (resolved, local) = reader.resolve_element(start.name());
    let name = Name {
        ns: namespace_of(resolved)?,
        local: std::str::from_utf8(local.as_ref())?.to_string(),
    };

    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr?;
        if let Some(declaration) = attr.key.as_namespace_binding() {
            if let PrefixDeclaration::Named(prefix) = declaration {
                let uri = attr.unescape_value()?;
                namespaces.hint(std::str::from_utf8(prefix)?, &uri);
            }
            continue;
        }

        let (resolved, local) = reader.resolve_attribute(attr.key);
        element.attributes.push(Attribute {
            name: Name {
                ns: namespace_of(resolved)?,
                local: std::str::from_utf8(local.as_ref())?.to_string(),
            },
            value: attr.unescape_value()?.into_owned(),
        });
    }
    Ok(element)
}

fn namespace_of(resolved: ResolveResult<'_>) -> Result<Option<String>, XmlError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(std::str::from_utf8(ns.as_ref())?.to_string())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(XmlError::UnknownPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}
