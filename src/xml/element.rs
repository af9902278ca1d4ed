//! xml::element
//!
//! Namespace-aware element tree.

use super::namespaces;

/// A qualified name: namespace URI (if any) plus local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub ns: Option<String>,
    pub local: String,
}

impl Name {
    pub fn new(ns: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            ns: ns.map(str::to_string),
            local: local.into(),
        }
    }

    /// Name without a namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }

    /// Name in the METS namespace.
    pub fn mets(local: impl Into<String>) -> Self {
        Self::new(Some(namespaces::METS), local)
    }

    /// Name in the XLink namespace.
    pub fn xlink(local: impl Into<String>) -> Self {
        Self::new(Some(namespaces::XLINK), local)
    }

    pub fn is(&self, ns: Option<&str>, local: &str) -> bool {
        self.ns.as_deref() == ns && self.local == local
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Name,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: Name,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Shorthand for an element in the METS namespace.
    pub fn mets(local: &str) -> Self {
        Self::new(Name::mets(local))
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, name: Name, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set an attribute, replacing an existing one of the same name.
    pub fn set_attr(&mut self, name: Name, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Set an unqualified attribute if `value` is present.
    pub fn set_opt_attr(&mut self, local: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.set_attr(Name::local(local), value);
        }
    }

    /// Value of an unqualified attribute.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attr_ns(None, local)
    }

    /// Value of a namespaced attribute.
    pub fn attr_ns(&self, ns: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(ns, local))
            .map(|a| a.value.as_str())
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Builder form of [`Element::push`].
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Child elements, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Child elements with the given name.
    pub fn children_named<'a>(
        &'a self,
        ns: Option<&'a str>,
        local: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name.is(ns, local))
    }

    /// First child element with the given name.
    pub fn child(&self, ns: Option<&str>, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.name.is(ns, local))
    }

    /// First descendant (depth-first, excluding self) with the given name.
    pub fn descendant(&self, ns: Option<&str>, local: &str) -> Option<&Element> {
        let mut stack: Vec<&Element> = self.elements().collect();
        stack.reverse();
        while let Some(element) = stack.pop() {
            if element.name.is(ns, local) {
                return Some(element);
            }
            let mut children: Vec<&Element> = element.elements().collect();
            children.reverse();
            stack.extend(children);
        }
        None
    }

    /// Concatenated text of direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Take ownership of the child elements, dropping text nodes.
    pub fn into_elements(self) -> Vec<Element> {
        self.children
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(e) => Some(e),
                Node::Text(_) => None,
            })
            .collect()
    }

    /// Every namespace URI used by this element and its descendants,
    /// in first-use order.
    pub fn used_namespaces(&self) -> Vec<String> {
        let mut used: Vec<String> = Vec::new();
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            let names = std::iter::once(&element.name)
                .chain(element.attributes.iter().map(|a| &a.name));
            for name in names {
                if let Some(ns) = &name.ns {
                    if !used.contains(ns) {
                        used.push(ns.clone());
                    }
                }
            }
            let mut children: Vec<&Element> = element.elements().collect();
            children.reverse();
            stack.extend(children);
        }
        used
    }
}
