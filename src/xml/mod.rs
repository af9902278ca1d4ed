//! xml
//!
//! Minimal namespace-aware XML tree used for fragments, reference
//! tables, finding aids and the compiled document.
//!
//! # Modules
//!
//! - [`element`] - Element tree and qualified names
//! - [`namespaces`] - Namespace URIs and prefix assignment
//! - [`reader`] - Parsing via `quick-xml`
//! - [`writer`] - Serialization with pruned namespace declarations
//!
//! # Example
//!
//! ```
//! use sipweave::xml;
//!
//! let doc = xml::parse(r#"<m:mets xmlns:m="http://www.loc.gov/METS/" xmlns:x="urn:unused"><m:dmdSec ID="_d"/></m:mets>"#).unwrap();
//! let out = doc.to_xml_string().unwrap();
//!
//! assert!(out.contains("<mets:dmdSec ID=\"_d\"/>"));
//! assert!(!out.contains("urn:unused"));
//! ```

pub mod element;
pub mod namespaces;
pub mod reader;
pub mod writer;

pub use element::{Attribute, Element, Name, Node};
pub use namespaces::NamespaceMap;
pub use reader::parse;
pub use writer::to_string;

use thiserror::Error;

/// Errors from XML parsing and serialization.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("unbound namespace prefix '{0}'")]
    UnknownPrefix(String),

    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("invalid UTF-8 in XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid UTF-8 in serialized XML: {0}")]
    OutputUtf8(#[from] std::string::FromUtf8Error),

    #[error("failed to write XML: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed document: its root plus the prefixes seen while parsing.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Element,
    pub namespaces: NamespaceMap,
}

impl Document {
    /// Wrap a freshly built tree with no prefix hints.
    pub fn new(root: Element) -> Self {
        Self {
            root,
            namespaces: NamespaceMap::new(),
        }
    }

    /// Serialize the document.
    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        to_string(&self.root, &self.namespaces)
    }
}
