//! compile
//!
//! Assemble the final METS document from workspace fragments.
//!
//! # Pipeline
//!
//! 1. [`merge::merge_fragments`] reads and reconciles all fragments
//! 2. [`create_mets`] adds the root attributes and the header
//! 3. [`write_document`] stores the result as `mets.xml`
//!
//! Copying objects and cleaning up ([`housekeeping`]) are separate,
//! caller-requested steps.
//!
//! # Example
//!
//! ```
//! use sipweave::compile::{compile, Agents, HeaderAttributes, MetsAttributes};
//! use sipweave::core::types::{MetsDate, MetsProfile, RecordStatus};
//! use sipweave::workspace::MemoryWorkspace;
//!
//! let ws = MemoryWorkspace::new();
//! let mets = MetsAttributes::new(
//!     MetsProfile::CulturalHeritage,
//!     "12345678-1234-1234-1234-123456789abc".parse().unwrap(),
//! );
//! let header = HeaderAttributes {
//!     create_date: MetsDate::now(),
//!     last_mod_date: None,
//!     record_status: RecordStatus::Submission,
//! };
//! let agents = Agents::organization("Example Archive");
//!
//! let doc = compile(&ws, &mets, &header, &agents).unwrap();
//! assert_eq!(doc.root.name.local, "mets");
//! ```

pub mod housekeeping;
pub mod merge;

use thiserror::Error;

use crate::core::config::DEFAULT_SCHEMA_VERSION;
use crate::core::paths::METS_FILE;
use crate::core::references::ReferenceError;
use crate::core::types::{ContractId, MetsDate, MetsProfile, RecordStatus, ValidationError};
use crate::mets::elements::{self, AgentKind};
use crate::mets::FragmentError;
use crate::workspace::{WorkspaceError, WorkspaceStore};
use crate::xml::{namespaces, Document, Element, Name, XmlError};

pub use merge::{merge_fragments, MergedSections};

const SCHEMA_LOCATION: &str =
    "http://www.loc.gov/METS/ http://digitalpreservation.fi/schemas/mets/mets.xsd";

/// Errors from compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An object listed for copying does not exist under the base path.
    #[error("object not found: {path}")]
    MissingObject { path: String },

    /// Copying an object into the workspace failed.
    #[error("failed to copy '{path}': {source}")]
    Copy {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Fragment(#[from] FragmentError),

    #[error(transparent)]
    References(#[from] ReferenceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// Attributes of the METS root element.
#[derive(Debug, Clone)]
pub struct MetsAttributes {
    pub profile: MetsProfile,
    pub objid: String,
    pub label: Option<String>,
    pub contentid: Option<String>,
    pub contractid: ContractId,
    pub catalog_version: String,
    pub specification_version: String,
}

impl MetsAttributes {
    /// Attributes with a fresh random OBJID and default schema versions.
    pub fn new(profile: MetsProfile, contractid: ContractId) -> Self {
        Self {
            profile,
            objid: uuid::Uuid::new_v4().to_string(),
            label: None,
            contentid: None,
            contractid,
            catalog_version: DEFAULT_SCHEMA_VERSION.to_string(),
            specification_version: DEFAULT_SCHEMA_VERSION.to_string(),
        }
    }

    fn apply(&self, root: &mut Element) {
        root.set_attr(Name::local("PROFILE"), self.profile.uri());
        root.set_attr(Name::local("OBJID"), self.objid.as_str());
        root.set_opt_attr("LABEL", self.label.as_deref());
        root.set_attr(Name::new(Some(namespaces::FI), "CATALOG"), self.catalog_version.as_str());
        root.set_attr(
            Name::new(Some(namespaces::FI), "SPECIFICATION"),
            self.specification_version.as_str(),
        );
        if let Some(contentid) = &self.contentid {
            root.set_attr(Name::new(Some(namespaces::FI), "CONTENTID"), contentid.as_str());
        }
        root.set_attr(
            Name::new(Some(namespaces::FI), "CONTRACTID"),
            self.contractid.urn(),
        );
        root.set_attr(Name::new(Some(namespaces::XSI), "schemaLocation"), SCHEMA_LOCATION);
    }
}

/// Header dates and status.
#[derive(Debug, Clone)]
pub struct HeaderAttributes {
    pub create_date: MetsDate,
    pub last_mod_date: Option<MetsDate>,
    pub record_status: RecordStatus,
}

/// Who created the package.
#[derive(Debug, Clone)]
pub struct Agents {
    pub organization: String,
    pub packaging_service: Option<String>,
}

impl Agents {
    /// An organization that created the package itself.
    pub fn organization(name: impl Into<String>) -> Self {
        Self {
            organization: name.into(),
            packaging_service: None,
        }
    }

    /// Agent elements, archivist or creator first.
    ///
    /// With a packaging service, the organization is the archivist and
    /// the service the creating software.
    fn elements(&self) -> Vec<Element> {
        match &self.packaging_service {
            Some(service) => vec![
                elements::agent(AgentKind::Archivist, &self.organization),
                elements::agent(AgentKind::Software, service),
            ],
            None => vec![elements::agent(AgentKind::Creator, &self.organization)],
        }
    }
}

/// Build the METS root around already merged sections.
pub fn create_mets(
    merged: MergedSections,
    mets: &MetsAttributes,
    header: &HeaderAttributes,
    agents: &Agents,
) -> Document {
    let mut root = Element::mets("mets");
    mets.apply(&mut root);

    root.push(elements::mets_hdr(
        header.create_date.as_str(),
        header.last_mod_date.as_ref().map(MetsDate::as_str),
        header.record_status.as_str(),
        agents.elements(),
    ));
    for section in merged.sections {
        root.push(section);
    }

    Document {
        root,
        namespaces: merged.namespaces,
    }
}

/// Merge all workspace fragments into a compiled document.
pub fn compile(
    ws: &dyn WorkspaceStore,
    mets: &MetsAttributes,
    header: &HeaderAttributes,
    agents: &Agents,
) -> Result<Document, CompileError> {
    let merged = merge_fragments(ws)?;
    tracing::debug!(
        fragments = merged.fragments.len(),
        sections = merged.sections.len(),
        "merged fragments"
    );
    Ok(create_mets(merged, mets, header, agents))
}

/// Serialize `doc` and store it as `mets.xml`. Returns the XML text.
pub fn write_document(ws: &dyn WorkspaceStore, doc: &Document) -> Result<String, CompileError> {
    let xml = doc.to_xml_string()?;
    ws.write(METS_FILE, &xml)?;
    Ok(xml)
}
