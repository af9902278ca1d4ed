//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ObjectPath`] - Normalized logical path of a packaged object or directory
//! - [`LogicalTarget`] - What a metadata record describes (file, stream, directory)
//! - [`MdId`] - Deterministic metadata-record identifier
//! - [`FileId`] - Opaque fileSec entry identifier
//! - [`MetadataCategory`] - Kind of metadata section
//! - [`MetsProfile`], [`RecordStatus`], [`ContractId`], [`MetsDate`], [`StructmapType`]
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so invalid enumerated options surface as a
//! [`ValidationError`] before any fragment is read or written.
//!
//! # Examples
//!
//! ```
//! use sipweave::core::types::{ObjectPath, MetsProfile};
//!
//! let path = ObjectPath::new("./data//images/a.tif").unwrap();
//! assert_eq!(path.as_str(), "data/images/a.tif");
//!
//! assert!("ch".parse::<MetsProfile>().is_ok());
//! assert!("nope".parse::<MetsProfile>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::naming::encode_path;

/// Errors from value validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid {kind} '{value}', must be one of: {allowed}")]
    InvalidChoice {
        kind: &'static str,
        value: String,
        allowed: String,
    },

    #[error("invalid identifier '{0}'")]
    InvalidId(String),

    #[error("invalid contract id '{0}': expected a UUID")]
    InvalidContractId(String),

    #[error("invalid date '{0}': expected yyyy-mm-ddThh:mm:ss")]
    InvalidDate(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn invalid_choice(kind: &'static str, value: &str, allowed: &[&str]) -> ValidationError {
    ValidationError::InvalidChoice {
        kind,
        value: value.to_string(),
        allowed: allowed.join(", "),
    }
}

/// A normalized, relative logical path.
///
/// Normalization splits on `/`, drops empty and `.` segments, resolves
/// `..` and strips any leading `/`. A path that would escape the package
/// root is rejected. The package root itself is represented as `.`.
///
/// # Example
///
/// ```
/// use sipweave::core::types::ObjectPath;
///
/// assert_eq!(ObjectPath::new("/a/./b/../c.txt").unwrap().as_str(), "a/c.txt");
/// assert!(ObjectPath::new("").unwrap().is_root());
/// assert!(ObjectPath::new("../outside").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Segment separator of logical paths.
    pub const SEPARATOR: char = '/';

    const ROOT: &'static str = ".";

    /// Create a new normalized path.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPath` if the path escapes the root
    /// or contains control characters.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = path.as_ref();
        if raw.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidPath {
                path: raw.to_string(),
                reason: "contains control characters".into(),
            });
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.split(Self::SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(ValidationError::InvalidPath {
                            path: raw.to_string(),
                            reason: "escapes the package root".into(),
                        });
                    }
                }
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            Ok(Self::root())
        } else {
            Ok(Self(segments.join("/")))
        }
    }

    /// The package root directory (`.`).
    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    /// Check if this is the package root.
    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    /// Iterate over path segments. The root has no segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        let inner = if self.is_root() { "" } else { self.0.as_str() };
        inner.split(Self::SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments in the path.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Append a single segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.is_root() {
            Self(segment.to_string())
        } else {
            Self(format!("{}/{}", self.0, segment))
        }
    }

    /// Last segment, or `.` for the root.
    pub fn file_name(&self) -> &str {
        self.0.rsplit(Self::SEPARATOR).next().unwrap_or(Self::ROOT)
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectPath {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ObjectPath> for String {
    fn from(path: ObjectPath) -> Self {
        path.0
    }
}

impl FromStr for ObjectPath {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The thing a metadata record describes.
///
/// Identity is the normalized path, plus the stream index for streams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalTarget {
    File(ObjectPath),
    FileStream(ObjectPath, u32),
    Directory(ObjectPath),
}

impl LogicalTarget {
    /// Stable textual key used when deriving metadata ids.
    ///
    /// # Example
    ///
    /// ```
    /// use sipweave::core::types::{LogicalTarget, ObjectPath};
    ///
    /// let path = ObjectPath::new("x/y.txt").unwrap();
    /// assert_eq!(LogicalTarget::File(path.clone()).key(), "file:x%2Fy.txt");
    /// assert_eq!(LogicalTarget::FileStream(path, 2).key(), "stream:x%2Fy.txt:2");
    /// ```
    pub fn key(&self) -> String {
        match self {
            LogicalTarget::File(path) => format!("file:{}", encode_path(path.as_str())),
            LogicalTarget::FileStream(path, index) => {
                format!("stream:{}:{}", encode_path(path.as_str()), index)
            }
            LogicalTarget::Directory(path) => {
                format!("directory:{}", encode_path(path.as_str()))
            }
        }
    }

    /// The path component of the target.
    pub fn path(&self) -> &ObjectPath {
        match self {
            LogicalTarget::File(path)
            | LogicalTarget::FileStream(path, _)
            | LogicalTarget::Directory(path) => path,
        }
    }
}

impl fmt::Display for LogicalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalTarget::File(path) => write!(f, "file {}", path),
            LogicalTarget::FileStream(path, index) => write!(f, "file {} stream {}", path, index),
            LogicalTarget::Directory(path) => write!(f, "directory {}", path),
        }
    }
}

/// A metadata-record identifier.
///
/// Metadata ids are deterministic (see [`crate::core::naming::metadata_id`]),
/// which lets independent stages agree on them without coordination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MdId(String);

impl MdId {
    /// Wrap an existing id, e.g. one read from a reference table.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidId` for empty ids or ids with whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidId(id));
        }
        Ok(Self(id))
    }

    pub(crate) fn from_digest(hex_digest: &str) -> Self {
        Self(format!("_{}", hex_digest))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id without its leading underscore, as used in fragment filenames.
    pub fn bare(&self) -> &str {
        self.0.strip_prefix('_').unwrap_or(&self.0)
    }
}

impl fmt::Display for MdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque fileSec entry identifier.
///
/// File ids need no cross-run agreement, so they are random.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(String);

impl FileId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(format!("_{}", uuid::Uuid::new_v4()))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of metadata section a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataCategory {
    Descriptive,
    Technical,
    Rights,
    Source,
    Provenance,
}

impl MetadataCategory {
    /// Categories whose records live in amdSec and have reference tables.
    pub const ADMINISTRATIVE: [MetadataCategory; 4] = [
        MetadataCategory::Technical,
        MetadataCategory::Rights,
        MetadataCategory::Source,
        MetadataCategory::Provenance,
    ];

    const NAMES: [&'static str; 5] = ["dmd", "tech", "rights", "source", "digiprov"];

    /// Canonical short name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataCategory::Descriptive => "dmd",
            MetadataCategory::Technical => "tech",
            MetadataCategory::Rights => "rights",
            MetadataCategory::Source => "source",
            MetadataCategory::Provenance => "digiprov",
        }
    }

    /// Local name of the METS element holding a record of this category.
    pub fn section_element(&self) -> &'static str {
        match self {
            MetadataCategory::Descriptive => "dmdSec",
            MetadataCategory::Technical => "techMD",
            MetadataCategory::Rights => "rightsMD",
            MetadataCategory::Source => "sourceMD",
            MetadataCategory::Provenance => "digiprovMD",
        }
    }

    /// Whether records of this category go into an amdSec.
    pub fn is_administrative(&self) -> bool {
        !matches!(self, MetadataCategory::Descriptive)
    }
}

impl FromStr for MetadataCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dmd" | "descriptive" | "dmdsec" => Ok(MetadataCategory::Descriptive),
            "tech" | "technical" | "techmd" => Ok(MetadataCategory::Technical),
            "rights" | "rightsmd" => Ok(MetadataCategory::Rights),
            "source" | "sourcemd" => Ok(MetadataCategory::Source),
            "digiprov" | "provenance" | "digiprovmd" => Ok(MetadataCategory::Provenance),
            _ => Err(invalid_choice("metadata section", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for MetadataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// METS profile of the compiled document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetsProfile {
    CulturalHeritage,
    ResearchData,
}

impl MetsProfile {
    const NAMES: [&'static str; 2] = ["ch", "tpas"];

    /// Profile URI written to the PROFILE attribute.
    pub fn uri(&self) -> &'static str {
        match self {
            MetsProfile::CulturalHeritage => {
                "http://digitalpreservation.fi/mets-profiles/cultural-heritage"
            }
            MetsProfile::ResearchData => "http://digitalpreservation.fi/mets-profiles/research-data",
        }
    }
}

impl FromStr for MetsProfile {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ch" => Ok(MetsProfile::CulturalHeritage),
            "tpas" => Ok(MetsProfile::ResearchData),
            _ => Err(invalid_choice("METS profile", s, &Self::NAMES)),
        }
    }
}

/// Record status written to the METS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordStatus {
    #[default]
    Submission,
    Update,
    Dissemination,
}

impl RecordStatus {
    const NAMES: [&'static str; 3] = ["submission", "update", "dissemination"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Submission => "submission",
            RecordStatus::Update => "update",
            RecordStatus::Dissemination => "dissemination",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submission" => Ok(RecordStatus::Submission),
            "update" => Ok(RecordStatus::Update),
            "dissemination" => Ok(RecordStatus::Dissemination),
            _ => Err(invalid_choice("record status", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Contract identifier given by the preservation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractId(uuid::Uuid);

impl ContractId {
    /// URN form written to the document.
    pub fn urn(&self) -> String {
        format!("urn:uuid:{}", self.0.hyphenated())
    }
}

impl FromStr for ContractId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("urn:uuid:").unwrap_or(s);
        uuid::Uuid::parse_str(raw)
            .map(ContractId)
            .map_err(|_| ValidationError::InvalidContractId(s.to_string()))
    }
}

/// A header date (`yyyy-mm-ddThh:mm:ss`, optional fraction and offset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetsDate(String);

impl MetsDate {
    /// The current moment in UTC, without fractional seconds.
    pub fn now() -> Self {
        Self(chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MetsDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = chrono::DateTime::parse_from_rfc3339(s).is_ok()
            || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok();
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::InvalidDate(s.to_string()))
        }
    }
}

impl fmt::Display for MetsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// TYPE attribute of a structural map, which also selects the strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructmapType(String);

impl StructmapType {
    /// Archival-description-driven structural map.
    pub const EAD3_LOGICAL: &'static str = "EAD3-logical";
    /// Directory-driven map whose divs are all typed `directory`.
    pub const DIRECTORY_PHYSICAL: &'static str = "Directory-physical";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidValue(
                "structmap type cannot be empty".into(),
            ));
        }
        Ok(Self(value))
    }

    pub fn is_ead3_logical(&self) -> bool {
        self.0 == Self::EAD3_LOGICAL
    }

    pub fn is_directory_physical(&self) -> bool {
        self.0 == Self::DIRECTORY_PHYSICAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StructmapType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
