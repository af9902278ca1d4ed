//! core::naming
//!
//! Identifier codec and deterministic metadata ids.
//!
//! # Features
//!
//! - Encode a logical path into a single filename-safe token and back
//! - Derive metadata-record ids from (tag, target) without shared state
//!
//! Every byte outside `A-Z a-z 0-9 _ . - ~` is percent-encoded, including
//! the path separator and `%` itself, so distinct paths never collide.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};

use super::types::{LogicalTarget, MdId, ObjectPath, ValidationError};

const PATH_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Hex characters kept from the SHA-256 digest of a metadata id.
const MD_ID_HEX_LEN: usize = 32;

/// Percent-encode a path into a single token.
///
/// # Example
///
/// ```
/// use sipweave::core::naming::encode_path;
///
/// assert_eq!(encode_path("tests/testpath"), "tests%2Ftestpath");
/// assert_eq!(encode_path("tästs/tøstpath"), "t%C3%A4sts%2Ft%C3%B8stpath");
/// ```
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ESCAPE).to_string()
}

/// Percent-encode a path and wrap it in an unescaped prefix and suffix.
///
/// # Example
///
/// ```
/// use sipweave::core::naming::encode_path_with;
///
/// assert_eq!(
///     encode_path_with("tests/testpath", "testprefix-", "-testsuffix"),
///     "testprefix-tests%2Ftestpath-testsuffix"
/// );
/// ```
pub fn encode_path_with(path: &str, prefix: &str, suffix: &str) -> String {
    format!("{}{}{}", prefix, encode_path(path), suffix)
}

/// Strip `suffix` (if present) and percent-decode the remainder.
///
/// # Errors
///
/// Returns `ValidationError::InvalidValue` if the decoded bytes are not UTF-8.
pub fn decode_path(id: &str, suffix: &str) -> Result<String, ValidationError> {
    let encoded = id.strip_suffix(suffix).unwrap_or(id);
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ValidationError::InvalidValue(format!("cannot decode '{}': {}", id, e)))
}

/// Derive the metadata-record id for `tag` describing `target`.
///
/// The id is a pure function of its inputs, so stages running in
/// separate processes compute identical ids for the same record.
///
/// # Example
///
/// ```
/// use sipweave::core::naming::metadata_id;
/// use sipweave::core::types::{LogicalTarget, ObjectPath};
///
/// let target = LogicalTarget::File(ObjectPath::new("data/a.txt").unwrap());
/// let first = metadata_id("techMD:NISOIMG", &target);
/// let second = metadata_id("techMD:NISOIMG", &target);
/// assert_eq!(first, second);
/// assert!(first.as_str().starts_with('_'));
/// ```
pub fn metadata_id(tag: &str, target: &LogicalTarget) -> MdId {
    let mut hasher = Sha256::new();
    hasher.update(tag.as_bytes());
    hasher.update([0x1f]);
    hasher.update(target.key().as_bytes());
    let digest = hex::encode(hasher.finalize());
    MdId::from_digest(&digest[..MD_ID_HEX_LEN])
}

/// Id of the descriptive record attached to directory `dir`.
pub fn descriptive_id(dir: &ObjectPath) -> MdId {
    metadata_id("dmdSec", &LogicalTarget::Directory(dir.clone()))
}
