//! Checksums tying generated output to the descriptors it came from

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::descriptor::RecordDescriptor;
use crate::error::Result;

/// Header line prefix carrying the input checksum in generated files
pub const HEADER_PREFIX: &str = "// Source checksum: sha256:";

/// SHA256 checksum of generator input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a string
    pub fn from_text(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Checksum of the records' canonical JSON form
    pub fn of_records(records: &[RecordDescriptor]) -> Result<Self> {
        let canonical = serde_json::to_string(records)?;
        Ok(Self::from_text(&canonical))
    }

    /// Read the checksum back out of a generated file's header
    pub fn from_header(source: &str) -> Option<Self> {
        source
            .lines()
            .take(4)
            .find_map(|line| line.strip_prefix(HEADER_PREFIX))
            .map(|hex| Self(hex.trim().to_string()))
    }

    /// Header line for generated output
    pub fn header_line(&self) -> String {
        format!("{}{}", HEADER_PREFIX, self.0)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldDescriptor;

    #[test]
    fn test_checksum_consistency() {
        let records = vec![RecordDescriptor::new("User").with_field(FieldDescriptor::new("id", "required", "i64"))];
        assert_eq!(Checksum::of_records(&records).unwrap(), Checksum::of_records(&records).unwrap());
    }

    #[test]
    fn test_checksum_tracks_annotations() {
        let a = vec![RecordDescriptor::new("User").with_field(FieldDescriptor::new("id", "required", "i64"))];
        let b = vec![RecordDescriptor::new("User").with_field(FieldDescriptor::new("id", "min=1", "i64"))];
        assert_ne!(Checksum::of_records(&a).unwrap(), Checksum::of_records(&b).unwrap());
    }

    #[test]
    fn test_header_roundtrip() {
        let checksum = Checksum::from_text("content");
        let source = format!("// Code generated by valgen; DO NOT EDIT.\n{}\n\nfn x() {{}}\n", checksum.header_line());
        assert_eq!(Checksum::from_header(&source), Some(checksum));
        assert_eq!(Checksum::from_header("fn x() {}"), None);
    }
}
