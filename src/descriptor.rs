//! Record and field descriptors
//!
//! Descriptors are the normalized view of host record types: an ordered list
//! of fields, each with its annotation string and host type name. They are
//! produced outside the compiler (by a host-introspection step) and usually
//! arrive as JSON:
//!
//! ```json
//! {
//!   "name": "User",
//!   "fields": [
//!     { "name": "id", "type": "i64", "tag": "required;min=1", "label": "ID" },
//!     { "name": "name", "type": "String", "tag": "required" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::codegen::names::is_keyword;
use crate::error::{Result, ValgenError};
use crate::value::TypeClass;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Path segments that cannot be written even as raw identifiers
const UNESCAPABLE: &[&str] = &["self", "Self", "super", "crate", "_"];

/// A single field of a host record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field identifier on the host struct
    pub name: String,

    /// Raw annotation string, e.g. `required;min=1`
    #[serde(default)]
    pub tag: String,

    /// Host type name, e.g. `u32` or `String`
    #[serde(rename = "type")]
    pub ty: String,

    /// Name used in failure messages (defaults to `name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, tag: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            ty: ty.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Name shown in messages
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Fields tagged `""` or `-` carry no rules
    pub fn is_annotated(&self) -> bool {
        let tag = self.tag.trim();
        !tag.is_empty() && tag != "-"
    }

    pub fn class(&self) -> Option<TypeClass> {
        TypeClass::from_host_type(&self.ty)
    }
}

/// A host record type and its fields in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check that the record and field names can be emitted as Rust code.
    ///
    /// The record name becomes a type path, so it must be a plain identifier.
    /// Field names are dotted paths whose segments may be keywords (they are
    /// emitted raw) but not `self`, `super` and friends.
    pub fn validate(&self) -> Result<()> {
        if !IDENT_RE.is_match(&self.name) || is_keyword(&self.name) || UNESCAPABLE.contains(&self.name.as_str()) {
            return Err(ValgenError::InvalidDescriptors(format!(
                "record name `{}` is not a Rust identifier",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            let valid = field
                .name
                .split('.')
                .all(|segment| IDENT_RE.is_match(segment) && !UNESCAPABLE.contains(&segment));
            if !valid {
                return Err(ValgenError::InvalidDescriptors(format!(
                    "{}: field name `{}` is not a Rust field path",
                    self.name, field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ValgenError::InvalidDescriptors(format!(
                    "{}: duplicate field `{}`",
                    self.name, field.name
                )));
            }
        }
        Ok(())
    }
}

/// Validate every record and reject duplicate record names
pub fn validate_records(records: &[RecordDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for record in records {
        record.validate()?;
        if !seen.insert(record.name.as_str()) {
            return Err(ValgenError::InvalidDescriptors(format!(
                "duplicate record `{}`",
                record.name
            )));
        }
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorFile {
    Many(Vec<RecordDescriptor>),
    One(RecordDescriptor),
}

/// Parse descriptors from JSON text holding one record or an array of records
pub fn parse_records(content: &str) -> Result<Vec<RecordDescriptor>> {
    let records = match serde_json::from_str(content)? {
        DescriptorFile::Many(records) => records,
        DescriptorFile::One(record) => vec![record],
    };
    Ok(records)
}

/// Load descriptors from a JSON file, or from every `*.json` file under a directory.
///
/// Directory entries are visited in file-name order so the record order, and
/// therefore the generated output, is stable.
pub fn load_records(path: &Path) -> Result<Vec<RecordDescriptor>> {
    if path.is_file() {
        let content = fs::read_to_string(path)?;
        return parse_records(&content);
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| ValgenError::InvalidDescriptors(e.to_string()))?;
        let is_json = entry.path().extension().and_then(|e| e.to_str()) == Some("json");
        if entry.file_type().is_file() && is_json {
            tracing::debug!(path = %entry.path().display(), "loading descriptors");
            let content = fs::read_to_string(entry.path())?;
            records.extend(parse_records(&content)?);
        }
    }
    Ok(records)
}

/// Keep only the named record types, in the order they were requested
pub fn select_records(records: Vec<RecordDescriptor>, names: &[String]) -> Result<Vec<RecordDescriptor>> {
    if names.is_empty() {
        return Ok(records);
    }
    names
        .iter()
        .map(|name| {
            records
                .iter()
                .find(|r| &r.name == name)
                .cloned()
                .ok_or_else(|| ValgenError::InvalidDescriptors(format!("no record named {}", name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_single_and_many() {
        let one = r#"{"name": "User", "fields": [{"name": "id", "type": "i64", "tag": "required"}]}"#;
        let records = parse_records(one).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields[0].class(), Some(TypeClass::SignedInteger));

        let many = r#"[{"name": "A", "fields": []}, {"name": "B", "fields": []}]"#;
        let records = parse_records(many).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "B");
    }

    #[test]
    fn test_annotation_and_label() {
        let f = FieldDescriptor::new("id6", "-", "String");
        assert!(!f.is_annotated());
        assert_eq!(f.display_name(), "id6");

        let f = FieldDescriptor::new("id", "required", "i64").with_label("ID");
        assert!(f.is_annotated());
        assert_eq!(f.display_name(), "ID");
    }

    #[test]
    fn test_load_directory_in_name_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"name": "B", "fields": []}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"name": "A", "fields": []}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = load_records(dir.path()).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_select_records() {
        let records = vec![RecordDescriptor::new("A"), RecordDescriptor::new("B")];
        let picked = select_records(records.clone(), &["B".to_string()]).unwrap();
        assert_eq!(picked[0].name, "B");
        assert!(select_records(records, &["C".to_string()]).is_err());
    }

    fn assert_rejected(records: &[RecordDescriptor], needle: &str) {
        match validate_records(records) {
            Err(ValgenError::InvalidDescriptors(reason)) => assert!(reason.contains(needle), "{}", reason),
            other => panic!("expected InvalidDescriptors, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_accepts_nested_and_keyword_fields() {
        let record = RecordDescriptor::new("Token")
            .with_field(FieldDescriptor::new("type", "required", "String"))
            .with_field(FieldDescriptor::new("ident.id", "", "i64"))
            .with_field(FieldDescriptor::new("_raw", "", "u8"));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_record_names() {
        assert_rejected(&[RecordDescriptor::new("User Account")], "record name `User Account`");
        assert_rejected(&[RecordDescriptor::new("1User")], "record name `1User`");
        assert_rejected(&[RecordDescriptor::new("struct")], "record name `struct`");
        assert_rejected(&[RecordDescriptor::new("Self")], "record name `Self`");
    }

    #[test]
    fn test_validate_rejects_bad_field_names() {
        let hyphen = RecordDescriptor::new("User").with_field(FieldDescriptor::new("first-name", "", "String"));
        assert_rejected(&[hyphen], "field name `first-name`");

        let empty_segment = RecordDescriptor::new("User").with_field(FieldDescriptor::new("ident..id", "", "i64"));
        assert_rejected(&[empty_segment], "field name `ident..id`");

        let self_segment = RecordDescriptor::new("User").with_field(FieldDescriptor::new("self", "", "i64"));
        assert_rejected(&[self_segment], "field name `self`");
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let fields = RecordDescriptor::new("User")
            .with_field(FieldDescriptor::new("id", "required", "i64"))
            .with_field(FieldDescriptor::new("id", "min=1", "i64"));
        assert_rejected(&[fields], "duplicate field `id`");

        let records = vec![RecordDescriptor::new("User"), RecordDescriptor::new("User")];
        assert_rejected(&records, "duplicate record `User`");
    }
}
