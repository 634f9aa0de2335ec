//! Valgen
//!
//! Compiles per-field validation annotations on record types into
//! self-contained Rust validation code with localized failure messages.
//!
//! ## Pipeline
//!
//! ```text
//! RecordDescriptor ──parse──▶ Schema ──generate──▶ GeneratedUnit
//!  (fields + tags)          (SchemaRules)        (Rust source)
//!                                 ▲
//!                      MessageCatalog (locale)
//! ```
//!
//! - **Parser**: splits `required;min=1;between=1,1000` into classified rules
//! - **Coercion**: types rule operands against the field's classification
//! - **Catalog**: locale-keyed message templates with placeholder rendering
//! - **Generator**: emits each validator once per unit, plus a schema type
//!   per record with a constructor and a `validate` dispatcher
//!
//! ## Example
//!
//! ```no_run
//! use valgen::{generate, FieldDescriptor, RecordDescriptor, ValgenConfig};
//!
//! let user = RecordDescriptor::new("User")
//!     .with_field(FieldDescriptor::new("id", "required;min=1", "i64").with_label("ID"));
//! let unit = generate(&[user], &ValgenConfig::default()).unwrap();
//! println!("{}", unit.source);
//! ```

pub mod catalog;
pub mod checksum;
pub mod codegen;
pub mod config;
pub mod descriptor;
pub mod drift;
pub mod error;
pub mod parser;
pub mod rule;
pub mod value;

pub use catalog::{render_template, MessageCatalog};
pub use checksum::Checksum;
pub use codegen::{generate, GeneratedUnit, Generator};
pub use config::ValgenConfig;
pub use descriptor::{load_records, parse_records, select_records, validate_records, FieldDescriptor, RecordDescriptor};
pub use drift::DriftReport;
pub use error::{Result, ValgenError};
pub use parser::{classify, parse_schema, parse_schemas, ParseOptions};
pub use rule::{RuleKind, Schema, SchemaRule};
pub use value::{coerce, TypeClass, Value};
