//! Identifier resolution for emitted code
//!
//! Every helper the generator emits carries a configurable prefix so several
//! generated units can live next to hand-written code without collisions:
//! functions get `<prefix>_`, types get the PascalCase prefix.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ValgenError};
use crate::rule::SchemaRule;

static PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*$").expect("valid prefix pattern"));

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct",
    "trait", "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Resolves the names of emitted items
#[derive(Debug, Clone)]
pub struct Names {
    prefix: String,
    type_prefix: String,
}

impl Names {
    /// `prefix` must be lower-case alphanumeric, starting with a letter
    pub fn new(prefix: &str) -> Result<Self> {
        if !PREFIX_RE.is_match(prefix) {
            return Err(ValgenError::InvalidPrefix(prefix.to_string()));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            type_prefix: to_pascal_case(prefix),
        })
    }

    /// `vg_required_i64`
    pub fn function(&self, base: &str) -> String {
        format!("{}_{}", self.prefix, base)
    }

    /// `VgRulePresence`
    pub fn type_name(&self, base: &str) -> String {
        format!("{}{}", self.type_prefix, base)
    }

    /// Validator function implementing a rule
    pub fn validator(&self, rule: &SchemaRule) -> String {
        self.function(&rule.func_name())
    }

    /// Generated schema type for a record
    pub fn schema(&self, record: &str) -> String {
        format!("{}Schema", record)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn type_prefix(&self) -> &str {
        &self.type_prefix
    }
}

/// Reserved word that needs `r#` to be used as an identifier
pub(crate) fn is_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

/// Field access path; `ident.id` reaches into a nested struct and keyword
/// segments are raw-escaped
pub fn field_access(receiver: &str, field: &str) -> String {
    let mut access = receiver.to_string();
    for segment in field.split('.') {
        access.push('.');
        if is_keyword(segment) {
            access.push_str("r#");
        }
        access.push_str(segment);
    }
    access
}

/// Convert to PascalCase
fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}
