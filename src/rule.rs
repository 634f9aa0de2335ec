//! Rule data model
//!
//! A [`SchemaRule`] is one classified annotation token bound to a field. A
//! [`Schema`] is the ordered rule list of one record type.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value::{TypeClass, Value};

/// Structural family of a rule token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// `required`
    Presence,
    /// `min=1`, `regexp=^[0-9]*$`, `email`
    ValueConstraint,
    /// `between=1,1000`
    Range,
    /// `same:Other`, `required_if:Name=John`
    Conditional,
}

impl RuleKind {
    /// Annotation form expected for this family
    pub fn form(&self, name: &str) -> String {
        match self {
            Self::Presence => name.to_string(),
            Self::ValueConstraint => format!("{}=operand", name),
            Self::Range => format!("{}=min,max", name),
            Self::Conditional => format!("{}:field or {}:field=value", name, name),
        }
    }
}

/// Supported rule names and the family each belongs to
pub const RULES: &[(&str, RuleKind)] = &[
    ("required", RuleKind::Presence),
    ("min", RuleKind::ValueConstraint),
    ("max", RuleKind::ValueConstraint),
    ("size", RuleKind::ValueConstraint),
    ("regexp", RuleKind::ValueConstraint),
    ("email", RuleKind::ValueConstraint),
    ("between", RuleKind::Range),
    ("same", RuleKind::Conditional),
    ("different", RuleKind::Conditional),
    ("required_if", RuleKind::Conditional),
    ("required_with", RuleKind::Conditional),
    ("required_without", RuleKind::Conditional),
];

/// Value-constraint rules written without an operand
pub const SHORTHAND_CONSTRAINTS: &[&str] = &["email"];

pub fn expected_kind(name: &str) -> Option<RuleKind> {
    RULES.iter().find(|(n, _)| *n == name).map(|(_, k)| *k)
}

pub fn is_shorthand_constraint(name: &str) -> bool {
    SHORTHAND_CONSTRAINTS.contains(&name)
}

/// How a field value is projected before the validator sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Converted to the resolved type's canonical Rust type
    Cast,
    /// Character count of a string field, as `u64`
    CharCount,
    /// Character count of the stringified value, as `u64`
    DecimalLength,
    /// Narrow float widened through its shortest decimal form, as `f64`
    Decimal,
    /// Stringified value
    Display,
}

/// A field reference: host identifier, message label and type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub ident: String,
    pub label: String,
    pub class: TypeClass,
}

/// One classified rule token bound to a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRule {
    pub name: String,
    pub kind: RuleKind,
    pub field1: FieldRef,
    /// Dependent field (conditional rules only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field2: Option<FieldRef>,
    /// Operand, range minimum, or conditional literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cond1: Option<Value>,
    /// Range maximum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cond2: Option<Value>,
    /// Type the validator operates on; `None` for type-erased conditionals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<TypeClass>,
    pub projection: Projection,
}

impl SchemaRule {
    /// Deterministic validator name, also the dedup key.
    ///
    /// `(name, resolved type)` for typed rules, `name` alone for conditionals.
    pub fn func_name(&self) -> String {
        match (self.kind, self.resolved) {
            (RuleKind::Conditional, _) | (_, None) => self.name.clone(),
            (_, Some(class)) => format!("{}_{}", self.name, class.ident_fragment()),
        }
    }

    /// The validator's value type (`String` for type-erased rules)
    pub fn value_type(&self) -> TypeClass {
        self.resolved.unwrap_or(TypeClass::String)
    }
}

/// Parsed rules of one record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub record: String,
    /// Rules in declaration order
    pub rules: Vec<SchemaRule>,
    /// Distinct rule names referenced by this record
    pub validators: BTreeSet<String>,
}

impl Schema {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
