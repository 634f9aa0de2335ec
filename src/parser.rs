//! Rule lexer and parser
//!
//! Splits each field's annotation on `;` and classifies every token into a
//! [`SchemaRule`]. Classification is structural:
//!
//! | token                  | kind            |
//! |------------------------|-----------------|
//! | `name`                 | Presence (or ValueConstraint for shorthand names like `email`) |
//! | `name=min,max`         | Range           |
//! | `name:field`           | Conditional     |
//! | `name:field=literal`   | Conditional     |
//! | `name=operand`         | ValueConstraint |
//!
//! A `:` anywhere in the token makes it conditional, taking priority over `=`,
//! so `required_if:Name=John` splits at the colon. A pattern holding a colon
//! (`regexp=^a:b$`) therefore names the unknown rule `regexp=^a` and is
//! rejected. Any malformed token aborts the whole run.

use std::collections::BTreeSet;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use regex::Regex;
use tracing::debug;

use crate::descriptor::{validate_records, FieldDescriptor, RecordDescriptor};
use crate::error::{Result, ValgenError};
use crate::rule::{expected_kind, is_shorthand_constraint, FieldRef, Projection, RuleKind, Schema, SchemaRule, RULES};
use crate::value::{coerce, coerce_lenient, TypeClass, Value};

/// Parser behaviour switches
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Default malformed numeric operands to zero instead of failing
    pub lenient_numeric_operands: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Colon,
    Equals,
}

/// A rule token split at its family separator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub name: &'a str,
    separator: Option<Separator>,
    pub rhs: &'a str,
}

impl<'a> Token<'a> {
    pub fn split(token: &'a str) -> Self {
        let colon = token.find(':');
        let equals = token.find('=');
        let (idx, separator) = match (colon, equals) {
            (Some(c), _) => (c, Separator::Colon),
            (None, Some(e)) => (e, Separator::Equals),
            (None, None) => {
                return Self {
                    name: token,
                    separator: None,
                    rhs: "",
                }
            }
        };
        Self {
            name: &token[..idx],
            separator: Some(separator),
            rhs: &token[idx + 1..],
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self.separator {
            None if is_shorthand_constraint(self.name) => RuleKind::ValueConstraint,
            None => RuleKind::Presence,
            Some(_) if self.rhs.contains(',') => RuleKind::Range,
            Some(Separator::Colon) => RuleKind::Conditional,
            Some(Separator::Equals) => RuleKind::ValueConstraint,
        }
    }
}

/// Classify a single rule token by structure alone
pub fn classify(token: &str) -> RuleKind {
    Token::split(token.trim()).kind()
}

/// Parse every record, failing on the first malformed token
pub fn parse_schemas(records: &[RecordDescriptor], options: &ParseOptions) -> Result<Vec<Schema>> {
    validate_records(records)?;
    records.iter().map(|record| parse_schema(record, options)).collect()
}

/// Parse one record's annotations into a [`Schema`]
pub fn parse_schema(record: &RecordDescriptor, options: &ParseOptions) -> Result<Schema> {
    record.validate()?;
    let parser = RuleParser { record, options };
    let mut rules = Vec::new();
    let mut validators = BTreeSet::new();

    for field in record.fields.iter().filter(|f| f.is_annotated()) {
        for token in field.tag.split(';') {
            let rule = parser.parse_rule(field, token)?;
            debug!(
                record = %record.name,
                field = %field.name,
                rule = %rule.name,
                kind = ?rule.kind,
                "parsed rule"
            );
            validators.insert(rule.name.clone());
            rules.push(rule);
        }
    }

    Ok(Schema {
        record: record.name.clone(),
        rules,
        validators,
    })
}

struct RuleParser<'a> {
    record: &'a RecordDescriptor,
    options: &'a ParseOptions,
}

impl RuleParser<'_> {
    fn parse_rule(&self, field: &FieldDescriptor, raw: &str) -> Result<SchemaRule> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(self.invalid(field, raw, "empty rule"));
        }

        let token = Token::split(text);
        if token.name.is_empty() {
            return Err(self.invalid(field, text, "missing rule name"));
        }
        let kind = token.kind();
        self.check_registry(field, text, token.name, kind)?;

        let class = self.field_class(field)?;
        let field1 = field_ref(field, class);
        match kind {
            RuleKind::Presence => Ok(SchemaRule {
                name: token.name.to_string(),
                kind,
                field1,
                field2: None,
                cond1: None,
                cond2: None,
                resolved: Some(class),
                projection: Projection::Cast,
            }),
            RuleKind::ValueConstraint => self.value_constraint(field, text, &token, class),
            RuleKind::Range => self.range(field, text, &token, class),
            RuleKind::Conditional => self.conditional(field, text, &token, class),
        }
    }

    fn value_constraint(
        &self,
        field: &FieldDescriptor,
        text: &str,
        token: &Token<'_>,
        class: TypeClass,
    ) -> Result<SchemaRule> {
        let mut rule = SchemaRule {
            name: token.name.to_string(),
            kind: RuleKind::ValueConstraint,
            field1: field_ref(field, class),
            field2: None,
            cond1: None,
            cond2: None,
            resolved: Some(TypeClass::String),
            projection: Projection::Display,
        };

        // Shorthand constraints ignore any operand
        if is_shorthand_constraint(token.name) {
            return Ok(rule);
        }
        if token.rhs.is_empty() {
            return Err(self.invalid(field, text, "missing operand"));
        }

        match token.name {
            "regexp" => {
                if let Err(err) = Regex::new(token.rhs) {
                    return Err(self.invalid(field, text, format!("invalid pattern: {}", err)));
                }
                rule.cond1 = Some(Value::string(token.rhs));
            }
            "size" => {
                rule.resolved = Some(TypeClass::UnsignedInteger);
                rule.projection = Projection::DecimalLength;
                rule.cond1 = Some(self.operand(field, text, TypeClass::UnsignedInteger, token.rhs)?);
            }
            _ => {
                let (resolved, projection) = self.measured(field, text, token.name, class)?;
                rule.resolved = Some(resolved);
                rule.projection = projection;
                rule.cond1 = Some(self.operand(field, text, resolved, token.rhs)?);
            }
        }
        Ok(rule)
    }

    fn range(&self, field: &FieldDescriptor, text: &str, token: &Token<'_>, class: TypeClass) -> Result<SchemaRule> {
        let (min, max) = token.rhs.split_once(',').unwrap_or((token.rhs, ""));
        if min.is_empty() || max.is_empty() {
            return Err(self.invalid(field, text, "range needs both a minimum and a maximum"));
        }
        let (resolved, projection) = self.measured(field, text, token.name, class)?;

        // Declared order is kept even when min > max
        Ok(SchemaRule {
            name: token.name.to_string(),
            kind: RuleKind::Range,
            field1: field_ref(field, class),
            field2: None,
            cond1: Some(self.operand(field, text, resolved, min)?),
            cond2: Some(self.operand(field, text, resolved, max)?),
            resolved: Some(resolved),
            projection,
        })
    }

    fn conditional(
        &self,
        field: &FieldDescriptor,
        text: &str,
        token: &Token<'_>,
        class: TypeClass,
    ) -> Result<SchemaRule> {
        let (dependent, literal) = match token.rhs.split_once('=') {
            Some((dependent, literal)) => (dependent, Some(literal)),
            None => (token.rhs, None),
        };
        if dependent.is_empty() {
            return Err(self.invalid(field, text, "missing dependent field"));
        }
        let other = self
            .record
            .field(dependent)
            .ok_or_else(|| self.invalid(field, text, format!("references unknown field `{}`", dependent)))?;

        // The literal is compared against the dependent field's stringified value
        let dependent_class = self.field_class(other)?;
        let cond1 = literal
            .map(|lit| self.operand(field, text, dependent_class, lit))
            .transpose()?;

        Ok(SchemaRule {
            name: token.name.to_string(),
            kind: RuleKind::Conditional,
            field1: field_ref(field, class),
            field2: Some(field_ref(other, dependent_class)),
            cond1,
            cond2: None,
            resolved: None,
            projection: Projection::Display,
        })
    }

    /// Comparison type for ordering rules: numbers compare directly, strings by length.
    ///
    /// `f32` fields are re-read through their shortest decimal form so that
    /// `max=0.1` holds for a field storing `0.1f32`.
    fn measured(
        &self,
        field: &FieldDescriptor,
        text: &str,
        name: &str,
        class: TypeClass,
    ) -> Result<(TypeClass, Projection)> {
        match class {
            TypeClass::String => Ok((TypeClass::UnsignedInteger, Projection::CharCount)),
            TypeClass::Boolean => Err(self.invalid(
                field,
                text,
                format!("`{}` does not apply to boolean fields", name),
            )),
            TypeClass::Float if field.ty.trim() == "f32" => Ok((TypeClass::Float, Projection::Decimal)),
            numeric => Ok((numeric, Projection::Cast)),
        }
    }

    fn operand(&self, field: &FieldDescriptor, text: &str, class: TypeClass, raw: &str) -> Result<Value> {
        if self.options.lenient_numeric_operands {
            return Ok(coerce_lenient(class, raw));
        }
        coerce(class, raw).map_err(|err| self.invalid(field, text, err.to_string()))
    }

    fn check_registry(&self, field: &FieldDescriptor, text: &str, name: &str, kind: RuleKind) -> Result<()> {
        match expected_kind(name) {
            None => {
                let reason = match suggest(name) {
                    Some(known) => format!("unknown rule `{}` (did you mean `{}`?)", name, known),
                    None => format!("unknown rule `{}`", name),
                };
                Err(self.invalid(field, text, reason))
            }
            Some(expected) if expected != kind => Err(self.invalid(
                field,
                text,
                format!("`{}` expects the form `{}`", name, expected.form(name)),
            )),
            Some(_) => Ok(()),
        }
    }

    fn field_class(&self, field: &FieldDescriptor) -> Result<TypeClass> {
        field.class().ok_or_else(|| ValgenError::UnsupportedFieldType {
            record: self.record.name.clone(),
            field: field.name.clone(),
            ty: field.ty.clone(),
        })
    }

    fn invalid(&self, field: &FieldDescriptor, token: &str, reason: impl Into<String>) -> ValgenError {
        ValgenError::invalid_rule(&self.record.name, &field.name, token, reason)
    }
}

fn field_ref(field: &FieldDescriptor, class: TypeClass) -> FieldRef {
    FieldRef {
        ident: field.name.clone(),
        label: field.display_name().to_string(),
        class,
    }
}

/// Closest registered rule name, if any scores
fn suggest(name: &str) -> Option<&'static str> {
    let matcher = SkimMatcherV2::default();
    RULES
        .iter()
        .filter_map(|(known, _)| matcher.fuzzy_match(known, name).map(|score| (score, *known)))
        // Ties go to the shorter name: `requird` suggests `required`, not `required_with`
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())))
        .map(|(_, known)| known)
}
