//! Fixed scaffolding emitted once per output unit
//!
//! The scaffolding declares the rule trait, one rule struct per [`RuleKind`]
//! with its validator signature, and the message renderer the validators
//! call. Conditional rules carry per-field emptiness computed from the
//! field's own type, so a string holding `"0"` or `"false"` is not empty. `$T` and `$f` stand for the type and function prefixes.
//!
//! [`RuleKind`]: crate::rule::RuleKind

use crate::checksum::Checksum;

use super::names::Names;

pub const GENERATED_MARKER: &str = "// Code generated by valgen; DO NOT EDIT.";

const SCAFFOLD: &str = r#"// presence          required               a rule without additional values
// value_constraint  max=1000               a rule with a single operand
// range             between=1,1000         a rule with a (min, max) pair
// conditional       required_if:Name=John  a rule that depends on another field
pub trait $TRule {
    fn validate(&self) -> Option<String>;
}

pub type $TPresenceValidator<T> = fn(&str, &T) -> Option<String>;
pub type $TValueConstraintValidator<T> = fn(&str, &T, &T) -> Option<String>;
pub type $TRangeValidator<T> = fn(&str, &T, &T, &T) -> Option<String>;
pub type $TConditionalValidator = fn(&str, &str, bool, &str, &str, bool, &str) -> Option<String>;

pub struct $TRulePresence<T> {
    pub field: &'static str,
    pub value: T,
    pub validator: $TPresenceValidator<T>,
}

impl<T> $TRule for $TRulePresence<T> {
    fn validate(&self) -> Option<String> {
        (self.validator)(self.field, &self.value)
    }
}

pub struct $TRuleValueConstraint<T> {
    pub field: &'static str,
    pub value: T,
    pub cond: T,
    pub validator: $TValueConstraintValidator<T>,
}

impl<T> $TRule for $TRuleValueConstraint<T> {
    fn validate(&self) -> Option<String> {
        (self.validator)(self.field, &self.value, &self.cond)
    }
}

pub struct $TRuleRange<T> {
    pub field: &'static str,
    pub value: T,
    pub min: T,
    pub max: T,
    pub validator: $TRangeValidator<T>,
}

impl<T> $TRule for $TRuleRange<T> {
    fn validate(&self) -> Option<String> {
        (self.validator)(self.field, &self.value, &self.min, &self.max)
    }
}

pub struct $TRuleConditional {
    pub field1: &'static str,
    pub field2: &'static str,
    pub value1: String,
    pub value2: String,
    /// Whether each value is its type's zero value
    pub empty1: bool,
    pub empty2: bool,
    pub cond: &'static str,
    pub validator: $TConditionalValidator,
}

impl $TRule for $TRuleConditional {
    fn validate(&self) -> Option<String> {
        (self.validator)(
            self.field1,
            self.value1.as_str(),
            self.empty1,
            self.field2,
            self.value2.as_str(),
            self.empty2,
            self.cond,
        )
    }
}

#[allow(dead_code)]
fn $f_error(key: &str, field1: &str, value1: &str, field2: &str, value2: &str) -> String {
    let mut words: Vec<&str> = Vec::new();
    for word in $f_message(key).split_whitespace() {
        if !word.starts_with(':') {
            words.push(word);
            continue;
        }
        let value = match word.trim_end_matches('.') {
            ":field" | ":field1" => field1,
            ":value" | ":value1" => value1,
            ":field2" => field2,
            ":value2" => value2,
            _ => "",
        };
        if !value.is_empty() {
            words.push(value);
        }
    }
    let mut message = words.join(" ");
    while message.ends_with('.') {
        message.pop();
    }
    message.push('.');
    message
}
"#;

/// Renders the header and scaffolding of an output unit
#[derive(Debug, Clone)]
pub struct Template<'a> {
    names: &'a Names,
    checksum: Option<&'a Checksum>,
}

impl<'a> Template<'a> {
    pub fn new(names: &'a Names) -> Self {
        Self { names, checksum: None }
    }

    pub fn with_checksum(mut self, checksum: &'a Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }

    pub fn render_header(&self, out: &mut String) {
        out.push_str(GENERATED_MARKER);
        out.push('\n');
        if let Some(checksum) = self.checksum {
            out.push_str(&checksum.header_line());
            out.push('\n');
        }
        out.push('\n');
    }

    pub fn render_scaffold(&self, out: &mut String) {
        let scaffold = SCAFFOLD
            .replace("$T", self.names.type_prefix())
            .replace("$f", self.names.prefix());
        out.push_str(&scaffold);
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold_uses_prefixes() {
        let names = Names::new("chk").unwrap();
        let mut out = String::new();
        Template::new(&names).render_scaffold(&mut out);

        assert!(out.contains("pub trait ChkRule {"));
        assert!(out.contains("pub struct ChkRuleConditional {"));
        assert!(out.contains("fn chk_error(key: &str"));
        assert!(out.contains("chk_message(key)"));
        assert!(out.contains("pub empty2: bool,"));
        assert!(!out.contains("is_empty(value: &str)"));
        assert!(!out.contains('$'));
    }

    #[test]
    fn test_header_carries_checksum() {
        let names = Names::new("vg").unwrap();
        let checksum = Checksum::from_text("input");
        let mut out = String::new();
        Template::new(&names).with_checksum(&checksum).render_header(&mut out);

        assert!(out.starts_with(GENERATED_MARKER));
        assert_eq!(Checksum::from_header(&out), Some(checksum));
    }
}
