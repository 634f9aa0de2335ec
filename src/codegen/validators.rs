//! Validator Emission
//!
//! One emitter per rule. Typed validators receive references to values of the
//! rule's resolved type; conditional validators receive stringified values
//! plus each field's emptiness so a single function serves every field type.

use crate::error::{Result, ValgenError};
use crate::rule::{RuleKind, SchemaRule};
use crate::value::TypeClass;

use super::names::Names;

// =============================================================================
// Public API
// =============================================================================

/// Emit the validator function implementing `rule`
pub fn emit_validator(output: &mut String, names: &Names, rule: &SchemaRule) -> Result<()> {
    let emitter = Emitter { names, rule };
    match (rule.kind, rule.name.as_str()) {
        (RuleKind::Presence, "required") => emitter.required(output),
        (RuleKind::ValueConstraint, "min") => emitter.compare(output, "<"),
        (RuleKind::ValueConstraint, "max") => emitter.compare(output, ">"),
        (RuleKind::ValueConstraint, "size") => emitter.compare(output, "!="),
        (RuleKind::ValueConstraint, "regexp") => emitter.regexp(output),
        (RuleKind::ValueConstraint, "email") => emitter.email(output),
        (RuleKind::Range, "between") => emitter.between(output),
        (RuleKind::Conditional, "same") => emitter.conditional(output, "value1 != value2", ConditionalArgs::Values),
        (RuleKind::Conditional, "different") => {
            emitter.conditional(output, "value1 == value2", ConditionalArgs::Values)
        }
        (RuleKind::Conditional, "required_if") => {
            emitter.conditional(output, "value2 == cond && empty1", ConditionalArgs::Cond)
        }
        (RuleKind::Conditional, "required_with") => {
            emitter.conditional(output, "!empty2 && empty1", ConditionalArgs::FieldsOnly)
        }
        (RuleKind::Conditional, "required_without") => {
            emitter.conditional(output, "empty2 && empty1", ConditionalArgs::Values)
        }
        (kind, name) => {
            return Err(ValgenError::invalid_rule(
                "",
                &rule.field1.ident,
                name,
                format!("no validator for `{}` as {:?}", name, kind),
            ))
        }
    }
    Ok(())
}

// =============================================================================
// Emitters
// =============================================================================

/// Which values a conditional passes to the message renderer
enum ConditionalArgs {
    /// `(field1, value1, field2, value2)`
    Values,
    /// `(field1, "", field2, cond)`
    Cond,
    /// `(field1, "", field2, "")`
    FieldsOnly,
}

struct Emitter<'a> {
    names: &'a Names,
    rule: &'a SchemaRule,
}

impl Emitter<'_> {
    fn ident(&self) -> String {
        self.names.validator(self.rule)
    }

    fn error_call(&self, field1: &str, value1: &str, field2: &str, value2: &str) -> String {
        format!(
            "{}({:?}, {}, {}, {}, {})",
            self.names.function("error"),
            self.rule.name,
            field1,
            value1,
            field2,
            value2
        )
    }

    fn value_type(&self) -> TypeClass {
        self.rule.value_type()
    }

    fn required(&self, output: &mut String) {
        let ty = self.value_type();
        let check = match ty {
            TypeClass::SignedInteger | TypeClass::UnsignedInteger => "*value == 0",
            TypeClass::Float => "*value == 0.0",
            TypeClass::String => "value.is_empty()",
            TypeClass::Boolean => "!*value",
        };
        output.push_str(&format!(
            "fn {}(field: &str, value: &{}) -> Option<String> {{\n",
            self.ident(),
            ty.rust_type()
        ));
        output.push_str(&format!("    if {} {{\n", check));
        output.push_str(&format!(
            "        return Some({});\n",
            self.error_call("field", "\"\"", "\"\"", "\"\"")
        ));
        output.push_str("    }\n");
        output.push_str("    None\n");
        output.push_str("}\n");
    }

    /// `min`, `max` and `size`: fail when `value <op> cond`
    fn compare(&self, output: &mut String, op: &str) {
        let ty = self.value_type().rust_type();
        output.push_str(&format!(
            "fn {}(field: &str, value: &{}, cond: &{}) -> Option<String> {{\n",
            self.ident(),
            ty,
            ty
        ));
        output.push_str(&format!("    if *value {} *cond {{\n", op));
        output.push_str(&format!(
            "        return Some({});\n",
            self.error_call("field", "&cond.to_string()", "\"\"", "\"\"")
        ));
        output.push_str("    }\n");
        output.push_str("    None\n");
        output.push_str("}\n");
    }

    fn regexp(&self, output: &mut String) {
        output.push_str(&format!(
            "fn {}(field: &str, value: &String, cond: &String) -> Option<String> {{\n",
            self.ident()
        ));
        output.push_str("    match regex::Regex::new(cond) {\n");
        output.push_str("        Ok(re) if re.is_match(value) => None,\n");
        output.push_str(&format!(
            "        _ => Some({}),\n",
            self.error_call("field", "cond", "\"\"", "\"\"")
        ));
        output.push_str("    }\n");
        output.push_str("}\n");
    }

    /// Needs an `@` past the first character and a later `.` with two
    /// characters on each side
    fn email(&self, output: &mut String) {
        output.push_str(&format!(
            "fn {}(field: &str, value: &String, _cond: &String) -> Option<String> {{\n",
            self.ident()
        ));
        output.push_str("    let valid = match (value.find('@'), value.rfind('.')) {\n");
        output.push_str("        (Some(at), Some(dot)) => at >= 1 && dot >= at + 2 && dot + 2 < value.len(),\n");
        output.push_str("        _ => false,\n");
        output.push_str("    };\n");
        output.push_str("    if !valid {\n");
        output.push_str(&format!(
            "        return Some({});\n",
            self.error_call("field", "\"\"", "\"\"", "\"\"")
        ));
        output.push_str("    }\n");
        output.push_str("    None\n");
        output.push_str("}\n");
    }

    fn between(&self, output: &mut String) {
        let ty = self.value_type().rust_type();
        output.push_str(&format!(
            "fn {}(field: &str, value: &{}, min: &{}, max: &{}) -> Option<String> {{\n",
            self.ident(),
            ty,
            ty,
            ty
        ));
        output.push_str("    if *value < *min || *value > *max {\n");
        output.push_str(&format!(
            "        return Some({});\n",
            self.error_call("field", "&min.to_string()", "\"\"", "&max.to_string()")
        ));
        output.push_str("    }\n");
        output.push_str("    None\n");
        output.push_str("}\n");
    }

    fn conditional(&self, output: &mut String, failure: &str, args: ConditionalArgs) {
        let call = match args {
            ConditionalArgs::Values => self.error_call("field1", "value1", "field2", "value2"),
            ConditionalArgs::Cond => self.error_call("field1", "\"\"", "field2", "cond"),
            ConditionalArgs::FieldsOnly => self.error_call("field1", "\"\"", "field2", "\"\""),
        };
        let body = format!("{} {}", failure, call);
        let param = |name: &str| {
            if body.contains(name) {
                name.to_string()
            } else {
                format!("_{}", name)
            }
        };
        output.push_str(&format!(
            "fn {}(field1: &str, {}: &str, {}: bool, field2: &str, {}: &str, {}: bool, {}: &str) -> Option<String> {{\n",
            self.ident(),
            param("value1"),
            param("empty1"),
            param("value2"),
            param("empty2"),
            param("cond")
        ));
        output.push_str(&format!("    if {} {{\n", failure));
        output.push_str(&format!("        return Some({});\n", call));
        output.push_str("    }\n");
        output.push_str("    None\n");
        output.push_str("}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{FieldRef, Projection};

    fn rule(name: &str, kind: RuleKind, resolved: Option<TypeClass>) -> SchemaRule {
        SchemaRule {
            name: name.to_string(),
            kind,
            field1: FieldRef {
                ident: "id".to_string(),
                label: "ID".to_string(),
                class: TypeClass::SignedInteger,
            },
            field2: None,
            cond1: None,
            cond2: None,
            resolved,
            projection: Projection::Cast,
        }
    }

    fn emit(rule: &SchemaRule) -> String {
        let names = Names::new("vg").unwrap();
        let mut out = String::new();
        emit_validator(&mut out, &names, rule).unwrap();
        out
    }

    #[test]
    fn test_required_per_type() {
        let out = emit(&rule("required", RuleKind::Presence, Some(TypeClass::Float)));
        assert!(out.starts_with("fn vg_required_f64(field: &str, value: &f64) -> Option<String> {"));
        assert!(out.contains("if *value == 0.0 {"));
        assert!(out.contains("vg_error(\"required\", field, \"\", \"\", \"\")"));

        let out = emit(&rule("required", RuleKind::Presence, Some(TypeClass::String)));
        assert!(out.contains("if value.is_empty() {"));

        let out = emit(&rule("required", RuleKind::Presence, Some(TypeClass::Boolean)));
        assert!(out.contains("if !*value {"));
    }

    #[test]
    fn test_min_uses_cond_parameter() {
        let out = emit(&rule("min", RuleKind::ValueConstraint, Some(TypeClass::SignedInteger)));
        assert!(out.contains("fn vg_min_i64(field: &str, value: &i64, cond: &i64)"));
        assert!(out.contains("if *value < *cond {"));
        assert!(out.contains("vg_error(\"min\", field, &cond.to_string(), \"\", \"\")"));
    }

    #[test]
    fn test_between_passes_bounds_to_message() {
        let out = emit(&rule("between", RuleKind::Range, Some(TypeClass::UnsignedInteger)));
        assert!(out.contains("fn vg_between_u64(field: &str, value: &u64, min: &u64, max: &u64)"));
        assert!(out.contains("vg_error(\"between\", field, &min.to_string(), \"\", &max.to_string())"));
    }

    #[test]
    fn test_conditionals_are_type_erased() {
        let out = emit(&rule("required_if", RuleKind::Conditional, None));
        assert!(out.contains(
            "fn vg_required_if(field1: &str, _value1: &str, empty1: bool, field2: &str, value2: &str, _empty2: bool, cond: &str)"
        ));
        assert!(out.contains("if value2 == cond && empty1 {"));

        let out = emit(&rule("same", RuleKind::Conditional, None));
        assert!(out.contains(
            "fn vg_same(field1: &str, value1: &str, _empty1: bool, field2: &str, value2: &str, _empty2: bool, _cond: &str)"
        ));
        assert!(out.contains("if value1 != value2 {"));
    }

    #[test]
    fn test_presence_conditionals_use_emptiness_flags() {
        // Emptiness comes from the field's type, never from the stringified value
        let out = emit(&rule("required_with", RuleKind::Conditional, None));
        assert!(out.contains("if !empty2 && empty1 {"));
        assert!(!out.contains("\"false\""));
        assert!(!out.contains("\"0\""));

        let out = emit(&rule("required_without", RuleKind::Conditional, None));
        assert!(out.contains("if empty2 && empty1 {"));
        assert!(out.contains("vg_error(\"required_without\", field1, value1, field2, value2)"));
    }

    #[test]
    fn test_unknown_rule_is_an_error() {
        let names = Names::new("vg").unwrap();
        let mut out = String::new();
        let bogus = rule("bogus", RuleKind::Presence, Some(TypeClass::String));
        assert!(emit_validator(&mut out, &names, &bogus).is_err());
        assert!(out.is_empty());
    }
}
