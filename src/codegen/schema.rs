//! Schema Emission
//!
//! Emits, per record, the `<Record>Schema` struct holding boxed rule objects,
//! the constructor wiring each rule to the record's field values, and the
//! `validate` dispatcher.

use crate::error::{Result, ValgenError};
use crate::rule::{FieldRef, Projection, RuleKind, Schema, SchemaRule};
use crate::value::{TypeClass, Value};

use super::names::{field_access, Names};

const RECEIVER: &str = "record";

// =============================================================================
// Public API
// =============================================================================

/// Emit the schema type of one record
pub fn emit_schema(output: &mut String, names: &Names, schema: &Schema) -> Result<()> {
    let schema_name = names.schema(&schema.record);
    let rule_trait = names.type_name("Rule");

    output.push_str(&format!("/// Validation rules of `{}`\n", schema.record));
    output.push_str(&format!("pub struct {} {{\n", schema_name));
    output.push_str(&format!("    rules: Vec<Box<dyn {}>>,\n", rule_trait));
    output.push_str("}\n\n");

    output.push_str(&format!("impl {} {{\n", schema_name));
    emit_constructor(output, names, schema, &rule_trait)?;
    output.push('\n');
    emit_validate(output);
    output.push_str("}\n");
    Ok(())
}

// =============================================================================
// Constructor
// =============================================================================

fn emit_constructor(output: &mut String, names: &Names, schema: &Schema, rule_trait: &str) -> Result<()> {
    if schema.is_empty() {
        output.push_str(&format!("    pub fn new(_{}: &{}) -> Self {{\n", RECEIVER, schema.record));
        output.push_str("        Self { rules: Vec::new() }\n");
        output.push_str("    }\n");
        return Ok(());
    }

    output.push_str(&format!("    pub fn new({}: &{}) -> Self {{\n", RECEIVER, schema.record));
    output.push_str(&format!(
        "        let mut rules: Vec<Box<dyn {}>> = Vec::with_capacity({});\n",
        rule_trait,
        schema.rules.len()
    ));
    for rule in &schema.rules {
        emit_rule(output, names, &schema.record, rule)?;
    }
    output.push_str("        Self { rules }\n");
    output.push_str("    }\n");
    Ok(())
}

fn emit_rule(output: &mut String, names: &Names, record: &str, rule: &SchemaRule) -> Result<()> {
    let value = projected(rule);
    let validator = names.validator(rule);
    let ty = rule.value_type().rust_type();

    match rule.kind {
        RuleKind::Presence => {
            output.push_str(&format!(
                "        rules.push(Box::new({}::<{}> {{\n",
                names.type_name("RulePresence"),
                ty
            ));
            output.push_str(&format!("            field: {:?},\n", rule.field1.label));
            output.push_str(&format!("            value: {},\n", value));
        }
        RuleKind::ValueConstraint => {
            output.push_str(&format!(
                "        rules.push(Box::new({}::<{}> {{\n",
                names.type_name("RuleValueConstraint"),
                ty
            ));
            output.push_str(&format!("            field: {:?},\n", rule.field1.label));
            output.push_str(&format!("            value: {},\n", value));
            output.push_str(&format!("            cond: {},\n", operand(rule.cond1.as_ref(), rule)));
        }
        RuleKind::Range => {
            output.push_str(&format!(
                "        rules.push(Box::new({}::<{}> {{\n",
                names.type_name("RuleRange"),
                ty
            ));
            output.push_str(&format!("            field: {:?},\n", rule.field1.label));
            output.push_str(&format!("            value: {},\n", value));
            output.push_str(&format!("            min: {},\n", operand(rule.cond1.as_ref(), rule)));
            output.push_str(&format!("            max: {},\n", operand(rule.cond2.as_ref(), rule)));
        }
        RuleKind::Conditional => {
            let field2 = rule.field2.as_ref().ok_or_else(|| {
                ValgenError::invalid_rule(record, &rule.field1.ident, &rule.name, "conditional rule without a dependent field")
            })?;
            let cond = rule.cond1.as_ref().map(Value::to_string).unwrap_or_default();
            output.push_str(&format!(
                "        rules.push(Box::new({} {{\n",
                names.type_name("RuleConditional")
            ));
            output.push_str(&format!("            field1: {:?},\n", rule.field1.label));
            output.push_str(&format!("            field2: {:?},\n", field2.label));
            output.push_str(&format!("            value1: {},\n", value));
            output.push_str(&format!(
                "            value2: {}.to_string(),\n",
                field_access(RECEIVER, &field2.ident)
            ));
            output.push_str(&format!("            empty1: {},\n", emptiness(&rule.field1)));
            output.push_str(&format!("            empty2: {},\n", emptiness(field2)));
            output.push_str(&format!("            cond: {:?},\n", cond));
        }
    }
    output.push_str(&format!("            validator: {},\n", validator));
    output.push_str("        }));\n");
    Ok(())
}

/// Zero-value test of a field in its own type
fn emptiness(field: &FieldRef) -> String {
    let access = field_access(RECEIVER, &field.ident);
    match field.class {
        TypeClass::SignedInteger | TypeClass::UnsignedInteger => format!("{} == 0", access),
        TypeClass::Float => format!("{} == 0.0", access),
        TypeClass::String => format!("{}.is_empty()", access),
        TypeClass::Boolean => format!("!{}", access),
    }
}

/// Rust literal of an operand, the resolved type's zero when absent
fn operand(value: Option<&Value>, rule: &SchemaRule) -> String {
    match value {
        Some(value) => value.to_rust_literal(),
        None => Value::zero(rule.value_type()).to_rust_literal(),
    }
}

/// Expression handing the field value to the validator
fn projected(rule: &SchemaRule) -> String {
    let access = field_access(RECEIVER, &rule.field1.ident);
    match rule.projection {
        Projection::Cast => match rule.value_type() {
            TypeClass::SignedInteger => format!("{} as i64", access),
            TypeClass::UnsignedInteger => format!("{} as u64", access),
            TypeClass::Float => format!("{} as f64", access),
            TypeClass::String => format!("{}.to_string()", access),
            TypeClass::Boolean => access,
        },
        Projection::CharCount => format!("{}.chars().count() as u64", access),
        Projection::DecimalLength => format!("{}.to_string().chars().count() as u64", access),
        Projection::Decimal => format!("{}.to_string().parse::<f64>().unwrap_or(f64::NAN)", access),
        Projection::Display => format!("{}.to_string()", access),
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

fn emit_validate(output: &mut String) {
    output.push_str("    /// Failure messages of every rule that does not hold, in declaration order\n");
    output.push_str("    pub fn validate(&self) -> Vec<String> {\n");
    output.push_str("        self.rules.iter().filter_map(|rule| rule.validate()).collect()\n");
    output.push_str("    }\n");
}
