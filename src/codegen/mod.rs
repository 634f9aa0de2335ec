//! Code Generation
//!
//! Turns parsed schemas into one self-contained Rust source unit.
//!
//! Layout of a unit:
//! - header: generated marker and input checksum
//! - scaffolding: rule trait, rule structs, message renderer ([`template`])
//! - message table for the selected locale
//! - validator functions, each emitted once per unit ([`validators`])
//! - one `<Record>Schema` per record ([`schema`])
//!
//! Validators are deduplicated across every schema of the unit by their
//! function name, which encodes `(rule name, resolved type)`.

pub mod names;
pub mod schema;
pub mod template;
pub mod validators;

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::catalog::MessageCatalog;
use crate::checksum::Checksum;
use crate::config::{GeneratorSettings, ValgenConfig};
use crate::descriptor::RecordDescriptor;
use crate::error::Result;
use crate::parser::parse_schemas;
use crate::rule::Schema;

use names::Names;
use template::Template;

/// Crates the emitted code refers to, keyed by the rule that needs them
const EXTERNAL_CRATES: &[(&str, &str)] = &[("regexp", "regex")];

/// Output of one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// The Rust source text
    pub source: String,
    /// Emitted validator functions in emission order
    pub validators: Vec<String>,
    /// Crates the source depends on beyond `std`
    pub external_crates: Vec<String>,
}

// =============================================================================
// Generator
// =============================================================================

/// Single-pass generator over a set of schemas sharing one output unit
pub struct Generator<'a> {
    schemas: &'a [Schema],
    catalog: &'a MessageCatalog,
    locale: String,
    names: Names,
    checksum: Option<Checksum>,

    /// Validator names already in the unit
    emitted: HashSet<String>,
    /// Same names in emission order
    order: Vec<String>,
}

impl<'a> Generator<'a> {
    pub fn new(schemas: &'a [Schema], catalog: &'a MessageCatalog, settings: &GeneratorSettings) -> Result<Self> {
        Ok(Self {
            schemas,
            catalog,
            locale: settings.locale.clone(),
            names: Names::new(&settings.prefix)?,
            checksum: None,
            emitted: HashSet::new(),
            order: Vec::new(),
        })
    }

    /// Embed the input checksum in the header
    pub fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }

    /// Render the unit
    pub fn generate(mut self) -> Result<GeneratedUnit> {
        let mut output = String::new();

        let mut template = Template::new(&self.names);
        if let Some(checksum) = &self.checksum {
            template = template.with_checksum(checksum);
        }
        template.render_header(&mut output);
        template.render_scaffold(&mut output);

        let used = self.used_rules();
        self.emit_messages(&mut output, &used);
        self.emit_validators(&mut output)?;

        for schema in self.schemas {
            schema::emit_schema(&mut output, &self.names, schema)?;
            output.push('\n');
        }

        // Single trailing newline
        while output.ends_with("\n\n") {
            output.pop();
        }

        let external_crates = EXTERNAL_CRATES
            .iter()
            .filter(|(rule, _)| used.contains(*rule))
            .map(|(_, krate)| krate.to_string())
            .collect();

        info!(
            schemas = self.schemas.len(),
            validators = self.order.len(),
            locale = %self.locale,
            "generated validation unit"
        );

        Ok(GeneratedUnit {
            source: output,
            validators: self.order,
            external_crates,
        })
    }

    /// Rule names referenced anywhere in the unit
    fn used_rules(&self) -> BTreeSet<String> {
        self.schemas
            .iter()
            .flat_map(|schema| schema.validators.iter().cloned())
            .collect()
    }

    fn emit_messages(&self, output: &mut String, used: &BTreeSet<String>) {
        let templates = match self.catalog.templates(&self.locale) {
            Ok(templates) => Some(templates),
            Err(err) => {
                warn!(%err, "emitting an empty message table");
                None
            }
        };

        output.push_str(&format!(
            "fn {}(key: &str) -> &'static str {{\n",
            self.names.function("message")
        ));
        output.push_str("    match key {\n");
        for key in used {
            match templates.and_then(|t| t.get(key)) {
                Some(text) => output.push_str(&format!("        {:?} => {:?},\n", key, text)),
                None if templates.is_some() => {
                    warn!(locale = %self.locale, key = %key, "no message template for rule");
                }
                None => {}
            }
        }
        output.push_str("        _ => \"\",\n");
        output.push_str("    }\n");
        output.push_str("}\n\n");
    }

    fn emit_validators(&mut self, output: &mut String) -> Result<()> {
        for schema in self.schemas {
            for rule in &schema.rules {
                let name = self.names.validator(rule);
                if !self.emitted.insert(name.clone()) {
                    continue;
                }
                debug!(validator = %name, record = %schema.record, "emitting validator");
                validators::emit_validator(output, &self.names, rule)?;
                output.push('\n');
                self.order.push(name);
            }
        }
        Ok(())
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Parse `records` and generate their unit with the configured catalog,
/// locale and prefix
pub fn generate(records: &[RecordDescriptor], config: &ValgenConfig) -> Result<GeneratedUnit> {
    let catalog = MessageCatalog::with_files(&config.catalog.paths)?;
    let schemas = parse_schemas(records, &config.parse_options())?;
    let checksum = Checksum::of_records(records)?;

    Generator::new(&schemas, &catalog, &config.generator)?
        .with_checksum(checksum)
        .generate()
}
