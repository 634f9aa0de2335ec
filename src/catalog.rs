//! Message Catalog
//!
//! Locale-keyed failure-message templates. A template is a sentence of
//! space-separated words where `:`-prefixed words are placeholders:
//!
//! - `:field` / `:field1` - the validated field
//! - `:value` / `:value1` - its operand or value
//! - `:field2` - the dependent field
//! - `:value2` - the second operand or dependent value
//!
//! `en` and `fr` are embedded at compile time. Extra catalogs (JSON or TOML,
//! `locale -> rule -> template`) are merged over them.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ValgenError};

static BUILTIN_LOCALES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/locales");

/// Templates of one locale, keyed by rule name
pub type Templates = BTreeMap<String, String>;

/// Locale -> rule name -> template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCatalog {
    locales: BTreeMap<String, Templates>,
}

impl MessageCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the embedded locales (one `<locale>.json` per file)
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::new();
        for file in BUILTIN_LOCALES.files() {
            let path = file.path();
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = file.contents_utf8().ok_or_else(|| ValgenError::InvalidCatalog {
                path: path.display().to_string(),
                reason: "not valid UTF-8".to_string(),
            })?;
            let templates: Templates = serde_json::from_str(content)?;
            catalog.locales.insert(locale.to_string(), templates);
        }
        Ok(catalog)
    }

    /// Built-in locales overlaid with the given catalog files, in order
    pub fn with_files(paths: &[PathBuf]) -> Result<Self> {
        let mut catalog = Self::builtin()?;
        for path in paths {
            catalog.load_file(path)?;
        }
        Ok(catalog)
    }

    /// Merge a `locale -> rule -> template` file (`.json` or `.toml`)
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)?;
        let parsed: BTreeMap<String, Templates> = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ValgenError::InvalidCatalog {
                    path: path.display().to_string(),
                    reason: format!("unsupported extension {:?}", other.unwrap_or("")),
                })
            }
        };
        tracing::debug!(path = %path.display(), locales = parsed.len(), "loaded message catalog");
        for (locale, templates) in parsed {
            for (rule, template) in templates {
                self.insert(locale.as_str(), rule, template);
            }
        }
        Ok(())
    }

    /// Set one template, creating the locale when needed
    pub fn insert(&mut self, locale: impl Into<String>, rule: impl Into<String>, template: impl Into<String>) {
        self.locales
            .entry(locale.into())
            .or_default()
            .insert(rule.into(), template.into());
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    pub fn templates(&self, locale: &str) -> Result<&Templates> {
        self.locales
            .get(locale)
            .ok_or_else(|| ValgenError::UnresolvedLocale(locale.to_string()))
    }

    pub fn try_template(&self, locale: &str, key: &str) -> Result<&str> {
        self.templates(locale)?
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ValgenError::UnresolvedMessageKey {
                locale: locale.to_string(),
                key: key.to_string(),
            })
    }

    /// Template lookup that degrades to an empty template
    pub fn template(&self, locale: &str, key: &str) -> &str {
        match self.try_template(locale, key) {
            Ok(template) => template,
            Err(err) => {
                warn!(%err, "using empty message template");
                ""
            }
        }
    }

    /// Render the failure message for a rule
    pub fn render(
        &self,
        locale: &str,
        key: &str,
        field1: &str,
        value1: &str,
        field2: &str,
        value2: &str,
    ) -> String {
        render_template(self.template(locale, key), field1, value1, field2, value2)
    }
}

/// Substitute placeholders and normalise the sentence.
///
/// Unknown placeholders and empty substitutions are dropped, words are joined
/// with single spaces and the result ends with exactly one `.`.
pub fn render_template(template: &str, field1: &str, value1: &str, field2: &str, value2: &str) -> String {
    let mut words: Vec<&str> = Vec::new();
    for word in template.split_whitespace() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_locales() {
        let catalog = MessageCatalog::builtin().unwrap();
        let locales: Vec<_> = catalog.locales().collect();
        assert_eq!(locales, vec!["en", "fr"]);
        assert_eq!(catalog.templates("en").unwrap().len(), 12);
        assert_eq!(catalog.templates("fr").unwrap().len(), 12);
    }

    #[test]
    fn test_render_required_if() {
        let catalog = MessageCatalog::builtin().unwrap();
        let msg = catalog.render("en", "required_if", "ID", "", "Name", "John");
        assert_eq!(msg, "The ID field is required when Name is John.");
    }

    #[test]
    fn test_render_between() {
        let catalog = MessageCatalog::builtin().unwrap();
        assert_eq!(
            catalog.render("en", "between", "ID", "1", "", "1000"),
            "The ID field must be between 1 and 1000."
        );
        // An empty field name leaves no gap behind
        assert_eq!(
            catalog.render("en", "between", "", "1", "", "1000"),
            "The field must be between 1 and 1000."
        );
    }

    #[test]
    fn test_render_same() {
        let catalog = MessageCatalog::builtin().unwrap();
        assert_eq!(
            catalog.render("en", "same", "ID", "5", "ID3", "6"),
            "The ID field must match the ID3 field."
        );
    }

    #[test]
    fn test_unknown_placeholder_dropped() {
        assert_eq!(render_template("Bad :thing here", "a", "", "", ""), "Bad here.");
    }

    #[test]
    fn test_exactly_one_trailing_period() {
        assert_eq!(render_template("Done...", "", "", "", ""), "Done.");
        assert_eq!(render_template("No period", "", "", "", ""), "No period.");
        assert_eq!(render_template("  spaced   out  ", "", "", "", ""), "spaced out.");
    }

    #[test]
    fn test_missing_key_degrades() {
        let catalog = MessageCatalog::builtin().unwrap();
        assert_eq!(catalog.render("en", "nope", "ID", "", "", ""), ".");
        assert_eq!(catalog.render("xx", "required", "ID", "", "", ""), ".");
        assert!(matches!(
            catalog.try_template("xx", "required"),
            Err(ValgenError::UnresolvedLocale(_))
        ));
        assert!(matches!(
            catalog.try_template("en", "nope"),
            Err(ValgenError::UnresolvedMessageKey { .. })
        ));
    }

    #[test]
    fn test_load_file_overlays() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("extra.toml");
        fs::write(
            &path,
            "[en]\nrequired = \"Please fill in :field.\"\n\n[de]\nrequired = \"Das Feld :field ist erforderlich.\"\n",
        )
        .unwrap();

        let catalog = MessageCatalog::with_files(&[path]).unwrap();
        assert_eq!(catalog.render("en", "required", "Name", "", "", ""), "Please fill in Name.");
        assert_eq!(catalog.render("de", "required", "Name", "", "", ""), "Das Feld Name ist erforderlich.");
        // untouched keys survive the overlay
        assert_eq!(catalog.render("en", "min", "Age", "3", "", ""), "The Age field must be at least 3.");
    }

    #[test]
    fn test_load_file_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("extra.yaml");
        fs::write(&path, "en: {}").unwrap();
        let mut catalog = MessageCatalog::new();
        assert!(matches!(
            catalog.load_file(&path),
            Err(ValgenError::InvalidCatalog { .. })
        ));
    }
}
