//! Configuration management for the generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (valgen.toml)
//! - Environment variables (VALGEN__*)
//!
//! ## Example config file (valgen.toml):
//! ```toml
//! [generator]
//! locale = "en"
//! prefix = "vg"
//!
//! [parser]
//! lenient_numeric_operands = false
//!
//! [catalog]
//! paths = ["locales/extra.toml"]
//!
//! [output]
//! path = "src/user_schema.rs"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::parser::ParseOptions;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValgenConfig {
    /// Emission settings
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Annotation parsing settings
    #[serde(default)]
    pub parser: ParserSettings,

    /// Extra message catalogs
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Output settings
    #[serde(default)]
    pub output: OutputSettings,
}

/// Emission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Locale of the embedded failure messages
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Prefix of every emitted helper identifier
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

/// Parser configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Default malformed numeric operands to zero instead of failing the run
    #[serde(default)]
    pub lenient_numeric_operands: bool,
}

/// Message catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Catalog files merged over the built-in locales, in order
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Default output file (stdout when unset)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_locale() -> String {
    "en".to_string()
}

fn default_prefix() -> String {
    "vg".to_string()
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            prefix: default_prefix(),
        }
    }
}

impl From<&ParserSettings> for ParseOptions {
    fn from(settings: &ParserSettings) -> Self {
        Self {
            lenient_numeric_operands: settings.lenient_numeric_operands,
        }
    }
}

impl ValgenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["valgen.toml", ".valgen.toml", "config/valgen.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "valgen") {
            let xdg_config = config_dir.config_dir().join("valgen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (VALGEN__*)
        builder = builder.add_source(
            Environment::with_prefix("VALGEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::from(&self.parser)
    }
}
