//! Error types for the validation-rule compiler

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, ValgenError>;

/// Compiler errors
#[derive(Error, Debug)]
pub enum ValgenError {
    #[error("Invalid rule format: {record}.{field} `{token}`: {reason}")]
    InvalidRuleFormat {
        record: String,
        field: String,
        token: String,
        reason: String,
    },

    #[error("Unsupported field type: {record}.{field} has type `{ty}`")]
    UnsupportedFieldType {
        record: String,
        field: String,
        ty: String,
    },

    #[error("Unresolved locale: {0}")]
    UnresolvedLocale(String),

    #[error("Unresolved message key: {key} in locale {locale}")]
    UnresolvedMessageKey { locale: String, key: String },

    #[error("Invalid message catalog {path}: {reason}")]
    InvalidCatalog { path: String, reason: String },

    #[error("Invalid identifier prefix: {0}")]
    InvalidPrefix(String),

    #[error("Invalid record descriptors: {0}")]
    InvalidDescriptors(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl ValgenError {
    /// Build an [`ValgenError::InvalidRuleFormat`] for a token of a record field
    pub fn invalid_rule(
        record: impl Into<String>,
        field: impl Into<String>,
        token: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRuleFormat {
            record: record.into(),
            field: field.into(),
            token: token.into(),
            reason: reason.into(),
        }
    }
}
