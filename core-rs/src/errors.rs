//! Error types for SQV Core

use thiserror::Error;

use crate::ontology::StoreError;

#[derive(Error, Debug)]
pub enum SqvError {
    #[error("Ontology store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Attribute is not numeric: {0}")]
    NotNumeric(String),

    #[error("Unknown graph element: {0}")]
    UnknownElement(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Regex error: {0}")]
    RegexError(String),
}

impl From<regex::Error> for SqvError {
    fn from(err: regex::Error) -> Self {
        SqvError::RegexError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SqvError>;
