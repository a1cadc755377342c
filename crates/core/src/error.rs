use semscope_api::ApiError;
use thiserror::Error;

/// Failure to turn a language-server suggestion record or update into an entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("Invalid name in field `{field}`: {reason}")]
    InvalidName { field: &'static str, reason: String },
    #[error("Entry with id {0} does not exist")]
    UnknownEntry(u32),
    #[error("Field `{field}` cannot be set on a {kind} entry")]
    UnsupportedField {
        field: &'static str,
        kind: &'static str,
    },
    #[error("Required field `{0}` is missing or was removed")]
    MissingField(&'static str),
    #[error("Argument index {index} out of range (entry has {len} arguments)")]
    InvalidArgumentIndex { index: usize, len: usize },
}

#[derive(Error, Debug)]
pub enum SemscopeError {
    #[error("Invalid qualified name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },
    #[error("Invalid project path `{0}`: expected at least a namespace and a project name")]
    ProjectPath(String),
    #[error("Suggestion error: {0}")]
    Suggestion(#[from] SuggestionError),
    #[error("Language server error: {0}")]
    Api(#[from] ApiError),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SemscopeError>;
