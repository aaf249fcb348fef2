//! Error types for tree operations
//!
//! Simple, flat error hierarchy. Every failure is local to the call that
//! raised it.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Cannot reparent <{tag}>")]
    Reparent { tag: String },

    #[error("No parent for <{tag}>")]
    NoParent { tag: String },

    #[error("Cannot insert <{tag}> into itself or one of its descendants")]
    CyclicInsert { tag: String },

    /// Parent does not list a child that points back at it.
    #[error("Corrupted tree: {0}")]
    Corrupted(String),

    #[error("Invalid selector '{selector}': {reason}")]
    SelectorSyntax { selector: String, reason: String },

    #[error("No node matched '{selector}' under {scope}")]
    NoMatch { selector: String, scope: String },

    #[error("Index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("Node set is empty")]
    Empty,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Config error: {0}")]
    ConfigError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DomError {
    pub(crate) fn syntax(selector: &str, reason: impl Into<String>) -> Self {
        DomError::SelectorSyntax {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}
