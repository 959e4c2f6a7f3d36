//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Covers deterministic failures of schema and document handling (bad
/// definitions, unknown fields, registration conflicts). Storage failures are
/// reported by the persistence layer itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A definition or value failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A field name that the schema does not declare.
    #[error("schema '{schema}' has no field '{field}'")]
    UnknownField { schema: String, field: String },

    /// A requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A conflicting registration (e.g. a model name that is already taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A document was handed to a model it does not belong to.
    #[error("document belongs to '{document}', not '{model}'")]
    ForeignDocument { model: String, document: String },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unknown_field(schema: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            schema: schema.into(),
            field: field.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
