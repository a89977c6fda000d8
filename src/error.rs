use std::fmt::Display;

use thiserror::Error;

use crate::common::SlotId;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
}

impl Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrimaryKey => write!(f, "primary key"),
            Self::Unique => write!(f, "unique"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("{message}")]
    TypeMismatch {
        message: String,
        hint: Option<&'static str>,
    },

    #[error("{kind} constraint violation on column '{column}'")]
    ConstraintViolation {
        column: String,
        kind: ConstraintKind,
    },

    #[error("column {0} not found")]
    ColumnMissing(String),

    #[error("table {0} not found")]
    TableMissing(String),

    #[error("table {0} already exists")]
    DuplicateTable(String),

    #[error("column {0} is already indexed")]
    DuplicateIndex(String),

    #[error("page full")]
    PageFull,

    #[error("invalid slot id {0}")]
    InvalidSlot(SlotId),

    #[error("tuple cell count {found} does not match schema column count {expected}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("tuple of {0} bytes is too large for a single page")]
    TupleTooLarge(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid catalog document: {0}")]
    InvalidCatalog(#[from] serde_json::Error),
}

impl DbError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
            hint: None,
        }
    }

    pub fn type_mismatch_with_hint(message: impl Into<String>, hint: &'static str) -> Self {
        Self::TypeMismatch {
            message: message.into(),
            hint: Some(hint),
        }
    }

    /// An optional one-line suggestion a host can print below the message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::TypeMismatch { hint, .. } => *hint,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConstraintKind, DbError};

    #[test]
    fn constraint_violations_name_the_column_and_kind() {
        let err = DbError::ConstraintViolation {
            column: "id".to_owned(),
            kind: ConstraintKind::PrimaryKey,
        };
        assert_eq!(
            err.to_string(),
            "primary key constraint violation on column 'id'"
        );
    }

    #[test]
    fn hints_are_carried_alongside_the_message() {
        let err = DbError::type_mismatch_with_hint(
            "invalid input syntax for type INT: \"1.5\"",
            "INT literals cannot contain a decimal point.",
        );
        assert_eq!(err.to_string(), "invalid input syntax for type INT: \"1.5\"");
        assert_eq!(
            err.hint(),
            Some("INT literals cannot contain a decimal point.")
        );
    }
}
