//! Error taxonomy for the analytics core.
//!
//! Only conditions that stop a computation outright are errors. Coercion
//! failures are data (missing cells plus a tally) and an aggregation with no
//! surviving rows is reported through [`crate::aggregate::SeriesOutcome`].

use thiserror::Error;

use crate::roles::Role;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// No column could be resolved for a role the computation needs.
    #[error("No column found for the '{0}' role")]
    RoleNotFound(Role),

    /// Average basket value over a table with zero rows.
    #[error("Cannot compute an average over zero transactions")]
    DivisionByZero,

    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    #[error("Column '{column}' has {actual} value(s) but the table has {expected} row(s)")]
    RaggedTable {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl AnalyticsError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RoleNotFound(_) => "ROLE_NOT_FOUND",
            Self::DivisionByZero => "DIVISION_BY_ZERO",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::RaggedTable { .. } => "RAGGED_TABLE",
        }
    }
}

pub type Result<T, E = AnalyticsError> = std::result::Result<T, E>;
