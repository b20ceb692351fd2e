//! Error types for sqlforge

use thiserror::Error;

use crate::operator::QueryKind;

/// Result type alias for sqlforge operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Errors raised while building, rendering or executing a statement.
///
/// Builder errors are raised at the offending call and describe a mistake in
/// query construction, not a transient failure.
#[derive(Debug, Error)]
pub enum OrmError {
    /// A mutator received a value of the wrong shape
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Predicate operator outside the operator catalog
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Mutating statement requested on a read-only builder
    #[error("Read-only violation: {0}")]
    ReadOnlyViolation(String),

    /// Column reference that does not reduce to a column key
    #[error("Unresolvable column reference: {0}")]
    UnresolvableColumnReference(String),

    /// Bind value that has no parameter type mapping
    #[error("Unsupported bind type: {0}")]
    UnsupportedBindType(String),

    /// A second, different statement intent on the same builder
    #[error("Builder is already a {current:?} query; cannot turn it into {requested:?}")]
    KindConflict {
        current: QueryKind,
        requested: QueryKind,
    },

    /// The grammar cannot render the current builder state
    #[error("Compile error: {0}")]
    Compile(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl OrmError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a compile error
    pub fn compile(message: impl Into<String>) -> Self {
        Self::Compile(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a read-only violation
    pub fn is_read_only_violation(&self) -> bool {
        matches!(self, Self::ReadOnlyViolation(_))
    }

    /// Check if this is an invalid operator error
    pub fn is_invalid_operator(&self) -> bool {
        matches!(self, Self::InvalidOperator(_))
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a compile error
    pub fn is_compile(&self) -> bool {
        matches!(self, Self::Compile(_))
    }

    /// Parse a tokio_postgres error into an OrmError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        Self::Query(err)
    }
}
