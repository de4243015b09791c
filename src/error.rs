//! Error types for logiq compilation and execution.

use thiserror::Error;

/// Result type alias using [`LogiqError`].
pub type Result<T> = std::result::Result<T, LogiqError>;

/// Error types for logiq compilation and execution.
#[derive(Debug, Error)]
pub enum LogiqError {
    /// A goal set flattened to zero predicates and is not the
    /// single-union special case. Fatal to the compile call.
    #[error("No goals provided - cannot build query without predicates or unions")]
    EmptyGoalSet,

    /// Opaque failure surfaced by the execution backend.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Table, column, or operand-shape resolution failure, from either
    /// the compiler or a backend.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Failure inside a specific union branch, tagged with its index.
    #[error("Union branch {index}: {source}")]
    UnionBranch {
        index: usize,
        #[source]
        source: Box<LogiqError>,
    },
}

impl LogiqError {
    /// Wraps an error with the index of the union branch that produced it.
    #[must_use]
    pub fn in_union_branch(self, index: usize) -> Self {
        LogiqError::UnionBranch {
            index,
            source: Box::new(self),
        }
    }
}
