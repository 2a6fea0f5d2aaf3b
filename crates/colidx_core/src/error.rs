//! Error types for index construction and queries.

use crate::index::IndexType;
use colidx_storage::StorageError;
use thiserror::Error;

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors raised by index construction and queries.
///
/// Every variant signals a caller bug or a refused build. A query that
/// simply matches nothing is not an error: it yields an empty cursor range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Malformed or out-of-contract input.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the offending input.
        message: String,
    },

    /// An operation was called without its preconditions holding.
    #[error("precondition violated: {message}")]
    PreconditionViolation {
        /// Description of the violated precondition.
        message: String,
    },

    /// Building the index would exceed the configured memory budget.
    #[error("{index_type} index needs an estimated {estimated} bytes, budget is {budget}")]
    BudgetExceeded {
        /// Index type that was requested.
        index_type: IndexType,
        /// Estimated size in bytes.
        estimated: usize,
        /// Configured budget in bytes.
        budget: usize,
    },

    /// The indexed storage could not be read.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IndexError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a precondition violation error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            message: message.into(),
        }
    }
}
