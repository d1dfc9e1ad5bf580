//! Unified error types for gatesearch
//!
//! The index layer reports its own [`IndexError`]; everything callers see goes
//! through [`SearchError`], which maps existence violations onto dedicated
//! variants and carries any other collaborator failure through untouched.

use crate::index::IndexError;

/// Main error type for search and administration operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Malformed ACL table or invalid configuration, surfaced at load time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Collection missing or empty; the index has not been populated yet
    #[error("Collection not initialized: {collection}")]
    NotInitialized { collection: String },

    /// Caller-supplied argument is unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `add` hit an id that already exists
    #[error("Document already exists: {id}")]
    Conflict { id: String },

    /// `update` hit an id that does not exist
    #[error("Document not found: {id}")]
    NotFound { id: String },

    /// Any other failure reported by the vector index
    #[error("Vector index error: {0}")]
    Collaborator(#[source] IndexError),

    /// I/O errors while reading resource files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gatesearch operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a not-initialized error for a collection
    pub fn not_initialized(collection: impl Into<String>) -> Self {
        Self::NotInitialized {
            collection: collection.into(),
        }
    }
}

impl From<IndexError> for SearchError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::AlreadyExists { id } => Self::Conflict { id },
            IndexError::NotFound { id } => Self::NotFound { id },
            IndexError::CollectionNotFound { name } => Self::NotInitialized { collection: name },
            other => Self::Collaborator(other),
        }
    }
}
