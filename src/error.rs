use std::error::Error as StdError;

/// Result alias for permission filter construction.
pub type FilterResult<T> = std::result::Result<T, FilterError>;

/// Configuration errors raised while building a permission filter.
///
/// These are programmer errors on the caller side (an unknown permission level or
/// query type). They are never downgraded to "deny all".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// The permission level is not one of view, edit or admin.
    #[error("unknown permission level '{0}'")]
    UnknownPermissionLevel(String),

    /// The query type is not one of the supported search types.
    #[error("unknown query type '{0}'")]
    UnknownQueryType(String),
}

/// Failure reported by a storage collaborator (dashboard store or star service).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl StoreError {
    /// Creates a store error from a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a store error that wraps an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The message the collaborator reported.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors returned by [`crate::search::service::SearchService::search`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The permission filter could not be built for the request.
    #[error("invalid search request: {0}")]
    Filter(#[from] FilterError),

    /// The starred-items lookup failed.
    #[error(transparent)]
    Star(StoreError),

    /// The dashboard store failed to execute the search.
    #[error(transparent)]
    Store(StoreError),

    /// The caller cancelled the request before it completed.
    #[error("search was cancelled")]
    Cancelled,
}
