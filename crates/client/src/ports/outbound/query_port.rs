//! Movie Query Port - boundary to the catalog REST endpoint
//!
//! The endpoint itself is an external collaborator; the application layer
//! only sees this trait. Adapters (HTTP, test fakes) implement it.

use kinoview_protocol::{MoviePage, QueryParams};

/// Failure of one catalog fetch
///
/// Cloneable so the view state can hold the last failure without owning
/// the underlying transport error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Request never produced a response (connect/timeout/transport)
    #[error("catalog request failed: {0}")]
    Request(String),
    /// Endpoint answered with a non-success status
    #[error("catalog returned status {0}")]
    Status(u16),
    /// Response body was not the expected page envelope
    #[error("unexpected catalog response: {0}")]
    InvalidResponse(String),
}

/// Port for fetching one page of the catalog
///
/// Treated as an opaque asynchronous operation: callers pass an immutable
/// parameter snapshot and get a page plus total count, or a `QueryError`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait::async_trait]
pub trait MovieQueryPort: Send + Sync {
    /// Fetch the page described by `params`
    async fn fetch_page(&self, params: QueryParams) -> Result<MoviePage, QueryError>;
}
