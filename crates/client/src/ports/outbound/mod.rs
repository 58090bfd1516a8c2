//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must
//! implement, allowing application services to interact with external
//! systems without depending on concrete implementations.

pub mod query_port;

pub use query_port::{MovieQueryPort, QueryError};

#[cfg(any(test, feature = "testing"))]
pub use query_port::MockMovieQueryPort;
