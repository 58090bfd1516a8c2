//! HTTP adapters for the catalog REST endpoint

pub mod query_client;

pub use query_client::HttpQueryAdapter;
