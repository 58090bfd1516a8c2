//! Kinoview Protocol - Shared types for talking to the catalog backend
//!
//! This crate contains all types shared between the backend and the client:
//! - Movie records and the paged REST response envelope
//! - WebSocket push-event frames
//! - Query parameters (pagination, filters, sort)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, and chrono
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Wire-faithful** - Field names match the backend's camelCase JSON

pub mod events;
pub mod movie;
pub mod query;

pub use events::PushEvent;
pub use movie::{Movie, MovieGenre, MoviePage};
pub use query::{QueryParams, QueryParamsUpdate, SortDirection};
