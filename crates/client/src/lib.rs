//! Kinoview Client - live movie catalog view
//!
//! Keeps a paginated, filterable, sortable catalog view eventually
//! consistent with the backend: a persistent WebSocket channel pushes
//! `update` notifications, and every notification or parameter change
//! funnels through one sequence-gated refetch path.
//!
//! Layers:
//! - `ports`: trait boundaries for external collaborators (the query
//!   endpoint)
//! - `infrastructure`: the WebSocket channel, the push-event bus, and the
//!   REST query adapter
//! - `application`: the view service owning query parameters and view state
//! - `runner`: composition root wiring used by the binary

pub mod application;
pub mod infrastructure;
pub mod ports;
pub mod runner;
