//! WebSocket channel to the catalog backend
//!
//! - `core`: runtime-agnostic state machine, closure classification, and
//!   reconnect backoff math
//! - `client`: tokio-tungstenite client owning the socket and the single
//!   reconnect timer

mod client;
mod core;

pub use self::client::BackendClient;
pub use self::core::{
    classify_close, ChannelError, ClosureKind, ConnectionState, ReconnectBackoff, ReconnectPolicy,
    CLOSE_ABNORMAL, CLOSE_NORMAL,
};
