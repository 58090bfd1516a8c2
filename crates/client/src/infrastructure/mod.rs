//! Infrastructure adapters: WebSocket channel, push-event bus, REST query client

pub mod http;
pub mod messaging;
pub mod websocket;
