//! Messaging between the channel and the rest of the client

pub mod event_bus;

pub use event_bus::EventBus;
