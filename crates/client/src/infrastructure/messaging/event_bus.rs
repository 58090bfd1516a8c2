//! Event Bus for push notifications from the backend channel.
//!
//! The EventBus decodes raw text frames into typed [`PushEvent`]s and
//! delivers them to listeners registered for the event's type. A frame
//! that fails to decode is dropped with a diagnostic; it never reaches
//! listeners and never tears anything down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use kinoview_protocol::PushEvent;

type Callback = Box<dyn FnMut(PushEvent) + Send + 'static>;

/// Push-based event bus keyed by event type.
///
/// Subscribers register callbacks per event type; the channel driver calls
/// [`EventBus::dispatch_raw`] for every inbound text frame. Delivery order
/// matches arrival order; there is no buffering or replay across listener
/// registration.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<HashMap<String, Vec<Callback>>>>,
    decode_failures: Arc<AtomicU64>,
}

impl EventBus {
    /// Create a new EventBus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            decode_failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to events of one type.
    ///
    /// The callback is invoked for every decoded event whose `type` field
    /// matches; events of other types do not reach it.
    pub async fn subscribe(
        &self,
        event_type: impl Into<String>,
        callback: impl FnMut(PushEvent) + Send + 'static,
    ) {
        self.subscribers
            .lock()
            .await
            .entry(event_type.into())
            .or_default()
            .push(Box::new(callback));
    }

    /// Decode one raw frame and dispatch it.
    ///
    /// Malformed frames are counted, logged, and dropped - never fatal.
    pub async fn dispatch_raw(&self, frame: &str) {
        match PushEvent::decode(frame) {
            Ok(event) => self.dispatch(event).await,
            Err(e) => {
                self.decode_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "dropping undecodable frame");
            }
        }
    }

    /// Dispatch an already-decoded event to its type's subscribers.
    pub async fn dispatch(&self, event: PushEvent) {
        let mut subscribers = self.subscribers.lock().await;
        if let Some(listeners) = subscribers.get_mut(&event.event_type) {
            for listener in listeners.iter_mut() {
                listener(event.clone());
            }
        } else {
            tracing::debug!(event_type = %event.event_type, "no listeners for event");
        }
    }

    /// Number of frames dropped because they failed to decode.
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures.load(Ordering::Relaxed)
    }

    /// Total subscriber count across all event types.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.values().map(Vec::len).sum()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
