//! WebSocket push-event frames
//!
//! The backend broadcasts small JSON frames of the shape
//! `{"type": "update", "message": "..."}` whenever the collection changes.
//! The `type` field routes the event; everything else rides along in the
//! flattened payload map.

use serde::{Deserialize, Serialize};

/// One decoded push event from the server channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Event type used for listener routing
    #[serde(rename = "type")]
    pub event_type: String,
    /// Remaining frame fields, kept as-is
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl PushEvent {
    /// Event type announcing that the movie collection changed
    pub const UPDATE: &str = "update";

    /// Decode one UTF-8 text frame into a typed event
    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }

    pub fn is_update(&self) -> bool {
        self.event_type == Self::UPDATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_update_frame_with_payload() {
        let event = PushEvent::decode(r#"{"type":"update","message":"Movies updated"}"#).unwrap();
        assert!(event.is_update());
        assert_eq!(
            event.payload.get("message").and_then(|v| v.as_str()),
            Some("Movies updated")
        );
    }

    #[test]
    fn rejects_frame_without_type() {
        assert!(PushEvent::decode(r#"{"message":"no type"}"#).is_err());
        assert!(PushEvent::decode("not json at all").is_err());
    }
}
