//! Event trait for notifications published to outside layers.
//!
//! Notifications are facts about committed state changes. They are serialized
//! with `bincode` so a gateway can persist or forward them without caring
//! about their Rust type.
//!
//! # Example
//!
//! ```
//! use stagepass_core::event::Event;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! enum DoorEvent {
//!     Opened { door: u32 },
//! }
//!
//! impl Event for DoorEvent {
//!     fn event_type(&self) -> &'static str {
//!         match self {
//!             DoorEvent::Opened { .. } => "DoorOpened.v1",
//!         }
//!     }
//! }
//! ```

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Error types for event serialization.
#[derive(Error, Debug)]
pub enum EventError {
    /// Failed to serialize event to bytes.
    #[error("Failed to serialize event: {0}")]
    SerializationError(String),

    /// Failed to deserialize event from bytes.
    #[error("Failed to deserialize event: {0}")]
    DeserializationError(String),
}

/// A notification that can be forwarded to, or stored by, an outside layer.
///
/// `event_type()` returns a stable identifier with a version suffix, for
/// example `"TicketMinted.v1"`, so consumers can route and evolve schemas.
pub trait Event: Send + Sync + 'static {
    /// Returns the versioned event type identifier.
    fn event_type(&self) -> &'static str;

    /// Serialize this event to bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns `EventError::SerializationError` if the event cannot be serialized.
    fn to_bytes(&self) -> Result<Vec<u8>, EventError>
    where
        Self: Serialize,
    {
        bincode::serialize(self).map_err(|e| EventError::SerializationError(e.to_string()))
    }

    /// Deserialize an event from bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns `EventError::DeserializationError` if the bytes are corrupted or
    /// belong to a different event schema.
    fn from_bytes(bytes: &[u8]) -> Result<Self, EventError>
    where
        Self: Sized + DeserializeOwned,
    {
        bincode::deserialize(bytes).map_err(|e| EventError::DeserializationError(e.to_string()))
    }
}
