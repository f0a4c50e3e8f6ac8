//! Event base header carried in a frame's base section.
//!
//! ```text
//! [version: i64 LE][timestamp_micros: i64 LE]
//! ```

use crate::error::FrameError;
use byteorder::{ByteOrder, LittleEndian};

/// Encoded size of an [`EventBase`]
pub const EVENT_BASE_SIZE: usize = 16;

/// Per-event metadata: position in the entity's history and commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBase {
    /// Snapshot version this event produces (1 for the first event)
    pub version: i64,
    /// Commit timestamp (microseconds since epoch)
    pub timestamp_micros: i64,
}

impl EventBase {
    /// Create a new event base.
    pub fn new(version: i64, timestamp_micros: i64) -> Self {
        EventBase {
            version,
            timestamp_micros,
        }
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> [u8; EVENT_BASE_SIZE] {
        let mut bytes = [0u8; EVENT_BASE_SIZE];
        LittleEndian::write_i64(&mut bytes[0..8], self.version);
        LittleEndian::write_i64(&mut bytes[8..16], self.timestamp_micros);
        bytes
    }

    /// Deserialize from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let bytes = bytes.get(..EVENT_BASE_SIZE).ok_or(FrameError::Truncated {
            field: "event_base",
            needed: EVENT_BASE_SIZE,
            available: bytes.len(),
        })?;
        Ok(EventBase {
            version: LittleEndian::read_i64(&bytes[0..8]),
            timestamp_micros: LittleEndian::read_i64(&bytes[8..16]),
        })
    }
}

/// Get current timestamp in microseconds since Unix epoch
pub fn now_micros() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}
