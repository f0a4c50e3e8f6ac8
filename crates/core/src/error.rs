//! Error types for eventgrain
//!
//! This module defines the error type shared by the codec and the entity
//! lifecycle. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.

use thiserror::Error;

/// Result type alias for eventgrain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for eventgrain
#[derive(Debug, Error)]
pub enum Error {
    /// The identity value is not one of the supported representations
    /// (64-bit integer, UUID, string). Signals a caller/schema bug.
    #[error("Unsupported identity type for event {event_type_code}")]
    UnsupportedIdentityType {
        /// Event type code the identity was attached to
        event_type_code: String,
    },

    /// A frame section does not fit its length field
    #[error("Field {field} too large: {actual} bytes exceeds maximum {max}")]
    FieldTooLarge {
        /// Frame section name
        field: &'static str,
        /// Actual section length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Frame bytes could not be parsed
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Serialization/deserialization error for event payloads
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Operation requires an active entity
    #[error("Entity is not active (state: {state})")]
    NotActive {
        /// Lifecycle state observed when the call was rejected
        state: &'static str,
    },

    /// The entity's history has been archived; no further events are accepted
    #[error("Entity {identity} is archived")]
    EntityArchived {
        /// Display form of the identity
        identity: String,
    },

    /// The runtime has no snapshot for the identity
    #[error("No snapshot materialized for entity {identity}")]
    SnapshotMissing {
        /// Display form of the identity
        identity: String,
    },

    /// Runtime failure (commit, replay, archival)
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Repository failure during hydration fallback
    #[error("Repository error: {0}")]
    Repository(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unsupported_identity() {
        let err = Error::UnsupportedIdentityType {
            event_type_code: "OrderCreated".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Unsupported identity type"));
        assert!(msg.contains("OrderCreated"));
    }

    #[test]
    fn test_error_display_field_too_large() {
        let err = Error::FieldTooLarge {
            field: "base_bytes",
            actual: 70000,
            max: 65535,
        };
        let msg = err.to_string();
        assert!(msg.contains("base_bytes"));
        assert!(msg.contains("70000"));
        assert!(msg.contains("65535"));
    }

    #[test]
    fn test_error_display_malformed_frame() {
        let err = Error::MalformedFrame("truncated".to_string());
        assert!(err.to_string().contains("Malformed frame: truncated"));
    }

    #[test]
    fn test_error_display_not_active() {
        let err = Error::NotActive {
            state: "uninitialized",
        };
        assert!(err.to_string().contains("uninitialized"));
    }

    #[test]
    fn test_error_pattern_matching() {
        let err = Error::EntityArchived {
            identity: "42".to_string(),
        };

        match err {
            Error::EntityArchived { identity } => assert_eq!(identity, "42"),
            _ => panic!("Wrong error variant"),
        }
    }
}
