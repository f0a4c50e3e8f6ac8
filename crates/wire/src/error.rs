//! Frame parsing errors.

use eventgrain_core::{Error, IdentityKind};

/// Errors produced while parsing an event frame.
///
/// A buffer that does not start with the event marker is not an error; the
/// decoders report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// A declared length runs past the end of the buffer
    #[error("Truncated frame: {field} needs {needed} bytes, {available} available")]
    Truncated {
        /// Section being read
        field: &'static str,
        /// Bytes required up to the end of the section
        needed: usize,
        /// Bytes present in the buffer
        available: usize,
    },

    /// Event payload length exceeds the signed 32-bit range or the configured limit
    #[error("Event length {actual} exceeds maximum {max}")]
    EventLengthOutOfRange {
        /// Declared length
        actual: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// A text section is not valid UTF-8
    #[error("Invalid UTF-8 in {field}")]
    InvalidUtf8 {
        /// Section being decoded
        field: &'static str,
    },

    /// Identity bytes cannot be read as the expected representation
    #[error("Invalid {kind} identity: {reason}")]
    InvalidIdentity {
        /// Representation the caller asked for
        kind: IdentityKind,
        /// What went wrong
        reason: String,
    },
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Error::MalformedFrame(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::Truncated {
            field: "event_bytes",
            needed: 40,
            available: 36,
        };
        let msg = err.to_string();
        assert!(msg.contains("event_bytes"));
        assert!(msg.contains("40"));
        assert!(msg.contains("36"));

        let err = FrameError::InvalidIdentity {
            kind: IdentityKind::Uuid,
            reason: "bad text".to_string(),
        };
        assert!(err.to_string().contains("uuid"));
    }

    #[test]
    fn test_frame_error_into_core_error() {
        let err: Error = FrameError::InvalidUtf8 {
            field: "event_type_code",
        }
        .into();
        assert!(matches!(err, Error::MalformedFrame(msg) if msg.contains("event_type_code")));
    }
}
