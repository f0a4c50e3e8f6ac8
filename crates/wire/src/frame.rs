//! Event envelope encoding and decoding
//!
//! An envelope packages one event with its routing metadata into a
//! self-contained frame (layout in [`crate::header`]). Frames share
//! transports with other payloads, so the decoders never fail on foreign
//! input: a buffer without the event marker decodes to `Ok(None)`.
//!
//! Decoded sections are owned copies. A decoded envelope stays valid after
//! the input buffer is released or reused.

use crate::config::{CodecConfig, CodecConfigError};
use crate::error::FrameError;
use crate::header::{section, FrameHeader};
use crate::identity::{decode_identity, encoded_len, write_identity};
use crate::pool::BufferPool;
use eventgrain_core::limits::check_section;
use eventgrain_core::{
    Identity, IdentityValue, Result, MAX_BASE_BYTES, MAX_EVENT_TYPE_BYTES, MAX_IDENTITY_BYTES,
};
use std::any::Any;
use tracing::trace;

/// One event and its routing metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEnvelope<K> {
    /// Event type code (UTF-8)
    pub event_type_code: String,
    /// Identity of the entity the event belongs to
    pub identity: K,
    /// Opaque header/metadata bytes
    pub base_bytes: Vec<u8>,
    /// Opaque serialized event payload
    pub event_bytes: Vec<u8>,
}

impl<K: IdentityValue> EventEnvelope<K> {
    /// Create a new envelope.
    pub fn new(
        event_type_code: impl Into<String>,
        identity: K,
        base_bytes: Vec<u8>,
        event_bytes: Vec<u8>,
    ) -> Self {
        EventEnvelope {
            event_type_code: event_type_code.into(),
            identity,
            base_bytes,
            event_bytes,
        }
    }

    /// Encoded frame length.
    pub fn encoded_len(&self) -> usize {
        crate::header::FRAME_HEADER_SIZE
            + self.event_type_code.len()
            + encoded_len(&self.identity.to_identity())
            + self.base_bytes.len()
            + self.event_bytes.len()
    }

    /// Encode with the default codec.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        FrameCodec::default().encode(self)
    }

    /// Decode with the default codec, reading the identity as `K`.
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Option<Self>, FrameError> {
        FrameCodec::default().decode_with_identity(bytes)
    }
}

/// The identity-free view of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPayload {
    /// Event type code (UTF-8)
    pub event_type_code: String,
    /// Opaque header/metadata bytes
    pub base_bytes: Vec<u8>,
    /// Opaque serialized event payload
    pub event_bytes: Vec<u8>,
}

/// Borrowed sections of a parsed frame.
struct RawFrame<'a> {
    event_type: &'a [u8],
    identity: &'a [u8],
    base: &'a [u8],
    event: &'a [u8],
}

impl RawFrame<'_> {
    fn event_type_code(&self) -> std::result::Result<String, FrameError> {
        std::str::from_utf8(self.event_type)
            .map(str::to_string)
            .map_err(|_| FrameError::InvalidUtf8 {
                field: "event_type_code",
            })
    }
}

/// Event frame codec.
///
/// Stateless apart from its configuration; cheap to clone and safe to share.
#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    config: CodecConfig,
}

impl FrameCodec {
    /// Create a codec with a validated configuration.
    pub fn new(config: CodecConfig) -> std::result::Result<Self, CodecConfigError> {
        config.validate()?;
        Ok(FrameCodec { config })
    }

    /// Codec configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode an envelope into a frame.
    ///
    /// # Errors
    ///
    /// `FieldTooLarge` if any section exceeds its length field.
    pub fn encode<K: IdentityValue>(&self, envelope: &EventEnvelope<K>) -> Result<Vec<u8>> {
        self.encode_parts(
            &envelope.event_type_code,
            &envelope.identity.to_identity(),
            &envelope.base_bytes,
            &envelope.event_bytes,
        )
    }

    /// Encode a frame whose identity is only known dynamically.
    ///
    /// # Errors
    ///
    /// `UnsupportedIdentityType` if `identity` is not an `i64`, `Uuid`,
    /// `String` or `&'static str`; `FieldTooLarge` as for [`encode`](Self::encode).
    pub fn encode_dyn(
        &self,
        event_type_code: &str,
        identity: &dyn Any,
        base_bytes: &[u8],
        event_bytes: &[u8],
    ) -> Result<Vec<u8>> {
        let identity = Identity::from_dyn(identity, event_type_code)?;
        self.encode_parts(event_type_code, &identity, base_bytes, event_bytes)
    }

    /// Encode a frame from its four sections.
    pub fn encode_parts(
        &self,
        event_type_code: &str,
        identity: &Identity,
        base_bytes: &[u8],
        event_bytes: &[u8],
    ) -> Result<Vec<u8>> {
        let type_bytes = event_type_code.as_bytes();
        let identity_len = encoded_len(identity);

        check_section("event_type_code", type_bytes.len(), MAX_EVENT_TYPE_BYTES)?;
        check_section("identity", identity_len, MAX_IDENTITY_BYTES)?;
        check_section("base_bytes", base_bytes.len(), MAX_BASE_BYTES)?;
        check_section("event_bytes", event_bytes.len(), self.config.max_event_bytes)?;

        // Lengths checked above; the casts cannot truncate.
        let header = FrameHeader::new(
            type_bytes.len() as u16,
            identity_len as u16,
            base_bytes.len() as u16,
            event_bytes.len() as u32,
        );

        let mut buf = BufferPool::acquire(
            header.total_len(),
            self.config.max_retained_buffer_bytes,
        );
        buf.extend_from_slice(&header.to_bytes());
        buf.extend_from_slice(type_bytes);
        write_identity(identity, &mut buf);
        buf.extend_from_slice(base_bytes);
        buf.extend_from_slice(event_bytes);
        debug_assert_eq!(buf.len(), header.total_len());

        trace!(
            target: "eventgrain::wire",
            event_type = event_type_code,
            len = buf.len(),
            "Encoded event frame"
        );
        Ok(buf.to_vec())
    }

    /// Decode a frame, reading the identity as `K`.
    ///
    /// Returns `Ok(None)` if `bytes` is not an event frame.
    pub fn decode_with_identity<K: IdentityValue>(
        &self,
        bytes: &[u8],
    ) -> std::result::Result<Option<EventEnvelope<K>>, FrameError> {
        let raw = match self.split(bytes)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let identity = decode_identity(raw.identity, K::KIND)?;
        let identity = K::from_identity(identity).ok_or_else(|| FrameError::InvalidIdentity {
            kind: K::KIND,
            reason: "representation mismatch".to_string(),
        })?;

        Ok(Some(EventEnvelope {
            event_type_code: raw.event_type_code()?,
            identity,
            base_bytes: raw.base.to_vec(),
            event_bytes: raw.event.to_vec(),
        }))
    }

    /// Decode a frame without interpreting its identity section.
    ///
    /// Returns `Ok(None)` if `bytes` is not an event frame.
    pub fn decode_without_identity(
        &self,
        bytes: &[u8],
    ) -> std::result::Result<Option<EventPayload>, FrameError> {
        let raw = match self.split(bytes)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        Ok(Some(EventPayload {
            event_type_code: raw.event_type_code()?,
            base_bytes: raw.base.to_vec(),
            event_bytes: raw.event.to_vec(),
        }))
    }

    /// Read only the identity of a frame, as `K`.
    ///
    /// Base and event sections are not inspected, so a frame truncated after
    /// its identity still yields the identity.
    pub fn peek_identity<K: IdentityValue>(
        &self,
        bytes: &[u8],
    ) -> std::result::Result<Option<K>, FrameError> {
        let header = match FrameHeader::parse(bytes)? {
            Some(header) => header,
            None => return Ok(None),
        };
        let raw = section(bytes, header.identity_range(), "identity")?;
        let identity = decode_identity(raw, K::KIND)?;
        K::from_identity(identity)
            .map(Some)
            .ok_or_else(|| FrameError::InvalidIdentity {
                kind: K::KIND,
                reason: "representation mismatch".to_string(),
            })
    }

    fn split<'a>(&self, bytes: &'a [u8]) -> std::result::Result<Option<RawFrame<'a>>, FrameError> {
        let header = match FrameHeader::parse(bytes)? {
            Some(header) => header,
            None => return Ok(None),
        };

        if header.event_len as usize > self.config.max_event_bytes {
            return Err(FrameError::EventLengthOutOfRange {
                actual: header.event_len as usize,
                max: self.config.max_event_bytes,
            });
        }

        Ok(Some(RawFrame {
            event_type: section(bytes, header.event_type_range(), "event_type_code")?,
            identity: section(bytes, header.identity_range(), "identity")?,
            base: section(bytes, header.base_range(), "base_bytes")?,
            event: section(bytes, header.event_range(), "event_bytes")?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{FRAME_HEADER_SIZE, FRAME_MARKER};
    use eventgrain_core::Error;
    use uuid::Uuid;

    fn order_created() -> EventEnvelope<i64> {
        EventEnvelope::new("OrderCreated", 42, vec![0x01, 0x02], vec![0x10, 0x20, 0x30])
    }

    #[test]
    fn test_worked_example() {
        let envelope = order_created();
        let bytes = envelope.to_bytes().unwrap();

        assert_eq!(bytes.len(), 36);
        assert_eq!(bytes.len(), envelope.encoded_len());
        assert_eq!(bytes[0], FRAME_MARKER);
        assert_eq!(&bytes[1..3], &12u16.to_le_bytes());
        assert_eq!(&bytes[3..5], &8u16.to_le_bytes());
        assert_eq!(&bytes[5..7], &2u16.to_le_bytes());
        assert_eq!(&bytes[7..11], &3u32.to_le_bytes());
        assert_eq!(&bytes[11..23], b"OrderCreated");
        assert_eq!(&bytes[23..31], &42i64.to_le_bytes());
        assert_eq!(&bytes[31..33], &[1, 2]);
        assert_eq!(&bytes[33..36], &[16, 32, 48]);

        let decoded = EventEnvelope::<i64>::from_bytes(&bytes).unwrap().unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_roundtrip_uuid_and_string() {
        let codec = FrameCodec::default();

        let uuid_env = EventEnvelope::new("E", Uuid::new_v4(), vec![9], vec![8, 7]);
        let bytes = codec.encode(&uuid_env).unwrap();
        assert_eq!(bytes.len(), FRAME_HEADER_SIZE + 1 + 36 + 1 + 2);
        assert_eq!(codec.decode_with_identity::<Uuid>(&bytes).unwrap(), Some(uuid_env));

        let str_env = EventEnvelope::new("E", "order-7".to_string(), vec![], vec![]);
        let bytes = codec.encode(&str_env).unwrap();
        assert_eq!(codec.decode_with_identity::<String>(&bytes).unwrap(), Some(str_env));
    }

    #[test]
    fn test_empty_sections() {
        let envelope = EventEnvelope::new("", String::new(), vec![], vec![]);
        let bytes = envelope.to_bytes().unwrap();
        assert_eq!(bytes.len(), FRAME_HEADER_SIZE);

        let decoded = EventEnvelope::<String>::from_bytes(&bytes).unwrap().unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_not_a_frame() {
        let codec = FrameCodec::default();
        let mut bytes = order_created().to_bytes().unwrap();
        bytes[0] = 0;

        assert_eq!(codec.decode_with_identity::<i64>(&bytes).unwrap(), None);
        assert_eq!(codec.decode_without_identity(&bytes).unwrap(), None);
        assert_eq!(codec.peek_identity::<i64>(&bytes).unwrap(), None);
        assert_eq!(codec.decode_without_identity(&[]).unwrap(), None);
    }

    #[test]
    fn test_truncated_frame_every_cut() {
        let codec = FrameCodec::default();
        let bytes = order_created().to_bytes().unwrap();

        for cut in 1..bytes.len() {
            let result = codec.decode_with_identity::<i64>(&bytes[..cut]);
            assert!(
                matches!(result, Err(FrameError::Truncated { .. })),
                "cut at {} should be truncated, got {:?}",
                cut,
                result
            );
            assert!(codec.decode_without_identity(&bytes[..cut]).is_err());
        }
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = order_created().to_bytes().unwrap();
        bytes.extend_from_slice(b"trailer");
        let decoded = EventEnvelope::<i64>::from_bytes(&bytes).unwrap().unwrap();
        assert_eq!(decoded, order_created());
    }

    #[test]
    fn test_decode_without_identity() {
        let payload = FrameCodec::default()
            .decode_without_identity(&order_created().to_bytes().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(payload.event_type_code, "OrderCreated");
        assert_eq!(payload.base_bytes, vec![1, 2]);
        assert_eq!(payload.event_bytes, vec![16, 32, 48]);
    }

    #[test]
    fn test_peek_identity_tolerates_missing_payload() {
        let bytes = order_created().to_bytes().unwrap();
        let codec = FrameCodec::default();
        // Cut inside the base section; identity is complete.
        assert_eq!(codec.peek_identity::<i64>(&bytes[..32]).unwrap(), Some(42));
    }

    #[test]
    fn test_decoded_values_outlive_input() {
        let decoded = {
            let bytes = order_created().to_bytes().unwrap();
            EventEnvelope::<i64>::from_bytes(&bytes).unwrap().unwrap()
        };
        assert_eq!(decoded.event_bytes, vec![16, 32, 48]);
    }

    #[test]
    fn test_invalid_utf8_type_code() {
        let mut bytes = EventEnvelope::new("ab", 1i64, vec![], vec![])
            .to_bytes()
            .unwrap();
        bytes[11] = 0xC3;
        bytes[12] = 0x28;
        assert!(matches!(
            EventEnvelope::<i64>::from_bytes(&bytes),
            Err(FrameError::InvalidUtf8 {
                field: "event_type_code"
            })
        ));
    }

    #[test]
    fn test_encode_rejects_oversized_sections() {
        let codec = FrameCodec::default();

        let long_type = "x".repeat(MAX_EVENT_TYPE_BYTES + 1);
        let result = codec.encode(&EventEnvelope::new(long_type, 1i64, vec![], vec![]));
        assert!(matches!(
            result,
            Err(Error::FieldTooLarge {
                field: "event_type_code",
                ..
            })
        ));

        let result = codec.encode(&EventEnvelope::new(
            "E",
            "k".repeat(MAX_IDENTITY_BYTES + 1),
            vec![],
            vec![],
        ));
        assert!(matches!(
            result,
            Err(Error::FieldTooLarge {
                field: "identity",
                ..
            })
        ));

        let result = codec.encode(&EventEnvelope::new(
            "E",
            1i64,
            vec![0; MAX_BASE_BYTES + 1],
            vec![],
        ));
        assert!(matches!(
            result,
            Err(Error::FieldTooLarge {
                field: "base_bytes",
                ..
            })
        ));
    }

    #[test]
    fn test_base_section_at_limit() {
        let envelope = EventEnvelope::new("E", 1i64, vec![0xAB; MAX_BASE_BYTES], vec![]);
        let bytes = envelope.to_bytes().unwrap();
        assert_eq!(bytes.len(), FRAME_HEADER_SIZE + 1 + 8 + MAX_BASE_BYTES);
        assert_eq!(EventEnvelope::from_bytes(&bytes).unwrap(), Some(envelope));
    }

    #[test]
    fn test_configured_event_limit() {
        let codec = FrameCodec::new(CodecConfig::for_testing()).unwrap();
        let limit = codec.config().max_event_bytes;

        let too_big = EventEnvelope::new("E", 1i64, vec![], vec![0; limit + 1]);
        assert!(matches!(
            codec.encode(&too_big),
            Err(Error::FieldTooLarge {
                field: "event_bytes",
                ..
            })
        ));

        let frame = FrameCodec::default().encode(&too_big).unwrap();
        assert!(matches!(
            codec.decode_without_identity(&frame),
            Err(FrameError::EventLengthOutOfRange { .. })
        ));
    }

    #[test]
    fn test_encode_dyn() {
        let codec = FrameCodec::default();
        let id: i64 = 42;
        let bytes = codec
            .encode_dyn("OrderCreated", &id, &[1, 2], &[16, 32, 48])
            .unwrap();
        assert_eq!(bytes, order_created().to_bytes().unwrap());

        let bad: f64 = 4.2;
        match codec.encode_dyn("OrderCreated", &bad, &[], &[]) {
            Err(Error::UnsupportedIdentityType { event_type_code }) => {
                assert_eq!(event_type_code, "OrderCreated")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_encode_returns_buffer_to_pool() {
        BufferPool::clear();
        let _ = order_created().to_bytes().unwrap();
        assert_eq!(BufferPool::pool_size(), 1);
    }

    #[test]
    fn test_oversized_section_rejected_before_buffer_acquired() {
        BufferPool::clear();
        let result = FrameCodec::default().encode(&EventEnvelope::new(
            "E",
            1i64,
            vec![0; MAX_BASE_BYTES + 1],
            vec![],
        ));
        assert!(matches!(result, Err(Error::FieldTooLarge { field: "base_bytes", .. })));
        // Sizes are checked up front, so no buffer was ever taken from the pool.
        assert_eq!(BufferPool::pool_size(), 0);
    }
}
