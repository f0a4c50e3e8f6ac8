//! Identity codec
//!
//! | Representation | Wire bytes |
//! |---|---|
//! | `Int(i64)` | 8 bytes, little-endian |
//! | `Str(String)` | UTF-8 bytes |
//! | `Uuid(Uuid)` | canonical lowercase hyphenated text (36 bytes), UTF-8 |
//!
//! Identity bytes carry no type tag. Decoding trusts the [`IdentityKind`]
//! supplied by the caller.

use crate::error::FrameError;
use byteorder::{ByteOrder, LittleEndian};
use eventgrain_core::{Identity, IdentityKind};
use uuid::Uuid;

/// Length of an encoded int64 identity
pub const INT_IDENTITY_LEN: usize = 8;

/// Length of an encoded UUID identity
pub const UUID_IDENTITY_LEN: usize = uuid::fmt::Hyphenated::LENGTH;

/// Number of bytes `identity` occupies on the wire.
pub fn encoded_len(identity: &Identity) -> usize {
    match identity {
        Identity::Int(_) => INT_IDENTITY_LEN,
        Identity::Uuid(_) => UUID_IDENTITY_LEN,
        Identity::Str(s) => s.len(),
    }
}

/// Append the wire form of `identity` to `buf`.
pub fn write_identity(identity: &Identity, buf: &mut Vec<u8>) {
    match identity {
        Identity::Int(id) => buf.extend_from_slice(&id.to_le_bytes()),
        Identity::Uuid(id) => {
            let mut text = Uuid::encode_buffer();
            buf.extend_from_slice(id.hyphenated().encode_lower(&mut text).as_bytes());
        }
        Identity::Str(id) => buf.extend_from_slice(id.as_bytes()),
    }
}

/// Encode `identity` to a fresh byte vector.
pub fn encode_identity(identity: &Identity) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(identity));
    write_identity(identity, &mut buf);
    buf
}

/// Decode identity bytes as the representation `kind`.
pub fn decode_identity(bytes: &[u8], kind: IdentityKind) -> Result<Identity, FrameError> {
    match kind {
        IdentityKind::Int => {
            if bytes.len() != INT_IDENTITY_LEN {
                return Err(FrameError::InvalidIdentity {
                    kind,
                    reason: format!("expected {} bytes, got {}", INT_IDENTITY_LEN, bytes.len()),
                });
            }
            Ok(Identity::Int(LittleEndian::read_i64(bytes)))
        }
        IdentityKind::Uuid => {
            let text = std::str::from_utf8(bytes).map_err(|_| FrameError::InvalidIdentity {
                kind,
                reason: "not UTF-8".to_string(),
            })?;
            let id = Uuid::parse_str(text).map_err(|e| FrameError::InvalidIdentity {
                kind,
                reason: e.to_string(),
            })?;
            Ok(Identity::Uuid(id))
        }
        IdentityKind::Str => {
            let text = std::str::from_utf8(bytes).map_err(|_| FrameError::InvalidUtf8 {
                field: "identity",
            })?;
            Ok(Identity::Str(text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_identity_little_endian() {
        let bytes = encode_identity(&Identity::Int(42));
        assert_eq!(bytes, vec![42, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            decode_identity(&bytes, IdentityKind::Int).unwrap(),
            Identity::Int(42)
        );

        let bytes = encode_identity(&Identity::Int(-1));
        assert_eq!(bytes, vec![0xFF; 8]);
    }

    #[test]
    fn test_uuid_identity_is_canonical_utf8_text() {
        let id = Uuid::parse_str("67E55044-10B1-426F-9247-BB680E5FE0C8").unwrap();
        let bytes = encode_identity(&Identity::Uuid(id));
        assert_eq!(bytes.len(), UUID_IDENTITY_LEN);
        assert_eq!(bytes, b"67e55044-10b1-426f-9247-bb680e5fe0c8".to_vec());
        assert_eq!(
            decode_identity(&bytes, IdentityKind::Uuid).unwrap(),
            Identity::Uuid(id)
        );
    }

    #[test]
    fn test_uuid_identity_accepts_uppercase_text() {
        let bytes = b"67E55044-10B1-426F-9247-BB680E5FE0C8";
        let decoded = decode_identity(bytes, IdentityKind::Uuid).unwrap();
        assert_eq!(decoded.kind(), IdentityKind::Uuid);
    }

    #[test]
    fn test_string_identity_utf8() {
        let identity = Identity::Str("commande-é".to_string());
        let bytes = encode_identity(&identity);
        assert_eq!(bytes.len(), encoded_len(&identity));
        assert_eq!(decode_identity(&bytes, IdentityKind::Str).unwrap(), identity);
    }

    #[test]
    fn test_empty_string_identity() {
        let bytes = encode_identity(&Identity::Str(String::new()));
        assert!(bytes.is_empty());
        assert_eq!(
            decode_identity(&bytes, IdentityKind::Str).unwrap(),
            Identity::Str(String::new())
        );
    }

    #[test]
    fn test_int_identity_wrong_length() {
        let result = decode_identity(b"abc", IdentityKind::Int);
        assert!(matches!(
            result,
            Err(FrameError::InvalidIdentity {
                kind: IdentityKind::Int,
                ..
            })
        ));
    }

    #[test]
    fn test_uuid_identity_garbage() {
        assert!(decode_identity(b"not-a-uuid", IdentityKind::Uuid).is_err());
        assert!(decode_identity(&[0xFF, 0xFE], IdentityKind::Uuid).is_err());
    }

    #[test]
    fn test_string_identity_invalid_utf8() {
        assert!(matches!(
            decode_identity(&[0xC3, 0x28], IdentityKind::Str),
            Err(FrameError::InvalidUtf8 { field: "identity" })
        ));
    }

    #[test]
    fn test_mismatched_kind_is_not_detected() {
        // Eight bytes of text read as an int64 identity: no tag, no error.
        let bytes = encode_identity(&Identity::Str("abcdefgh".to_string()));
        let decoded = decode_identity(&bytes, IdentityKind::Int).unwrap();
        assert_eq!(decoded.kind(), IdentityKind::Int);
    }
}
