//! Event frame header format.
//!
//! # Frame Layout
//!
//! ```text
//! ┌────────────┬──────────┬──────────┬──────────┬──────────┐
//! │ Marker (1) │ L1 (2)   │ L2 (2)   │ L3 (2)   │ L4 (4)   │
//! └────────────┴──────────┴──────────┴──────────┴──────────┘
//! ┌─────────────────┬───────────────┬──────────────┬──────────────────┐
//! │ Type code (L1)  │ Identity (L2) │ Base (L3)    │ Event (L4)       │
//! └─────────────────┴───────────────┴──────────────┴──────────────────┘
//! ```
//!
//! All integers are little-endian. L4 is a signed 32-bit length and must be
//! non-negative.

use crate::error::FrameError;
use byteorder::{ByteOrder, LittleEndian};
use std::ops::Range;

/// Size of the fixed frame header in bytes
pub const FRAME_HEADER_SIZE: usize = 11;

/// Transport tag carried in the first byte of every message sharing a channel
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    /// Non-event payload
    Common = 0,
    /// Event frame
    Event = 1,
}

impl TransportType {
    /// Parse a transport tag
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Common),
            1 => Some(Self::Event),
            _ => None,
        }
    }
}

/// Marker byte identifying an event frame
pub const FRAME_MARKER: u8 = TransportType::Event as u8;

/// The four section lengths of an event frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// L1: event type code length
    pub event_type_len: u16,
    /// L2: encoded identity length
    pub identity_len: u16,
    /// L3: base bytes length
    pub base_len: u16,
    /// L4: event bytes length
    pub event_len: u32,
}

impl FrameHeader {
    /// Create a new header.
    pub fn new(event_type_len: u16, identity_len: u16, base_len: u16, event_len: u32) -> Self {
        FrameHeader {
            event_type_len,
            identity_len,
            base_len,
            event_len,
        }
    }

    /// Serialize header (marker included) to bytes.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        bytes[0] = FRAME_MARKER;
        LittleEndian::write_u16(&mut bytes[1..3], self.event_type_len);
        LittleEndian::write_u16(&mut bytes[3..5], self.identity_len);
        LittleEndian::write_u16(&mut bytes[5..7], self.base_len);
        LittleEndian::write_u32(&mut bytes[7..11], self.event_len);
        bytes
    }

    /// Parse the header at the start of `bytes`.
    ///
    /// Returns `Ok(None)` if the buffer is empty or the first byte is not the
    /// event marker.
    pub fn parse(bytes: &[u8]) -> Result<Option<Self>, FrameError> {
        match bytes.first() {
            Some(&FRAME_MARKER) => {}
            _ => return Ok(None),
        }

        let header = bytes
            .get(..FRAME_HEADER_SIZE)
            .ok_or(FrameError::Truncated {
                field: "header",
                needed: FRAME_HEADER_SIZE,
                available: bytes.len(),
            })?;

        let event_len = LittleEndian::read_u32(&header[7..11]);
        if event_len > i32::MAX as u32 {
            return Err(FrameError::EventLengthOutOfRange {
                actual: event_len as usize,
                max: i32::MAX as usize,
            });
        }

        Ok(Some(FrameHeader {
            event_type_len: LittleEndian::read_u16(&header[1..3]),
            identity_len: LittleEndian::read_u16(&header[3..5]),
            base_len: LittleEndian::read_u16(&header[5..7]),
            event_len,
        }))
    }

    /// Byte range of the event type code.
    pub fn event_type_range(&self) -> Range<usize> {
        let start = FRAME_HEADER_SIZE;
        start..start + self.event_type_len as usize
    }

    /// Byte range of the encoded identity.
    pub fn identity_range(&self) -> Range<usize> {
        let start = self.event_type_range().end;
        start..start + self.identity_len as usize
    }

    /// Byte range of the base bytes.
    pub fn base_range(&self) -> Range<usize> {
        let start = self.identity_range().end;
        start..start + self.base_len as usize
    }

    /// Byte range of the event bytes.
    pub fn event_range(&self) -> Range<usize> {
        let start = self.base_range().end;
        start..start + self.event_len as usize
    }

    /// Total frame length: header plus all four sections.
    pub fn total_len(&self) -> usize {
        self.event_range().end
    }
}

/// Slice a section out of `bytes`, bounds-checked.
pub(crate) fn section<'a>(
    bytes: &'a [u8],
    range: Range<usize>,
    field: &'static str,
) -> Result<&'a [u8], FrameError> {
    let needed = range.end;
    bytes.get(range).ok_or(FrameError::Truncated {
        field,
        needed,
        available: bytes.len(),
    })
}
