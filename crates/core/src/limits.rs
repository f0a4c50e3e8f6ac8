//! Size limits for event frame sections
//!
//! Each frame section is preceded by a fixed-width length field, which caps
//! its size. Violations result in `FieldTooLarge` errors at encode time.
//!
//! ## Contract
//!
//! These limits are part of the wire format and cannot change without a
//! format version bump.

use crate::error::{Error, Result};

/// Maximum event type code length in bytes (u16 length field)
pub const MAX_EVENT_TYPE_BYTES: usize = u16::MAX as usize;

/// Maximum encoded identity length in bytes (u16 length field)
pub const MAX_IDENTITY_BYTES: usize = u16::MAX as usize;

/// Maximum base (header/metadata) section length in bytes (u16 length field)
pub const MAX_BASE_BYTES: usize = u16::MAX as usize;

/// Maximum event payload length in bytes (signed 32-bit length field)
pub const MAX_EVENT_BYTES: usize = i32::MAX as usize;

/// Check that a section fits under `max`.
pub fn check_section(field: &'static str, actual: usize, max: usize) -> Result<()> {
    if actual > max {
        return Err(Error::FieldTooLarge { field, actual, max });
    }
    Ok(())
}
