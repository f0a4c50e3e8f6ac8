//! Frame codec configuration.

use eventgrain_core::MAX_EVENT_BYTES;

/// Frame codec configuration parameters.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum event payload length in bytes (default: 2^31 - 1).
    ///
    /// Applied on both encode and decode. Cannot exceed the range of the
    /// signed 32-bit length field.
    pub max_event_bytes: usize,

    /// Largest buffer capacity returned to the pool (default: 1MB).
    ///
    /// Buffers that grew past this while encoding a large frame are freed
    /// instead of pooled.
    pub max_retained_buffer_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_event_bytes: MAX_EVENT_BYTES,
            max_retained_buffer_bytes: 1024 * 1024, // 1MB
        }
    }
}

impl CodecConfig {
    /// Create a new codec configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum event payload length (builder pattern).
    pub fn with_max_event_bytes(mut self, bytes: usize) -> Self {
        self.max_event_bytes = bytes;
        self
    }

    /// Set maximum pooled buffer capacity (builder pattern).
    pub fn with_max_retained_buffer_bytes(mut self, bytes: usize) -> Self {
        self.max_retained_buffer_bytes = bytes;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), CodecConfigError> {
        if self.max_event_bytes > MAX_EVENT_BYTES {
            return Err(CodecConfigError::EventLimitExceedsWireFormat);
        }
        if self.max_retained_buffer_bytes == 0 {
            return Err(CodecConfigError::ZeroRetainedBuffer);
        }
        Ok(())
    }

    /// Create a configuration suited to tests (small limits).
    pub fn for_testing() -> Self {
        CodecConfig {
            max_event_bytes: 64 * 1024,           // 64KB
            max_retained_buffer_bytes: 16 * 1024, // 16KB
        }
    }
}

/// Codec configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecConfigError {
    /// Event limit is larger than the signed 32-bit length field allows.
    #[error("Event limit cannot exceed 2^31 - 1 bytes")]
    EventLimitExceedsWireFormat,

    /// Retained buffer capacity is zero, which disables pooling entirely.
    #[error("Retained buffer capacity must be non-zero")]
    ZeroRetainedBuffer,
}
