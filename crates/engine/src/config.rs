//! Runtime configuration.

use eventgrain_wire::{CodecConfig, CodecConfigError};

/// In-memory runtime configuration parameters.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Maximum live frames kept per identity (default: 0, unbounded).
    ///
    /// Raising an event past the limit fails with a runtime error. Archiving
    /// clears the live log.
    pub max_log_frames: usize,

    /// Frame codec settings used for the event log.
    pub codec: CodecConfig,
}

impl RuntimeConfig {
    /// Create a new runtime configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum live frames per identity (builder pattern).
    pub fn with_max_log_frames(mut self, frames: usize) -> Self {
        self.max_log_frames = frames;
        self
    }

    /// Set codec configuration (builder pattern).
    pub fn with_codec(mut self, codec: CodecConfig) -> Self {
        self.codec = codec;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), RuntimeConfigError> {
        self.codec.validate()?;
        Ok(())
    }

    /// Create a configuration suited to tests (small limits).
    pub fn for_testing() -> Self {
        RuntimeConfig {
            max_log_frames: 1024,
            codec: CodecConfig::for_testing(),
        }
    }

    /// True if `live` frames already fill the log.
    pub(crate) fn log_full(&self, live: usize) -> bool {
        self.max_log_frames != 0 && live >= self.max_log_frames
    }
}

/// Runtime configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeConfigError {
    /// Codec settings are invalid.
    #[error("Invalid codec configuration: {0}")]
    Codec(#[from] CodecConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_log_frames, 0);
        assert!(!config.log_full(usize::MAX));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = RuntimeConfig::new()
            .with_max_log_frames(2)
            .with_codec(CodecConfig::new().with_max_event_bytes(128));

        assert_eq!(config.codec.max_event_bytes, 128);
        assert!(!config.log_full(1));
        assert!(config.log_full(2));
    }

    #[test]
    fn test_validation_codec() {
        let config =
            RuntimeConfig::new().with_codec(CodecConfig::new().with_max_retained_buffer_bytes(0));
        assert_eq!(
            config.validate(),
            Err(RuntimeConfigError::Codec(CodecConfigError::ZeroRetainedBuffer))
        );
    }

    #[test]
    fn test_testing_config() {
        assert!(RuntimeConfig::for_testing().validate().is_ok());
    }
}
