//! Wire format for eventgrain
//!
//! This crate owns every byte that crosses a process boundary:
//!
//! - Event frames: fixed 11-byte header followed by type code, identity,
//!   base and event sections (see [`header`])
//! - Identity codec: int64 / UUID / string identities to and from bytes
//! - Event base: the version/timestamp header carried in the base section
//! - Frame buffer pool: thread-local reusable buffers for frame assembly

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod base;
pub mod config;
pub mod error;
pub mod frame;
pub mod header;
pub mod identity;
pub mod pool;

pub use base::{now_micros, EventBase, EVENT_BASE_SIZE};
pub use config::{CodecConfig, CodecConfigError};
pub use error::FrameError;
pub use frame::{EventEnvelope, EventPayload, FrameCodec};
pub use header::{FrameHeader, TransportType, FRAME_HEADER_SIZE, FRAME_MARKER};
pub use identity::{decode_identity, encode_identity};
pub use pool::{BufferPool, PooledBuffer};
