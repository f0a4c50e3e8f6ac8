//! eventgrain - Event envelopes and event-sourced entities
//!
//! Two layers, usable separately:
//!
//! - Envelope codec: a compact binary frame carrying an event type code, an
//!   entity identity (int64, UUID or string), an opaque base header and an
//!   opaque event payload. Any consumer can skip a frame's identity without
//!   knowing its type.
//! - Entity lifecycle: [`EventSourcedEntity`] turns create/update/delete
//!   commands into snapshot events, hydrates from history or a fallback,
//!   and archives when its lifecycle ends.
//!
//! # Quick Start
//!
//! ```
//! use eventgrain::{EventEnvelope, FrameCodec};
//!
//! let codec = FrameCodec::default();
//! let envelope = EventEnvelope::new("A", 42i64, vec![0x01], vec![0xFF, 0xEE]);
//! let bytes = codec.encode(&envelope)?;
//! assert_eq!(bytes.len(), 23);
//!
//! let payload = codec.decode_without_identity(&bytes)?.unwrap();
//! assert_eq!(payload.event_type_code, "A");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - `eventgrain-core`: errors, identity types, size limits
//! - `eventgrain-wire`: frame header, identity codec, frame codec
//! - `eventgrain-engine`: entities, runtime traits, in-memory runtime

pub use eventgrain_core::{
    Error, Identity, IdentityKind, IdentityValue, Result, MAX_BASE_BYTES, MAX_EVENT_BYTES,
    MAX_EVENT_TYPE_BYTES, MAX_IDENTITY_BYTES,
};
pub use eventgrain_engine::{
    ActorRuntime, ArchiveMode, DefaultFallback, EntityCapabilities, EntityState,
    EventSourcedEntity, FnFallback, HydrationFallback, Mapper, MemoryRuntime, Repository,
    RepositoryFactory, RepositoryFallback, RuntimeConfig, RuntimeConfigError, Snapshot,
    SnapshotEvent,
};
pub use eventgrain_wire::{
    CodecConfig, CodecConfigError, EventBase, EventEnvelope, EventPayload, FrameCodec,
    FrameError, FrameHeader, TransportType, FRAME_HEADER_SIZE, FRAME_MARKER,
};
