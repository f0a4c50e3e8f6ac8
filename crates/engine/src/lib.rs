//! Event-sourced entities for eventgrain
//!
//! This crate composes the codec with an actor runtime:
//! - Entity lifecycle: activate, create/read/update/delete, archive
//! - Snapshot events raised by entities and applied by the runtime
//! - Hydration fallbacks for entities without history
//! - An in-memory runtime that keeps framed event logs per identity
//!
//! Entities never lock. Per-identity serialization is the runtime's job.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod entity;
pub mod event;
pub mod hydration;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use config::{RuntimeConfig, RuntimeConfigError};
pub use entity::{EntityCapabilities, EntityState, EventSourcedEntity};
pub use event::{SnapshotEvent, CREATING_SNAPSHOT, DELETING_SNAPSHOT, UPDATING_SNAPSHOT};
pub use hydration::{DefaultFallback, FnFallback, RepositoryFallback};
pub use memory::MemoryRuntime;
pub use snapshot::Snapshot;
pub use traits::{
    ActorRuntime, ArchiveMode, HydrationFallback, Mapper, Repository, RepositoryFactory,
};
