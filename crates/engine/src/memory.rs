//! In-memory actor runtime
//!
//! Hosts snapshots and framed event logs for any number of identities.
//! Each identity owns a cell behind its own mutex, so operations on one
//! entity are serialized while different entities proceed in parallel.
//!
//! Every raised event is written as an event frame:
//! - type code: [`SnapshotEvent::event_type_code`]
//! - identity: the entity identity
//! - base: [`EventBase`] with the produced version and commit time
//! - event: MessagePack encoding of the event
//!
//! Replay decodes the live frames and folds them from a default snapshot.

use crate::config::{RuntimeConfig, RuntimeConfigError};
use crate::event::SnapshotEvent;
use crate::snapshot::Snapshot;
use crate::traits::{ActorRuntime, ArchiveMode};
use dashmap::DashMap;
use eventgrain_core::{Error, IdentityValue, Result};
use eventgrain_wire::{now_micros, EventBase, EventEnvelope, FrameCodec};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-identity storage.
struct EntityCell<K, S> {
    snapshot: Option<Snapshot<K, S>>,
    live: Vec<Vec<u8>>,
    archived: Vec<Vec<u8>>,
    over: bool,
}

impl<K, S> EntityCell<K, S> {
    fn new() -> Self {
        EntityCell {
            snapshot: None,
            live: Vec::new(),
            archived: Vec::new(),
            over: false,
        }
    }
}

/// Actor runtime that keeps everything in process memory.
pub struct MemoryRuntime<K, S> {
    cells: DashMap<K, Arc<Mutex<EntityCell<K, S>>>>,
    codec: FrameCodec,
    config: RuntimeConfig,
}

impl<K, S> MemoryRuntime<K, S>
where
    K: IdentityValue + Serialize + DeserializeOwned,
    S: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a runtime with default configuration.
    pub fn new() -> Self {
        MemoryRuntime {
            cells: DashMap::new(),
            codec: FrameCodec::default(),
            config: RuntimeConfig::default(),
        }
    }

    /// Create a runtime with explicit configuration.
    pub fn with_config(config: RuntimeConfig) -> std::result::Result<Self, RuntimeConfigError> {
        config.validate()?;
        Ok(MemoryRuntime {
            cells: DashMap::new(),
            codec: FrameCodec::new(config.codec.clone())?,
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Encoded frames of the live event log.
    pub fn live_frames(&self, identity: &K) -> Vec<Vec<u8>> {
        self.existing(identity)
            .map(|cell| cell.lock().live.clone())
            .unwrap_or_default()
    }

    /// Encoded frames moved aside by [`ArchiveMode::ArchiveEvents`].
    pub fn archived_frames(&self, identity: &K) -> Vec<Vec<u8>> {
        self.existing(identity)
            .map(|cell| cell.lock().archived.clone())
            .unwrap_or_default()
    }

    /// Number of events in the live log.
    pub fn event_count(&self, identity: &K) -> usize {
        self.existing(identity)
            .map(|cell| cell.lock().live.len())
            .unwrap_or(0)
    }

    /// True once the identity has been archived.
    pub fn is_archived(&self, identity: &K) -> bool {
        self.existing(identity)
            .map(|cell| cell.lock().over)
            .unwrap_or(false)
    }

    /// Number of identities the runtime has seen.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no identity has been touched yet.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn existing(&self, identity: &K) -> Option<Arc<Mutex<EntityCell<K, S>>>> {
        self.cells.get(identity).map(|cell| Arc::clone(cell.value()))
    }

    fn cell(&self, identity: &K) -> Arc<Mutex<EntityCell<K, S>>> {
        // Clone the Arc out so the shard guard is released before locking.
        let entry = self
            .cells
            .entry(identity.clone())
            .or_insert_with(|| Arc::new(Mutex::new(EntityCell::new())));
        Arc::clone(entry.value())
    }

    fn encode_event(
        &self,
        identity: &K,
        version: u64,
        event: &SnapshotEvent<K, S>,
    ) -> Result<Vec<u8>> {
        let base = EventBase::new(version as i64, now_micros());
        let event_bytes = rmp_serde::to_vec_named(event)
            .map_err(|e| Error::SerializationError(e.to_string()))?;
        self.codec.encode(&EventEnvelope::new(
            event.event_type_code(),
            identity.clone(),
            base.to_bytes().to_vec(),
            event_bytes,
        ))
    }

    fn decode_event(
        &self,
        identity: &K,
        frame: &[u8],
    ) -> Result<(EventBase, SnapshotEvent<K, S>)> {
        let envelope = self
            .codec
            .decode_with_identity::<K>(frame)?
            .ok_or_else(|| Error::MalformedFrame("log entry is not an event frame".into()))?;
        if envelope.identity != *identity {
            return Err(Error::Runtime(format!(
                "log for {} holds a frame for {}",
                identity.to_identity(),
                envelope.identity.to_identity()
            )));
        }
        let base = EventBase::from_bytes(&envelope.base_bytes)?;
        let event = rmp_serde::from_slice(&envelope.event_bytes)
            .map_err(|e| Error::SerializationError(e.to_string()))?;
        Ok((base, event))
    }
}

impl<K, S> Default for MemoryRuntime<K, S>
where
    K: IdentityValue + Serialize + DeserializeOwned,
    S: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Fold one event into a snapshot.
fn apply<K, S: Default>(snapshot: &mut Snapshot<K, S>, event: SnapshotEvent<K, S>) {
    match event {
        SnapshotEvent::Creating { state } | SnapshotEvent::Updating { state } => {
            snapshot.state = state;
        }
        SnapshotEvent::Deleting { .. } => snapshot.state = S::default(),
    }
    snapshot.version += 1;
}

fn archived_error<K: IdentityValue>(identity: &K) -> Error {
    Error::EntityArchived {
        identity: identity.to_identity().to_string(),
    }
}

impl<K, S> ActorRuntime<K, S> for MemoryRuntime<K, S>
where
    K: IdentityValue + Serialize + DeserializeOwned,
    S: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn replay(&self, identity: &K) -> Result<Option<Snapshot<K, S>>> {
        let cell = self.cell(identity);
        let mut cell = cell.lock();
        if cell.over {
            return Err(archived_error(identity));
        }
        if cell.live.is_empty() {
            return Ok(None);
        }

        let mut snapshot = Snapshot::empty(identity.clone());
        for frame in &cell.live {
            let (base, event) = self.decode_event(identity, frame)?;
            apply(&mut snapshot, event);
            if base.version != snapshot.version as i64 {
                return Err(Error::Runtime(format!(
                    "event log for {} is out of order: expected version {}, found {}",
                    identity.to_identity(),
                    snapshot.version,
                    base.version
                )));
            }
        }

        debug!(
            target: "eventgrain::runtime",
            identity = ?identity,
            version = snapshot.version,
            "Replayed event log"
        );
        cell.snapshot = Some(snapshot.clone());
        Ok(Some(snapshot))
    }

    fn install_snapshot(&self, snapshot: Snapshot<K, S>) -> Result<()> {
        let cell = self.cell(&snapshot.identity);
        let mut cell = cell.lock();
        if cell.over {
            return Err(archived_error(&snapshot.identity));
        }
        if !cell.live.is_empty() {
            return Err(Error::Runtime(format!(
                "cannot install a snapshot over existing history for {}",
                snapshot.identity.to_identity()
            )));
        }
        debug!(target: "eventgrain::runtime", identity = ?snapshot.identity, "Snapshot installed");
        cell.snapshot = Some(snapshot);
        Ok(())
    }

    fn raise_event(&self, identity: &K, event: SnapshotEvent<K, S>) -> Result<u64> {
        let cell = self.cell(identity);
        let mut cell = cell.lock();
        if cell.over {
            return Err(archived_error(identity));
        }
        if self.config.log_full(cell.live.len()) {
            warn!(
                target: "eventgrain::runtime",
                identity = ?identity,
                limit = self.config.max_log_frames,
                "Event log full"
            );
            return Err(Error::Runtime(format!(
                "event log for {} reached {} frames",
                identity.to_identity(),
                self.config.max_log_frames
            )));
        }

        let mut next = cell
            .snapshot
            .clone()
            .ok_or_else(|| Error::SnapshotMissing {
                identity: identity.to_identity().to_string(),
            })?;
        let frame = self.encode_event(identity, next.version + 1, &event)?;
        let event_type = event.event_type_code();
        apply(&mut next, event);

        let version = next.version;
        cell.live.push(frame);
        cell.snapshot = Some(next);

        debug!(
            target: "eventgrain::runtime",
            identity = ?identity,
            event_type,
            version,
            "Event appended"
        );
        Ok(version)
    }

    fn snapshot(&self, identity: &K) -> Result<Snapshot<K, S>> {
        self.existing(identity)
            .and_then(|cell| cell.lock().snapshot.clone())
            .ok_or_else(|| Error::SnapshotMissing {
                identity: identity.to_identity().to_string(),
            })
    }

    fn archive(&self, identity: &K, mode: ArchiveMode) -> Result<()> {
        let cell = self.cell(identity);
        let mut cell = cell.lock();
        if cell.over {
            return Ok(());
        }

        let moved = cell.live.len();
        match mode {
            ArchiveMode::ArchiveEvents => {
                let live = std::mem::take(&mut cell.live);
                cell.archived.extend(live);
            }
            ArchiveMode::DeleteEvents => cell.live.clear(),
            ArchiveMode::DeleteAll => {
                cell.live.clear();
                cell.archived.clear();
                cell.snapshot = None;
            }
        }
        cell.over = true;

        info!(
            target: "eventgrain::runtime",
            identity = ?identity,
            mode = mode.name(),
            events = moved,
            "Entity archived"
        );
        Ok(())
    }
}
