//! Event-sourced entity lifecycle
//!
//! An [`EventSourcedEntity`] turns create/update/delete commands into
//! snapshot events and hands them to its [`ActorRuntime`]. It owns no
//! storage: the runtime applies events, keeps history and serializes
//! concurrent callers per identity.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized --activate--> Hydrating --ok--> Active --archive--> Archiving --ok--> Archived
//!       ^                         |                ^                    |
//!       +---------failed----------+                +-------failed-------+
//! ```
//!
//! Hydration replays history when the runtime has any. Otherwise the
//! configured [`HydrationFallback`] seeds the initial snapshot exactly once.

use crate::event::SnapshotEvent;
use crate::snapshot::Snapshot;
use crate::traits::{ActorRuntime, ArchiveMode, HydrationFallback, Mapper};
use eventgrain_core::{Error, IdentityValue, Result};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntityState {
    /// Not yet activated
    Uninitialized = 0,
    /// Activation in progress
    Hydrating = 1,
    /// Accepting commands
    Active = 2,
    /// Archive in progress
    Archiving = 3,
    /// Lifecycle ended
    Archived = 4,
}

impl EntityState {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(EntityState::Uninitialized),
            1 => Some(EntityState::Hydrating),
            2 => Some(EntityState::Active),
            3 => Some(EntityState::Archiving),
            4 => Some(EntityState::Archived),
            _ => None,
        }
    }

    /// Lowercase name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            EntityState::Uninitialized => "uninitialized",
            EntityState::Hydrating => "hydrating",
            EntityState::Active => "active",
            EntityState::Archiving => "archiving",
            EntityState::Archived => "archived",
        }
    }

    /// True once archival has started.
    pub fn is_over(&self) -> bool {
        matches!(self, EntityState::Archiving | EntityState::Archived)
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The pluggable pieces an entity is built from.
pub struct EntityCapabilities<K, S, D> {
    /// Initial state when there is no history
    pub fallback: Arc<dyn HydrationFallback<K, S>>,
    /// DTO to state, used by create and update
    pub to_state: Arc<dyn Mapper<D, S>>,
    /// State to DTO, used by read
    pub to_dto: Arc<dyn Mapper<S, D>>,
}

impl<K, S, D> EntityCapabilities<K, S, D> {
    /// Bundle a fallback and the two mappers.
    pub fn new(
        fallback: impl HydrationFallback<K, S> + 'static,
        to_state: impl Mapper<D, S> + 'static,
        to_dto: impl Mapper<S, D> + 'static,
    ) -> Self {
        EntityCapabilities {
            fallback: Arc::new(fallback),
            to_state: Arc::new(to_state),
            to_dto: Arc::new(to_dto),
        }
    }
}

impl<K, S, D> Clone for EntityCapabilities<K, S, D> {
    fn clone(&self) -> Self {
        EntityCapabilities {
            fallback: Arc::clone(&self.fallback),
            to_state: Arc::clone(&self.to_state),
            to_dto: Arc::clone(&self.to_dto),
        }
    }
}

/// One event-sourced entity bound to a runtime.
///
/// All commands take `&self`; share the entity across threads with `Arc`.
pub struct EventSourcedEntity<K, S, D, R> {
    identity: K,
    runtime: Arc<R>,
    capabilities: EntityCapabilities<K, S, D>,
    state: AtomicU8,
}

impl<K, S, D, R> EventSourcedEntity<K, S, D, R>
where
    K: IdentityValue,
    R: ActorRuntime<K, S>,
{
    /// Bind an entity to a runtime. The entity starts uninitialized.
    pub fn new(identity: K, runtime: Arc<R>, capabilities: EntityCapabilities<K, S, D>) -> Self {
        EventSourcedEntity {
            identity,
            runtime,
            capabilities,
            state: AtomicU8::new(EntityState::Uninitialized as u8),
        }
    }

    /// Entity identity.
    pub fn identity(&self) -> &K {
        &self.identity
    }

    /// Runtime hosting this entity.
    pub fn runtime(&self) -> &Arc<R> {
        &self.runtime
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EntityState {
        EntityState::from_u8(self.state.load(Ordering::Acquire))
            .unwrap_or(EntityState::Uninitialized)
    }

    /// Hydrate the entity and make it active.
    ///
    /// Replays history if the runtime has any; otherwise runs the hydration
    /// fallback and installs its state as the version-0 snapshot. Calling
    /// this on an active entity does nothing. A failed hydration leaves the
    /// entity uninitialized so activation can be retried.
    ///
    /// A caller racing an activation still in flight gets
    /// `NotActive { state: "hydrating" }` rather than waiting on its outcome.
    /// The same applies to `archiving`.
    pub fn activate(&self) -> Result<()> {
        match self.transition(EntityState::Uninitialized, EntityState::Hydrating) {
            Ok(()) => {}
            Err(EntityState::Active) => return Ok(()),
            Err(EntityState::Archived) => return Err(self.archived()),
            Err(state) => return Err(Error::NotActive { state: state.name() }),
        }

        match self.hydrate() {
            Ok(version) => {
                self.store(EntityState::Active);
                info!(
                    target: "eventgrain::entity",
                    identity = ?self.identity,
                    version,
                    "Entity activated"
                );
                Ok(())
            }
            Err(e) => {
                self.store(EntityState::Uninitialized);
                warn!(
                    target: "eventgrain::entity",
                    identity = ?self.identity,
                    error = %e,
                    "Entity hydration failed"
                );
                Err(e)
            }
        }
    }

    /// Replace the state with one built from `dto`. Returns the new version.
    pub fn create(&self, dto: &D) -> Result<u64> {
        let state = self.capabilities.to_state.map(dto);
        self.raise(SnapshotEvent::Creating { state })
    }

    /// DTO projection of the current snapshot.
    pub fn read(&self) -> Result<D> {
        let snapshot = self.snapshot()?;
        Ok(self.capabilities.to_dto.map(&snapshot.state))
    }

    /// Current snapshot as held by the runtime.
    ///
    /// Fails with `NotActive` until this entity has finished hydrating.
    pub fn snapshot(&self) -> Result<Snapshot<K, S>> {
        let state = self.state();
        if matches!(state, EntityState::Uninitialized | EntityState::Hydrating) {
            return Err(Error::NotActive { state: state.name() });
        }
        self.runtime.snapshot(&self.identity)
    }

    /// Replace the state with one built from `dto`. Returns the new version.
    pub fn update(&self, dto: &D) -> Result<u64> {
        let state = self.capabilities.to_state.map(dto);
        self.raise(SnapshotEvent::Updating { state })
    }

    /// Tombstone the entity. Returns the new version.
    pub fn delete(&self) -> Result<u64> {
        self.raise(SnapshotEvent::Deleting {
            identity: self.identity.clone(),
        })
    }

    /// End the entity's lifecycle, moving its events to the archive.
    ///
    /// Calling this on an archived entity is a no-op. A call that arrives
    /// while another archive is still in flight fails with
    /// `NotActive { state: "archiving" }`, since that archive may yet fail.
    /// If the runtime fails, the entity returns to active.
    pub fn archive(&self) -> Result<()> {
        match self.transition(EntityState::Active, EntityState::Archiving) {
            Ok(()) => {}
            Err(EntityState::Archived) => {
                debug!(target: "eventgrain::entity", identity = ?self.identity, "Entity already archived");
                return Ok(());
            }
            Err(state) => return Err(Error::NotActive { state: state.name() }),
        }

        match self.runtime.archive(&self.identity, ArchiveMode::ArchiveEvents) {
            Ok(()) => {
                self.store(EntityState::Archived);
                info!(target: "eventgrain::entity", identity = ?self.identity, "Entity archived");
                Ok(())
            }
            Err(e) => {
                self.store(EntityState::Active);
                warn!(
                    target: "eventgrain::entity",
                    identity = ?self.identity,
                    error = %e,
                    "Entity archive failed"
                );
                Err(e)
            }
        }
    }

    fn hydrate(&self) -> Result<u64> {
        if let Some(snapshot) = self.runtime.replay(&self.identity)? {
            debug!(
                target: "eventgrain::entity",
                identity = ?self.identity,
                version = snapshot.version,
                "Hydrated from event history"
            );
            return Ok(snapshot.version);
        }

        let state = self.capabilities.fallback.hydrate(&self.identity)?;
        self.runtime
            .install_snapshot(Snapshot::new(self.identity.clone(), state))?;
        debug!(target: "eventgrain::entity", identity = ?self.identity, "Hydrated from fallback");
        Ok(0)
    }

    fn raise(&self, event: SnapshotEvent<K, S>) -> Result<u64> {
        self.ensure_active()?;
        let event_type = event.event_type_code();

        match self.runtime.raise_event(&self.identity, event) {
            Ok(version) => {
                debug!(
                    target: "eventgrain::entity",
                    identity = ?self.identity,
                    event_type,
                    version,
                    "Event raised"
                );
                Ok(version)
            }
            Err(e) => {
                warn!(
                    target: "eventgrain::entity",
                    identity = ?self.identity,
                    event_type,
                    error = %e,
                    "Event rejected"
                );
                Err(e)
            }
        }
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state() {
            EntityState::Active => Ok(()),
            EntityState::Archived => Err(self.archived()),
            state => Err(Error::NotActive { state: state.name() }),
        }
    }

    fn archived(&self) -> Error {
        Error::EntityArchived {
            identity: self.identity.to_identity().to_string(),
        }
    }

    /// Compare-and-swap the lifecycle word. On failure returns the observed state.
    fn transition(&self, from: EntityState, to: EntityState) -> std::result::Result<(), EntityState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|observed| {
                EntityState::from_u8(observed).unwrap_or(EntityState::Uninitialized)
            })
    }

    fn store(&self, state: EntityState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl<K: fmt::Debug, S, D, R> fmt::Debug for EventSourcedEntity<K, S, D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSourcedEntity")
            .field("identity", &self.identity)
            .field("state", &self.state.load(Ordering::Relaxed))
            .finish()
    }
}
