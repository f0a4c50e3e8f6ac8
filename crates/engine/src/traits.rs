//! Collaborator traits for event-sourced entities
//!
//! An entity never persists or replays anything itself. It composes:
//! - [`ActorRuntime`]: owns the snapshot, the event log and archival
//! - [`HydrationFallback`]: produces initial state when there is no history
//! - [`Mapper`]: converts between DTOs, legacy rows and state
//!
//! [`Repository`] and [`RepositoryFactory`] describe the legacy store used
//! by [`RepositoryFallback`](crate::RepositoryFallback).

use crate::event::SnapshotEvent;
use crate::snapshot::Snapshot;
use eventgrain_core::Result;

/// What happens to an entity's event history when it is archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveMode {
    /// Move live events into the archive log
    #[default]
    ArchiveEvents,
    /// Drop live events, keep the snapshot
    DeleteEvents,
    /// Drop events and the snapshot
    DeleteAll,
}

impl ArchiveMode {
    /// Lowercase name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ArchiveMode::ArchiveEvents => "archive_events",
            ArchiveMode::DeleteEvents => "delete_events",
            ArchiveMode::DeleteAll => "delete_all",
        }
    }
}

/// Event-sourcing runtime hosting entity snapshots.
///
/// Implementations serialize operations per identity. Entities rely on this
/// and take no locks of their own.
pub trait ActorRuntime<K, S>: Send + Sync {
    /// Fold persisted history into a snapshot and make it current.
    ///
    /// Returns `Ok(None)` when the identity has no history.
    fn replay(&self, identity: &K) -> Result<Option<Snapshot<K, S>>>;

    /// Install an initial snapshot for an identity without history.
    fn install_snapshot(&self, snapshot: Snapshot<K, S>) -> Result<()>;

    /// Persist and apply one event, returning the new snapshot version.
    fn raise_event(&self, identity: &K, event: SnapshotEvent<K, S>) -> Result<u64>;

    /// Current snapshot.
    fn snapshot(&self, identity: &K) -> Result<Snapshot<K, S>>;

    /// End the entity's lifecycle.
    fn archive(&self, identity: &K, mode: ArchiveMode) -> Result<()>;
}

/// Pure conversion from `In` to `Out`.
///
/// Any `Fn(&In) -> Out` closure is a mapper.
pub trait Mapper<In, Out>: Send + Sync {
    /// Convert `input`.
    fn map(&self, input: &In) -> Out;
}

impl<In, Out, F> Mapper<In, Out> for F
where
    F: Fn(&In) -> Out + Send + Sync,
{
    fn map(&self, input: &In) -> Out {
        self(input)
    }
}

/// Read access to a legacy store keyed by entity identity.
pub trait Repository<K, E> {
    /// First row for `identity`, or `None` if the store has none.
    fn first_or_default(&self, identity: &K) -> Result<Option<E>>;
}

/// Opens scoped [`Repository`] handles.
///
/// The handle is dropped as soon as the lookup finishes.
pub trait RepositoryFactory<K, E>: Send + Sync {
    /// Repository handle type
    type Repo: Repository<K, E>;

    /// Open a handle.
    fn open(&self) -> Result<Self::Repo>;
}

/// Produces initial state for an entity with no event history.
pub trait HydrationFallback<K, S>: Send + Sync {
    /// Initial state for `identity`.
    fn hydrate(&self, identity: &K) -> Result<S>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_mapper() {
        let double = |x: &u32| x * 2;
        assert_eq!(Mapper::map(&double, &21), 42);
    }

    #[test]
    fn test_archive_mode_default() {
        assert_eq!(ArchiveMode::default(), ArchiveMode::ArchiveEvents);
        assert_eq!(ArchiveMode::DeleteAll.name(), "delete_all");
    }
}
