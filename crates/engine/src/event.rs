//! Snapshot mutation events raised by entities.
//!
//! Events are plain data. Folding them into a snapshot is the runtime's job.

use serde::{Deserialize, Serialize};

/// Event type code for [`SnapshotEvent::Creating`]
pub const CREATING_SNAPSHOT: &str = "CreatingSnapshot";
/// Event type code for [`SnapshotEvent::Updating`]
pub const UPDATING_SNAPSHOT: &str = "UpdatingSnapshot";
/// Event type code for [`SnapshotEvent::Deleting`]
pub const DELETING_SNAPSHOT: &str = "DeletingSnapshot";

/// A request to change an entity's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotEvent<K, S> {
    /// Replace the snapshot with a freshly created state
    Creating {
        /// New state
        state: S,
    },
    /// Replace the snapshot with an updated state
    Updating {
        /// New state
        state: S,
    },
    /// Tombstone the entity
    Deleting {
        /// Entity being deleted
        identity: K,
    },
}

impl<K, S> SnapshotEvent<K, S> {
    /// Stable type code written into the frame header.
    pub fn event_type_code(&self) -> &'static str {
        match self {
            SnapshotEvent::Creating { .. } => CREATING_SNAPSHOT,
            SnapshotEvent::Updating { .. } => UPDATING_SNAPSHOT,
            SnapshotEvent::Deleting { .. } => DELETING_SNAPSHOT,
        }
    }

    /// True for the tombstone variant.
    pub fn is_delete(&self) -> bool {
        matches!(self, SnapshotEvent::Deleting { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_codes() {
        let created: SnapshotEvent<i64, u32> = SnapshotEvent::Creating { state: 1 };
        let updated: SnapshotEvent<i64, u32> = SnapshotEvent::Updating { state: 2 };
        let deleted: SnapshotEvent<i64, u32> = SnapshotEvent::Deleting { identity: 9 };

        assert_eq!(created.event_type_code(), "CreatingSnapshot");
        assert_eq!(updated.event_type_code(), "UpdatingSnapshot");
        assert_eq!(deleted.event_type_code(), "DeletingSnapshot");
        assert!(deleted.is_delete());
        assert!(!updated.is_delete());
    }

    #[test]
    fn test_msgpack_roundtrip() {
        let event: SnapshotEvent<String, Vec<u32>> = SnapshotEvent::Updating {
            state: vec![1, 2, 3],
        };
        let bytes = rmp_serde::to_vec_named(&event).unwrap();
        let decoded: SnapshotEvent<String, Vec<u32>> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, event);
    }
}
