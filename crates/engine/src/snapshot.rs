//! Materialized entity state.

/// Current state of one entity plus the number of events folded into it.
///
/// A snapshot is owned by the runtime. Entities read it through
/// [`ActorRuntime::snapshot`](crate::ActorRuntime::snapshot) and never
/// mutate it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<K, S> {
    /// Entity this snapshot belongs to
    pub identity: K,
    /// Number of events applied (0 for a freshly seeded snapshot)
    pub version: u64,
    /// Materialized state
    pub state: S,
}

impl<K, S> Snapshot<K, S> {
    /// Create a version-0 snapshot.
    pub fn new(identity: K, state: S) -> Self {
        Snapshot {
            identity,
            version: 0,
            state,
        }
    }

    /// Create a snapshot at an explicit version.
    pub fn with_version(identity: K, version: u64, state: S) -> Self {
        Snapshot {
            identity,
            version,
            state,
        }
    }
}

impl<K, S: Default> Snapshot<K, S> {
    /// Snapshot holding `S::default()` at version 0.
    pub fn empty(identity: K) -> Self {
        Snapshot::new(identity, S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_at_version_zero() {
        let snapshot = Snapshot::new(7i64, "state".to_string());
        assert_eq!(snapshot.version, 0);
        assert_eq!(snapshot.identity, 7);
    }

    #[test]
    fn test_empty_uses_default_state() {
        let snapshot: Snapshot<i64, Vec<u8>> = Snapshot::empty(1);
        assert!(snapshot.state.is_empty());
        assert_eq!(Snapshot::with_version(1i64, 3, 0u8).version, 3);
    }
}
