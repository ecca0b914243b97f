use parking_lot::Mutex;

use crate::light::{LightState, StatePatch};

/// Result of a merge request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied { idx: usize },
    /// The index was outside `[0, len)`; nothing changed.
    OutOfRange { idx: i64, len: usize },
}

impl MergeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Fixed-length array of light records shared by every session.
///
/// One mutex covers the whole array, so a snapshot never observes a
/// half-applied merge and two merges never interleave field writes.
/// The length is fixed at construction.
#[derive(Debug)]
pub struct StateStore {
    lights: Mutex<Vec<LightState>>,
}

impl StateStore {
    pub fn new(lights: Vec<LightState>) -> Self {
        Self {
            lights: Mutex::new(lights),
        }
    }

    pub fn with_default_fixture() -> Self {
        Self::new(LightState::default_fixture())
    }

    pub fn len(&self) -> usize {
        self.lights.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every record, in index order.
    pub fn snapshot(&self) -> Vec<LightState> {
        self.lights.lock().clone()
    }

    pub fn get(&self, idx: usize) -> Option<LightState> {
        self.lights.lock().get(idx).cloned()
    }

    /// Apply `patch` to the record at `idx`. Out-of-range indices, negative
    /// ones included, leave the store untouched.
    pub fn merge(&self, idx: i64, patch: &StatePatch) -> MergeOutcome {
        let mut lights = self.lights.lock();
        merge_locked(&mut lights, idx, patch)
    }

    /// Merge and take the post-merge snapshot under a single lock hold.
    pub fn merge_and_snapshot(&self, idx: i64, patch: &StatePatch) -> (MergeOutcome, Vec<LightState>) {
        let mut lights = self.lights.lock();
        let outcome = merge_locked(&mut lights, idx, patch);
        (outcome, lights.clone())
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::with_default_fixture()
    }
}

fn merge_locked(lights: &mut [LightState], idx: i64, patch: &StatePatch) -> MergeOutcome {
    let len = lights.len();
    match usize::try_from(idx).ok().and_then(|i| lights.get_mut(i).map(|l| (i, l))) {
        Some((i, light)) => {
            light.apply(patch);
            MergeOutcome::Applied { idx: i }
        }
        None => MergeOutcome::OutOfRange { idx, len },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn dim(value: i64) -> StatePatch {
        StatePatch {
            dim: Some(value),
            ..Default::default()
        }
    }

    #[test]
    fn default_store_has_two_lights() {
        let store = StateStore::default();
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
        assert_eq!(store.snapshot(), LightState::default_fixture());
    }

    #[test]
    fn merge_changes_only_target_record() {
        let store = StateStore::with_default_fixture();
        let outcome = store.merge(0, &dim(42));
        assert_eq!(outcome, MergeOutcome::Applied { idx: 0 });

        let mut expected = LightState::default_fixture();
        expected[0].dim = 42;
        assert_eq!(store.snapshot(), expected);
    }

    #[test]
    fn merge_out_of_range_is_noop() {
        let store = StateStore::with_default_fixture();
        assert_eq!(
            store.merge(999, &dim(1)),
            MergeOutcome::OutOfRange { idx: 999, len: 2 }
        );
        assert_eq!(store.merge(2, &dim(1)), MergeOutcome::OutOfRange { idx: 2, len: 2 });
        assert_eq!(store.snapshot(), LightState::default_fixture());
    }

    #[test]
    fn merge_negative_index_is_out_of_range() {
        let store = StateStore::with_default_fixture();
        let outcome = store.merge(-1, &dim(1));
        assert!(!outcome.is_applied());
        assert_eq!(store.snapshot(), LightState::default_fixture());
    }

    #[test]
    fn merge_and_snapshot_returns_post_merge_state() {
        let store = StateStore::with_default_fixture();
        let patch = StatePatch {
            sat: Some(80),
            hue: None,
            ..Default::default()
        };
        let (outcome, snapshot) = store.merge_and_snapshot(1, &patch);
        assert!(outcome.is_applied());
        assert_eq!(snapshot[1].sat, 80);
        assert_eq!(snapshot[1].hue, 120);
        assert_eq!(snapshot[0], LightState::default_fixture()[0]);
        assert_eq!(snapshot, store.snapshot());
    }

    #[test]
    fn get_returns_copy() {
        let store = StateStore::with_default_fixture();
        assert_eq!(store.get(1).map(|l| l.mode), Some("hsi".to_string()));
        assert!(store.get(2).is_none());
    }

    #[test]
    fn concurrent_merges_to_different_indices_are_not_lost() {
        let store = Arc::new(StateStore::with_default_fixture());
        let handles: Vec<_> = (0..2)
            .map(|idx| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for value in 0..=500 {
                        let _ = store.merge(idx, &dim(value));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].dim, 500);
        assert_eq!(snapshot[1].dim, 500);
    }

    #[test]
    fn concurrent_merges_never_tear_a_record() {
        let store = Arc::new(StateStore::with_default_fixture());
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for value in 0..1000 {
                    let _ = store.merge(
                        0,
                        &StatePatch {
                            dim: Some(value),
                            ct: Some(value),
                            ..Default::default()
                        },
                    );
                }
            })
        };
        for _ in 0..1000 {
            let light = &store.snapshot()[0];
            if light.dim != 10 {
                assert_eq!(light.dim, light.ct, "torn read: {light:?}");
            }
        }
        writer.join().unwrap();
    }
}
