//! Per-level record id counter

use crate::error::{LogVaultError, Result};
use crate::observe;
use crate::types::{Level, RecordId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Hands out unique, increasing ids per level.
///
/// The stored value is the last id handed out; `next` increments first, so a
/// level seeded at 0 produces 1 as its first id.
#[derive(Debug, Default)]
pub struct LevelCounter {
    last: RwLock<HashMap<Level, RecordId>>,
}

impl LevelCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the last-assigned id for `level`, typically from on-disk history.
    pub fn seed(&self, level: Level, last_seen: RecordId) {
        tracing::debug!("Seeding {} counter at {}", level, last_seen);
        self.last.write().insert(level, last_seen);
    }

    /// Increment and return the new id for `level`.
    ///
    /// Fails with `IdsExhausted` once the level has handed out `u64::MAX`;
    /// the counter is left unchanged.
    pub fn next(&self, level: Level) -> Result<RecordId> {
        let mut last = self.last.write();
        let slot = last.entry(level).or_insert(0);
        *slot = slot
            .checked_add(1)
            .ok_or(LogVaultError::IdsExhausted { level })?;
        Ok(*slot)
    }

    /// Step the counter back by one, never below 1.
    pub fn rollback(&self, level: Level) {
        let mut last = self.last.write();
        if let Some(slot) = last.get_mut(&level) {
            if *slot > 1 {
                *slot -= 1;
                observe::record_rollback();
            }
        }
    }

    /// Give back `id` if it is still the latest id for `level`.
    ///
    /// Returns `false` when a later id has been handed out since, in which
    /// case `id` stays unused rather than being issued twice.
    pub fn release(&self, level: Level, id: RecordId) -> bool {
        let mut last = self.last.write();
        match last.get_mut(&level) {
            Some(slot) if *slot == id && id > 1 => {
                *slot -= 1;
                observe::record_rollback();
                true
            }
            _ => false,
        }
    }

    /// Last id handed out for `level` (0 when none).
    pub fn current(&self, level: Level) -> RecordId {
        self.last.read().get(&level).copied().unwrap_or(0)
    }

    /// Snapshot of every level's last id, in level order.
    pub fn snapshot(&self) -> Vec<(Level, RecordId)> {
        let last = self.last.read();
        Level::ALL
            .iter()
            .map(|level| (*level, last.get(level).copied().unwrap_or(0)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_next_starts_at_one() {
        let counter = LevelCounter::new();
        assert_eq!(counter.current(Level::Info), 0);
        assert_eq!(counter.next(Level::Info).unwrap(), 1);
        assert_eq!(counter.next(Level::Info).unwrap(), 2);
        assert_eq!(counter.next(Level::Error).unwrap(), 1);
    }

    #[test]
    fn test_seed_is_last_seen_not_next() {
        let counter = LevelCounter::new();
        counter.seed(Level::Warning, 41);
        assert_eq!(counter.current(Level::Warning), 41);
        assert_eq!(counter.next(Level::Warning).unwrap(), 42);
    }

    #[test]
    fn test_rollback_floors_at_one() {
        let counter = LevelCounter::new();
        counter.rollback(Level::Debug);
        assert_eq!(counter.current(Level::Debug), 0);

        counter.next(Level::Debug).unwrap();
        counter.next(Level::Debug).unwrap();
        counter.rollback(Level::Debug);
        assert_eq!(counter.current(Level::Debug), 1);
        counter.rollback(Level::Debug);
        assert_eq!(counter.current(Level::Debug), 1);
        assert_eq!(counter.next(Level::Debug).unwrap(), 2);
    }

    #[test]
    fn test_release_only_latest() {
        let counter = LevelCounter::new();
        counter.seed(Level::Fatal, 10);
        let a = counter.next(Level::Fatal).unwrap();
        let b = counter.next(Level::Fatal).unwrap();
        assert!(!counter.release(Level::Fatal, a));
        assert_eq!(counter.current(Level::Fatal), b);
        assert!(counter.release(Level::Fatal, b));
        assert_eq!(counter.current(Level::Fatal), a);
    }

    #[test]
    fn test_next_fails_when_ids_are_exhausted() {
        let counter = LevelCounter::new();
        counter.seed(Level::Info, RecordId::MAX);
        let err = counter.next(Level::Info).unwrap_err();
        assert!(matches!(err, LogVaultError::IdsExhausted { level: Level::Info }));
        assert_eq!(counter.current(Level::Info), RecordId::MAX);
        assert_eq!(counter.next(Level::Error).unwrap(), 1);
    }

    #[test]
    fn test_concurrent_next_is_unique() {
        let counter = Arc::new(LevelCounter::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    (0..250)
                        .map(|_| counter.next(Level::Info).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 2000);
        assert_eq!(counter.current(Level::Info), 2000);
    }
}
