//! Per-path reader/writer lock registry
//!
//! Every partition file gets its own `RwLock`, so appends to one file never
//! wait on appends or scans of another. Entries are registered on first use
//! and kept for the life of the registry.

use crate::observe;
use dashmap::DashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Registry handing out one shared reader/writer lock per file path.
///
/// Registration goes through `DashMap::entry`, which holds the shard lock for
/// the key while inserting; concurrent first accesses to the same path all
/// receive the same lock. The registry itself never fails, it only blocks.
///
/// # Example
///
/// ```
/// use logvault_core::LockRegistry;
///
/// let registry = LockRegistry::new();
/// let lock = registry.lock("logs/INFO/2024-01-01.log");
/// let same = registry.lock("logs/INFO/2024-01-01.log");
/// {
///     let _a = lock.read();
///     let _b = same.read();
///     // readers share the file
/// }
/// let _exclusive = lock.write();
/// ```
#[derive(Default)]
pub struct LockRegistry {
    locks: DashMap<PathBuf, Arc<RwLock<()>>>,
}

/// Handle to the lock guarding one path.
#[derive(Clone)]
pub struct PathLock {
    path: PathBuf,
    inner: Arc<RwLock<()>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (registering on first use) the lock for `path`.
    pub fn lock(&self, path: impl AsRef<Path>) -> PathLock {
        let path = path.as_ref();
        // Fast path: the entry almost always exists already.
        if let Some(existing) = self.locks.get(path) {
            return PathLock {
                path: path.to_path_buf(),
                inner: Arc::clone(existing.value()),
            };
        }

        let inner = self
            .locks
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                tracing::debug!("Registered lock for {}", path.display());
                Arc::new(RwLock::new(()))
            })
            .value()
            .clone();
        PathLock {
            path: path.to_path_buf(),
            inner,
        }
    }

    /// Run `f` while holding the shared lock for `path`.
    pub fn with_read<T>(&self, path: impl AsRef<Path>, f: impl FnOnce() -> T) -> T {
        let lock = self.lock(path);
        let _guard = lock.read();
        f()
    }

    /// Run `f` while holding the exclusive lock for `path`.
    pub fn with_write<T>(&self, path: impl AsRef<Path>, f: impl FnOnce() -> T) -> T {
        let lock = self.lock(path);
        let _guard = lock.write();
        f()
    }

    /// Number of paths registered so far.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl PathLock {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until no writer holds the path, then share it.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        let start = Instant::now();
        let guard = self.inner.read();
        observe::record_lock_wait(start.elapsed(), false);
        guard
    }

    /// Block until no reader or writer holds the path, then take it.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        let start = Instant::now();
        let guard = self.inner.write();
        observe::record_lock_wait(start.elapsed(), true);
        guard
    }

    /// True if both handles guard the same underlying lock.
    pub fn same_lock(&self, other: &PathLock) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_path_same_lock() {
        let registry = LockRegistry::new();
        let a = registry.lock("logs/INFO/a.log");
        let b = registry.lock("logs/INFO/a.log");
        let c = registry.lock("logs/INFO/b.log");
        assert!(a.same_lock(&b));
        assert!(!a.same_lock(&c));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_first_access_registers_once() {
        let registry = Arc::new(LockRegistry::new());
        let barrier = Arc::new(Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.lock("logs/ERROR/hot.log")
                })
            })
            .collect();

        let locks: Vec<PathLock> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(registry.len(), 1);
        for lock in &locks[1..] {
            assert!(locks[0].same_lock(lock));
        }
    }

    #[test]
    fn test_readers_share() {
        let registry = Arc::new(LockRegistry::new());
        let barrier = Arc::new(Barrier::new(4));
        let concurrent = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                let concurrent = Arc::clone(&concurrent);
                let peak = Arc::clone(&peak);
                thread::spawn(move || {
                    registry.with_read("shared.log", || {
                        let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        // All four readers must be inside at once to pass the barrier.
                        barrier.wait();
                        concurrent.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_writer_excludes_readers() {
        let registry = Arc::new(LockRegistry::new());
        let lock = registry.lock("exclusive.log");
        let guard = lock.write();

        let entered = Arc::new(AtomicBool::new(false));
        let reader = {
            let registry = Arc::clone(&registry);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                registry.with_read("exclusive.log", || entered.store(true, Ordering::SeqCst));
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!entered.load(Ordering::SeqCst), "reader ran during write");
        drop(guard);
        reader.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
    }

    #[test]
    fn test_unrelated_paths_do_not_block() {
        let registry = Arc::new(LockRegistry::new());
        let lock_a = registry.lock("a.log");
        let _held = lock_a.write();

        let other = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.with_write("b.log", || 7))
        };
        assert_eq!(other.join().unwrap(), 7);
    }
}
