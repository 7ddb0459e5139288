// =============================================================================
// SUBMIT LOCK
// =============================================================================
// Guard against duplicate form submission while a request is in flight.
//
// LEARNING NOTES:
// - A single boolean flag with explicit acquire/release. It is an
//   `AtomicBool` so the lock can live in state shared by async handlers;
//   `compare_exchange` makes "check then set" a single step.
// - Callers must release on every path. `SubmitLock::guard` returns a
//   value that releases in `Drop`, which covers early returns and `?`.
// - A server handles many forms at once, so it keeps one lock per
//   submission key (`SubmitLocks`): the same user submitted twice is
//   refused, different users go through side by side.
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct SubmitLock {
    locked: AtomicBool,
}

impl SubmitLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag and returns true iff it was clear and the caller is not
    /// `already_busy`. Otherwise returns false without touching the flag.
    pub fn try_acquire(&self, already_busy: bool) -> bool {
        if already_busy {
            return false;
        }
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Unconditionally clears the flag.
    pub fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Scoped acquisition: the lock is released when the guard is dropped.
    pub fn guard(&self, already_busy: bool) -> Option<SubmitGuard<'_>> {
        self.try_acquire(already_busy)
            .then_some(SubmitGuard { lock: self })
    }
}

/// Holds a [`SubmitLock`] until dropped.
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    lock: &'a SubmitLock,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

// =============================================================================
// KEYED LOCKS
// =============================================================================

/// One [`SubmitLock`] per in-flight submission key.
///
/// Entries exist only while held; dropping the guard releases the lock and
/// removes the key.
#[derive(Debug, Default)]
pub struct SubmitLocks {
    held: Mutex<HashMap<String, Arc<SubmitLock>>>,
}

impl SubmitLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<SubmitLock>>> {
        // Every critical section leaves the map consistent; ignore poisoning.
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire the lock for `key`, or `None` while another submission with
    /// the same key is in flight.
    pub fn guard(&self, key: impl Into<String>) -> Option<KeyedSubmitGuard<'_>> {
        let key = key.into();
        let mut held = self.entries();
        let lock = Arc::clone(held.entry(key.clone()).or_default());
        if !lock.try_acquire(false) {
            return None;
        }
        Some(KeyedSubmitGuard {
            locks: self,
            lock,
            key,
        })
    }

    pub fn is_locked(&self, key: &str) -> bool {
        self.entries().get(key).is_some_and(|lock| lock.is_locked())
    }
}

/// Holds the lock for one key of a [`SubmitLocks`] until dropped.
#[derive(Debug)]
pub struct KeyedSubmitGuard<'a> {
    locks: &'a SubmitLocks,
    lock: Arc<SubmitLock>,
    key: String,
}

impl Drop for KeyedSubmitGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.locks.entries();
        self.lock.release();
        held.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_is_exclusive_until_release() {
        let lock = SubmitLock::new();

        assert!(lock.try_acquire(false));
        assert!(!lock.try_acquire(false));
        assert!(lock.is_locked());

        lock.release();
        assert!(lock.try_acquire(false));
    }

    #[test]
    fn test_busy_caller_never_acquires() {
        let lock = SubmitLock::new();
        assert!(!lock.try_acquire(true));
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_release_is_unconditional() {
        let lock = SubmitLock::new();
        lock.release();
        assert!(!lock.is_locked());
        assert!(lock.try_acquire(false));
    }

    #[test]
    fn test_guard_releases_on_every_exit_path() {
        let lock = SubmitLock::new();

        fn failing_submit(lock: &SubmitLock) -> Result<(), &'static str> {
            let _guard = lock.guard(false).ok_or("busy")?;
            Err("backend rejected the request")
        }

        assert!(failing_submit(&lock).is_err());
        assert!(!lock.is_locked());

        {
            let _held = lock.guard(false).expect("lock should be free");
            assert!(lock.guard(false).is_none());
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_keyed_locks_refuse_only_the_same_key() {
        let locks = SubmitLocks::new();

        let first = locks.guard("create:somchai@example.co.th");
        let other = locks.guard("create:malee@example.co.th");
        assert!(first.is_some());
        assert!(other.is_some());
        assert!(locks.guard("create:somchai@example.co.th").is_none());
        assert!(locks.is_locked("create:somchai@example.co.th"));

        drop(first);
        assert!(!locks.is_locked("create:somchai@example.co.th"));
        assert!(locks.guard("create:somchai@example.co.th").is_some());
    }

    #[test]
    fn test_keyed_guard_releases_on_error_path() {
        let locks = SubmitLocks::new();

        fn failing_submit(locks: &SubmitLocks) -> Result<(), &'static str> {
            let _guard = locks.guard("edit:42").ok_or("busy")?;
            Err("backend rejected the request")
        }

        assert_eq!(failing_submit(&locks), Err("backend rejected the request"));
        assert_eq!(failing_submit(&locks), Err("backend rejected the request"));
        assert!(!locks.is_locked("edit:42"));
    }
}
