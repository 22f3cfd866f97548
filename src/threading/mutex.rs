//! Ownership-tracking mutual exclusion.
//!
//! [`Mutex`] augments an OS-level lock primitive with an explicit owner
//! field: the native identity of the thread currently holding the lock. The
//! owner is written only by the acquiring thread, compared by identity, and
//! cleared back to "no owner" on release. It is never inferred from
//! scheduling state.
//!
//! The primitive is deliberately not reentrant. A thread that attempts to
//! re-acquire a mutex it already holds deadlocks, matching the single-owner
//! model; [`Mutex::try_lock`] from the owning thread returns `false` rather
//! than deadlocking and can be used where re-entry must be detected.
//!
//! Unlocking from a thread that is not the current owner is a programming
//! defect in the caller and terminates the process.
//!
//! # Examples
//!
//! ```rust
//! use javelin::threading::Mutex;
//!
//! let mutex = Mutex::new("demo lock");
//! mutex.lock();
//! assert!(mutex.is_held());
//! mutex.unlock();
//! assert_eq!(mutex.owner(), None);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::lock_api::RawMutex as RawMutexOps;
use parking_lot::RawMutex;

use crate::threading::{current_native_id, NativeThreadId};

/// Owner value meaning "not currently held by any thread".
const NO_OWNER: u64 = 0;

/// A mutual-exclusion primitive with explicit owner tracking.
///
/// Wraps the OS-level lock primitive with a diagnostic name and an owner
/// field holding the native identity of the acquiring thread. Owner
/// tracking is keyed by native thread identity rather than by control
/// block, so the mutex is usable by OS threads that have not (or not yet)
/// been adopted into the runtime, in particular by the registry lock
/// during thread attach.
///
/// A mutex is created once and lives for its owner's lifetime; it is never
/// reset mid-life. Creation cannot fail: the underlying primitive has a
/// constant initializer, so there is no partially initialized lock state
/// to abort on.
pub struct Mutex {
    /// Diagnostic name, surfaced in fatal messages and `Debug` output.
    name: String,

    /// The OS-level lock primitive.
    raw: RawMutex,

    /// Native identity of the holding thread, or [`NO_OWNER`].
    owner: AtomicU64,
}

impl Mutex {
    /// Creates a new, unheld mutex with the given diagnostic name.
    pub fn new(name: impl Into<String>) -> Mutex {
        Mutex {
            name: name.into(),
            raw: RawMutex::INIT,
            owner: AtomicU64::new(NO_OWNER),
        }
    }

    /// Blocks the calling thread until the mutex is acquired, then records
    /// the caller as owner.
    ///
    /// Not reentrant: calling `lock` while already holding this mutex
    /// deadlocks.
    pub fn lock(&self) {
        self.raw.lock();
        self.owner.store(current_native_id(), Ordering::Release);
    }

    /// Attempts to acquire the mutex without blocking.
    ///
    /// On success the caller is recorded as owner and `true` is returned.
    /// If the mutex is already held, by another thread or by the caller
    /// itself, the state is left unchanged and `false` is returned
    /// immediately.
    pub fn try_lock(&self) -> bool {
        if self.raw.try_lock() {
            self.owner.store(current_native_id(), Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Releases the mutex.
    ///
    /// The calling thread must be the current owner; an unlock attempt by
    /// any other thread is a fatal contract violation. The owner field is
    /// cleared to "no owner" before the primitive is released, so a
    /// released mutex never reports a stale owner.
    pub fn unlock(&self) {
        let me = current_native_id();
        let owner = self.owner.load(Ordering::Acquire);
        if owner != me {
            fatal!(
                "mutex '{}' unlocked by thread {} which is not the owner ({})",
                self.name,
                me,
                RawOwner(owner)
            );
        }

        self.owner.store(NO_OWNER, Ordering::Release);
        // The owner check above proves the calling thread holds the lock.
        unsafe { self.raw.unlock() };
    }

    /// Acquires the mutex and returns a guard that releases it on drop.
    ///
    /// The guard form is used for scoped critical sections such as the
    /// registry's member updates.
    pub fn guard(&self) -> MutexLock<'_> {
        self.lock();
        MutexLock { mutex: self }
    }

    /// Returns the native identity of the current owner, if the mutex is
    /// held.
    #[must_use]
    pub fn owner(&self) -> Option<NativeThreadId> {
        match self.owner.load(Ordering::Acquire) {
            NO_OWNER => None,
            id => Some(id),
        }
    }

    /// Returns `true` while some thread holds the mutex.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.owner().is_some()
    }

    /// Returns the diagnostic name given at creation.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Mutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex")
            .field("name", &self.name)
            .field("owner", &self.owner())
            .finish()
    }
}

/// Renders an owner field value, mapping the sentinel to `<none>`.
struct RawOwner(u64);

impl fmt::Display for RawOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == NO_OWNER {
            write!(f, "<none>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// RAII helper holding a [`Mutex`] for the duration of a scope.
///
/// Created by [`Mutex::guard`]; releases the lock on drop via
/// [`Mutex::unlock`], including its owner check.
pub struct MutexLock<'a> {
    mutex: &'a Mutex,
}

impl Drop for MutexLock<'_> {
    fn drop(&mut self) {
        self.mutex.unlock();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    #[test]
    fn test_lock_unlock_same_thread() {
        let mutex = Mutex::new("test lock");
        mutex.lock();
        assert_eq!(mutex.owner(), Some(current_native_id()));
        mutex.unlock();
        assert_eq!(mutex.owner(), None);
        assert!(!mutex.is_held());
    }

    #[test]
    fn test_try_lock_unheld_records_owner() {
        let mutex = Mutex::new("test lock");
        assert!(mutex.try_lock());
        assert_eq!(mutex.owner(), Some(current_native_id()));
        mutex.unlock();
    }

    #[test]
    fn test_try_lock_not_reentrant() {
        let mutex = Mutex::new("test lock");
        mutex.lock();
        assert!(!mutex.try_lock());
        mutex.unlock();
    }

    #[test]
    fn test_try_lock_held_by_other_thread() {
        let mutex = Mutex::new("test lock");
        let (held_tx, held_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let mutex_ref = &mutex;
        thread::scope(|s| {
            s.spawn(move || {
                mutex_ref.lock();
                held_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                mutex_ref.unlock();
            });

            held_rx.recv().unwrap();
            assert!(!mutex.try_lock());
            release_tx.send(()).unwrap();
        });

        // Holder released it; now immediate acquisition succeeds.
        assert!(mutex.try_lock());
        mutex.unlock();
    }

    #[test]
    #[should_panic(expected = "fatal:")]
    fn test_unlock_by_non_owner() {
        let mutex = Mutex::new("test lock");
        let (held_tx, held_rx) = mpsc::channel();

        thread::scope(|s| {
            s.spawn(|| {
                mutex.lock();
                held_tx.send(()).unwrap();
            });

            held_rx.recv().unwrap();
            mutex.unlock();
        });
    }

    #[test]
    #[should_panic(expected = "fatal:")]
    fn test_unlock_unheld() {
        let mutex = Mutex::new("test lock");
        mutex.unlock();
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let mutex = Mutex::new("test lock");
        {
            let _guard = mutex.guard();
            assert!(mutex.is_held());
        }
        assert!(!mutex.is_held());
        assert!(mutex.try_lock());
        mutex.unlock();
    }

    #[test]
    fn test_debug_output() {
        let mutex = Mutex::new("registry lock");
        let rendered = format!("{mutex:?}");
        assert!(rendered.contains("registry lock"));
        assert!(rendered.contains("None"));
    }
}
