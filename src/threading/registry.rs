//! The process-wide set of live thread control blocks.
//!
//! Every thread adopted or spawned by the runtime is registered here for
//! the span of its managed life and unregistered once it reaches
//! [`Terminated`](crate::threading::ThreadState::Terminated). Membership is
//! keyed by logical thread id (an order-agnostic set with structural
//! uniqueness, not a scanned list), and every update happens under the
//! registry's own [`Mutex`].
//!
//! The registry encodes the runtime's clean-shutdown invariant: it may only
//! be torn down once every thread except (at most) the one performing the
//! teardown has unregistered. Violations mean daemon threads were not shut
//! down cleanly and are process-fatal.

use std::cell::UnsafeCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::threading::{tls, Mutex, Thread, ThreadId};

/// Process-wide registry of live thread control blocks.
///
/// Created once at runtime bootstrap, destroyed once at shutdown.
/// Registration and unregistration are serialized solely by this registry's
/// own lock; no ordering across registries or with other runtime state is
/// implied.
///
/// # Examples
///
/// ```rust
/// use javelin::threading::ThreadRegistry;
///
/// let registry = ThreadRegistry::new();
/// assert!(registry.is_empty());
/// ```
pub struct ThreadRegistry {
    /// Guards every access to `members`.
    lock: Mutex,

    /// Live control blocks keyed by logical id. Only touched while `lock`
    /// is held (exclusively in `drop`, where `&mut self` stands in for it).
    members: UnsafeCell<HashMap<ThreadId, Arc<Thread>>>,
}

// The member map is only reached under `lock`.
unsafe impl Send for ThreadRegistry {}
unsafe impl Sync for ThreadRegistry {}

impl ThreadRegistry {
    /// Creates an empty registry and its guarding mutex.
    #[must_use]
    pub fn new() -> ThreadRegistry {
        ThreadRegistry {
            lock: Mutex::new("thread registry lock"),
            members: UnsafeCell::new(HashMap::new()),
        }
    }

    /// Adds `thread` to the live set.
    ///
    /// Registering a thread that is already a member is a programming
    /// defect and is fatal; membership is never silently deduplicated.
    pub fn register(&self, thread: Arc<Thread>) {
        let _guard = self.lock.guard();
        let members = unsafe { &mut *self.members.get() };

        match members.entry(thread.id()) {
            Entry::Occupied(_) => fatal!("thread already registered: {}", thread),
            Entry::Vacant(slot) => {
                slot.insert(thread);
            }
        }
    }

    /// Removes `thread` from the live set by identity.
    ///
    /// Unregistering a thread that is not a member is fatal.
    pub fn unregister(&self, thread: &Thread) {
        let _guard = self.lock.guard();
        let members = unsafe { &mut *self.members.get() };

        if members.remove(&thread.id()).is_none() {
            fatal!("thread not registered: {}", thread);
        }
    }

    /// Returns `true` if `thread` is currently a member.
    #[must_use]
    pub fn contains(&self, thread: &Thread) -> bool {
        let _guard = self.lock.guard();
        let members = unsafe { &*self.members.get() };
        members.contains_key(&thread.id())
    }

    /// Returns the number of registered threads.
    #[must_use]
    pub fn len(&self) -> usize {
        let _guard = self.lock.guard();
        let members = unsafe { &*self.members.get() };
        members.len()
    }

    /// Returns `true` if no threads are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the registered control blocks, in no
    /// particular order. For diagnostics such as thread dumps.
    #[must_use]
    pub fn threads(&self) -> Vec<Arc<Thread>> {
        let _guard = self.lock.guard();
        let members = unsafe { &*self.members.get() };
        members.values().cloned().collect()
    }
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        ThreadRegistry::new()
    }
}

impl Drop for ThreadRegistry {
    fn drop(&mut self) {
        // Skip the invariant while unwinding from an earlier fatal; a
        // second panic would turn a diagnosable abort into a blind one.
        if std::thread::panicking() {
            return;
        }

        let members = self.members.get_mut();
        if members.len() > 1 {
            fatal!(
                "daemon threads were not shut down cleanly: {} threads still registered",
                members.len()
            );
        }

        if let Some(survivor) = members.values().next() {
            let me = tls::current();
            if me.as_deref().map(Thread::id) != Some(survivor.id()) {
                fatal!(
                    "registry torn down while another thread is still registered: {}",
                    survivor
                );
            }
        }
    }
}
