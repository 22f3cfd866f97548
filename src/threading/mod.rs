//! Per-thread control blocks, the current-thread lookup, ownership-tracking
//! mutexes and the process-wide thread registry.
//!
//! This module is the concurrency substrate the rest of the runtime stands
//! on. Every OS thread executing managed code owns exactly one
//! [`Thread`] control block, reachable in O(1) from its own execution
//! context through [`Thread::current`]. Control blocks enter the world
//! through the runtime context, spawned via
//! [`create_thread`](crate::runtime::RuntimeContext::create_thread) or
//! adopted via
//! [`attach_current_thread`](crate::runtime::RuntimeContext::attach_current_thread),
//! and leave it only after reaching
//! [`ThreadState::Terminated`] and unregistering from the
//! [`ThreadRegistry`].
//!
//! # Key Components
//!
//! - [`Thread`] - Per-OS-thread state: identity, stack bounds, lifecycle
//!   state, pending-exception slot, native interop handle
//! - [`ThreadState`] - The cooperative lifecycle state machine
//! - [`Mutex`] / [`MutexLock`] - Mutual exclusion with explicit owner
//!   tracking
//! - [`ThreadRegistry`] - The process-wide set of live control blocks with
//!   its clean-shutdown invariant
//!
//! # Failure Model
//!
//! Nothing in this module retries or degrades. Invariant violations
//! (duplicate registration, unlock by a non-owner, double publication of a
//! control block) and OS-primitive failures (spawn, stack mapping) are
//! process-fatal; see the crate-level documentation.

mod mutex;
mod registry;
mod state;
mod thread;
pub(crate) mod tls;

pub use mutex::{Mutex, MutexLock};
pub use registry::ThreadRegistry;
pub use state::{RawState, ThreadState};
pub use thread::{Thread, ThreadEntry, ThreadId};

/// Numeric identity of an OS thread, as reported by the platform.
///
/// Distinct from [`ThreadId`], the runtime-assigned logical id: the native
/// id is what the operating system knows the thread as, and what mutex
/// ownership is keyed by.
pub type NativeThreadId = u64;

/// Returns the native identity of the calling OS thread.
#[cfg(unix)]
pub(crate) fn current_native_id() -> NativeThreadId {
    unsafe { libc::pthread_self() as NativeThreadId }
}

/// Returns the native identity of the calling OS thread.
///
/// Platforms without a numeric thread id derive one by hashing the standard
/// library's opaque thread identity; the value is stable for the thread's
/// lifetime and never zero.
#[cfg(not(unix))]
pub(crate) fn current_native_id() -> NativeThreadId {
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish() | 1
}
