//! The current-thread storage slot.
//!
//! A single, well-scoped thread-local slot maps each OS thread to its
//! [`Thread`] control block. The slot has an explicit lifecycle owned by
//! the runtime context: one [`install`] per OS thread at attach/create
//! time, one [`clear`] at detach or thread exit. It is the only ambient
//! state this crate maintains.
//!
//! Installing over an occupied slot is a fatal contract violation: it would
//! mean two control blocks resolve to the same OS thread. The slot's
//! destructor doubles as the thread-exit check, flagging threads that leave
//! the process while still attached.

use std::cell::RefCell;
use std::sync::Arc;

use crate::threading::Thread;

/// Holder for the per-thread control block reference.
///
/// The destructor runs at OS thread exit, after `thread_local` teardown
/// begins for this thread.
struct CurrentSlot {
    thread: RefCell<Option<Arc<Thread>>>,
}

impl Drop for CurrentSlot {
    fn drop(&mut self) {
        log::trace!("thread exit check");
        if let Some(thread) = self.thread.borrow().as_ref() {
            log::warn!("OS thread exited while still attached: {thread}");
        }
    }
}

thread_local! {
    static CURRENT: CurrentSlot = CurrentSlot {
        thread: RefCell::new(None),
    };
}

/// Publishes `thread` as the calling OS thread's control block.
///
/// Fatal if the slot already holds a block (two control blocks must never
/// resolve to the same OS thread) or if the slot is no longer available
/// because the thread is tearing down.
pub(crate) fn install(thread: Arc<Thread>) {
    let installed = CURRENT.try_with(|slot| {
        let mut current = slot.thread.borrow_mut();
        if let Some(existing) = current.as_ref() {
            fatal!("current-thread slot already holds {existing}");
        }
        *current = Some(thread);
    });

    if installed.is_err() {
        fatal!("cannot publish control block: current-thread slot unavailable");
    }
}

/// Removes and returns the calling OS thread's control block, if any.
pub(crate) fn clear() -> Option<Arc<Thread>> {
    CURRENT
        .try_with(|slot| slot.thread.borrow_mut().take())
        .ok()
        .flatten()
}

/// Returns the calling OS thread's control block, if one is installed.
pub(crate) fn current() -> Option<Arc<Thread>> {
    CURRENT
        .try_with(|slot| slot.thread.borrow().clone())
        .ok()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot() {
        assert!(current().is_none());
        assert!(clear().is_none());
    }

    #[test]
    fn test_install_and_clear() {
        let thread = crate::test::control_block();
        install(Arc::clone(&thread));

        let resolved = current().unwrap();
        assert_eq!(resolved.id(), thread.id());

        let cleared = clear().unwrap();
        assert_eq!(cleared.id(), thread.id());
        assert!(current().is_none());
    }

    #[test]
    #[should_panic(expected = "fatal:")]
    fn test_double_install_rejected() {
        install(crate::test::control_block());
        install(crate::test::control_block());
    }
}
