//! Thread lifecycle states and their diagnostic rendering.

use std::fmt;

use strum::{Display, EnumIter, FromRepr};

/// The lifecycle state of a thread control block.
///
/// States move along a single cooperative progression: a block starts in
/// [`New`](Self::New) before it is published to thread-local storage and the
/// registry, becomes [`Runnable`](Self::Runnable) when adopted or spawned,
/// and ends in [`Terminated`](Self::Terminated) through its own thread's
/// progression, never by external force. The waiting states
/// ([`Blocked`](Self::Blocked), [`Waiting`](Self::Waiting),
/// [`TimedWaiting`](Self::TimedWaiting)) are entered by the synchronization
/// facilities layered above this crate; [`Native`](Self::Native) marks
/// execution outside managed code.
///
/// The `Display` implementation renders the exact human-readable names used
/// in thread dumps (`New`, `Runnable`, `Blocked`, `Waiting`, `TimedWaiting`,
/// `Native`, `Terminated`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum ThreadState {
    /// Control block constructed but not yet published.
    New,
    /// Executing, or ready to execute, managed code.
    Runnable,
    /// Blocked on a monitor acquisition.
    Blocked,
    /// Waiting without a timeout.
    Waiting,
    /// Waiting with a timeout.
    TimedWaiting,
    /// Executing native code outside the managed world.
    Native,
    /// Finished executing; terminal, and a precondition for unregistration.
    Terminated,
}

/// A raw state value as found in serialized or foreign thread records.
///
/// Values that correspond to a known [`ThreadState`] render as that state's
/// name; anything out of range renders as a tagged fallback, e.g.
/// `State[42]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawState(pub u8);

impl fmt::Display for RawState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match ThreadState::from_repr(self.0) {
            Some(state) => write!(f, "{state}"),
            None => write!(f, "State[{}]", self.0),
        }
    }
}
