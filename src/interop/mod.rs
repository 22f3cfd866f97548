//! The native interop boundary.
//!
//! Managed threads cross into native code through a per-thread environment
//! object, the [`InteropEnv`]. Each control block owns exactly one,
//! constructed when the thread is created or attached and usable only from
//! that thread. Environments are produced by an [`InteropEnvFactory`]
//! supplied by the embedder; the factory together with the runtime-wide
//! extended-checking flag forms the process-global [`InteropVm`] handle.
//!
//! The environment's contents are opaque to this crate: the factory decides
//! what per-thread state the native layer needs. Embedders without a native
//! layer can use [`BasicInteropFactory`], which produces environments with
//! unit state.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::threading::ThreadId;

/// A per-thread native interop environment.
///
/// Owned exclusively by one thread control block and meaningful only on
/// that thread. Carries the owning thread's id, the checking mode the
/// environment was constructed with, and whatever opaque state the
/// embedder's factory attached.
pub struct InteropEnv {
    /// Logical id of the owning thread.
    owner: ThreadId,

    /// Whether extended checking was enabled at construction.
    checked: bool,

    /// Factory-defined per-thread state.
    state: Box<dyn Any + Send + Sync>,
}

impl InteropEnv {
    /// Creates an environment for `owner` with the given checking mode and
    /// opaque state.
    pub fn new<T: Any + Send + Sync>(owner: ThreadId, checked: bool, state: T) -> InteropEnv {
        InteropEnv {
            owner,
            checked,
            state: Box::new(state),
        }
    }

    /// Returns the logical id of the thread that owns this environment.
    #[must_use]
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Returns `true` if extended interop checking is enabled.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Borrows the factory-defined state, if it has the requested type.
    #[must_use]
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.downcast_ref()
    }
}

impl fmt::Debug for InteropEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropEnv")
            .field("owner", &self.owner)
            .field("checked", &self.checked)
            .finish()
    }
}

/// Constructs per-thread interop environments.
///
/// Implemented by the embedder's native layer. The factory is invoked once
/// per thread, from that thread, during create/attach publication.
pub trait InteropEnvFactory: Send + Sync {
    /// Builds the environment for the thread `owner`, with extended
    /// checking per `checked`.
    fn create_env(&self, owner: ThreadId, checked: bool) -> InteropEnv;
}

/// A factory producing environments with unit state.
///
/// For embedders that have no native layer but still need each thread to
/// carry a well-formed environment.
#[derive(Debug, Default)]
pub struct BasicInteropFactory;

impl InteropEnvFactory for BasicInteropFactory {
    fn create_env(&self, owner: ThreadId, checked: bool) -> InteropEnv {
        InteropEnv::new(owner, checked, ())
    }
}

/// The process-global native interop handle.
///
/// Pairs the embedder's [`InteropEnvFactory`] with the runtime-wide
/// extended-checking flag; owned by the runtime context and consulted on
/// every thread create/attach.
pub struct InteropVm {
    /// Produces the per-thread environments.
    factory: Arc<dyn InteropEnvFactory>,

    /// Runtime-wide extended-checking flag, applied to every environment.
    check_extended: bool,
}

impl InteropVm {
    /// Creates the global handle from a factory and the checking flag.
    pub fn new(factory: Arc<dyn InteropEnvFactory>, check_extended: bool) -> InteropVm {
        InteropVm {
            factory,
            check_extended,
        }
    }

    /// Returns `true` if extended interop checking is enabled runtime-wide.
    #[must_use]
    pub fn is_check_extended(&self) -> bool {
        self.check_extended
    }

    /// Builds the environment for a newly published thread.
    pub(crate) fn create_env(&self, owner: ThreadId) -> InteropEnv {
        self.factory.create_env(owner, self.check_extended)
    }
}

impl fmt::Debug for InteropVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropVm")
            .field("check_extended", &self.check_extended)
            .finish()
    }
}
