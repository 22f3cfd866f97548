//! # javelin Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the javelin crate. Import this module to get quick access to the essential types
//! of the thread-management core.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all javelin operations
pub use crate::Error;

/// The result type used throughout javelin
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The process-wide runtime context: bootstrap, attach/create, teardown
pub use crate::runtime::RuntimeContext;

/// Embedder-supplied runtime configuration
pub use crate::runtime::{RuntimeConfig, DEFAULT_STACK_SIZE};

// ================================================================================================
// Threading
// ================================================================================================

/// The per-OS-thread control block and its identities
pub use crate::threading::{NativeThreadId, Thread, ThreadEntry, ThreadId};

/// Lifecycle states and their diagnostic rendering
pub use crate::threading::{RawState, ThreadState};

/// Ownership-tracking mutual exclusion
pub use crate::threading::{Mutex, MutexLock};

/// The process-wide live-thread set
pub use crate::threading::ThreadRegistry;

// ================================================================================================
// Memory and Stacks
// ================================================================================================

/// Anonymous mapped regions used as thread stacks
pub use crate::memory::{page_size, MappedRegion, Protection};

// ================================================================================================
// Exception Signaling and Collaborator Seams
// ================================================================================================

/// Managed exception signaling
pub use crate::exception::{
    throw_new_exception, throw_new_exception_fmt, EXCEPTION_MESSAGE_CAPACITY,
};

/// The class/object system boundary
pub use crate::objects::{ClassHandle, ConstructorHandle, ObjectHandle, ObjectSystem};

/// The native interop boundary
pub use crate::interop::{BasicInteropFactory, InteropEnv, InteropEnvFactory, InteropVm};
