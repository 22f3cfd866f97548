use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers the failures that can surface at the boundary to the runtime's external
/// collaborators: the class/object system consumed by exception signaling, and the memory
/// mapper that provisions thread stacks. Each variant carries enough context to identify
/// the failing collaborator call.
///
/// Note that most failure modes in this crate are *not* represented here. Invariant
/// violations (duplicate registration, unlock by a non-owner, double TLS install) and
/// OS-primitive failures (thread spawn, stack mapping on the `Create` path) are programming
/// or environment defects beneath all managed execution; they terminate the process instead
/// of returning an error. See the crate-level documentation for the fatal/recoverable split.
///
/// # Examples
///
/// ```rust
/// use javelin::{Error, memory::{MappedRegion, Protection}};
///
/// match MappedRegion::map(64 * 1024, Protection::READ) {
///     Ok(_) => println!("mapped"),
///     Err(Error::UnsupportedProtection(prot)) => {
///         eprintln!("stacks must be read/write, got {:?}", prot);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class/object system could not resolve a class by descriptor.
    ///
    /// Raised by [`crate::objects::ObjectSystem::resolve_class`]. On the exception
    /// signaling path this escalates to a fatal abort, since a runtime that cannot
    /// resolve its own exception classes has lost integrity.
    #[error("failed to resolve class '{0}'")]
    ClassNotFound(String),

    /// The class/object system could not allocate an instance of a resolved class.
    ///
    /// Raised by [`crate::objects::ObjectSystem::allocate_instance`].
    #[error("failed to allocate instance of '{0}'")]
    InstanceAllocation(String),

    /// A host string could not be decoded into the managed string representation.
    ///
    /// Raised by [`crate::objects::ObjectSystem::intern_string`].
    #[error("failed to allocate managed string")]
    StringAllocation,

    /// No constructor with the requested signature exists on a resolved class.
    ///
    /// Raised by [`crate::objects::ObjectSystem::find_constructor`].
    ///
    /// # Fields
    ///
    /// * `class` - Descriptor of the class that was searched
    /// * `signature` - The constructor signature that was requested
    #[error("no constructor {signature} on class '{class}'")]
    ConstructorNotFound {
        /// Descriptor of the class that was searched
        class: String,
        /// The constructor signature that was requested
        signature: String,
    },

    /// Invoking a constructor against an allocated instance failed.
    ///
    /// Raised by [`crate::objects::ObjectSystem::invoke_constructor`]. The message
    /// is collaborator-defined.
    #[error("constructor invocation failed: {0}")]
    ConstructorInvocation(String),

    /// The memory mapper was asked for a protection mode it does not support.
    ///
    /// Thread stacks are always mapped read/write; any other combination is
    /// rejected by [`crate::memory::MappedRegion::map`].
    #[error("unsupported mapping protection: {0:?}")]
    UnsupportedProtection(crate::memory::Protection),

    /// The underlying anonymous mapping could not be established.
    ///
    /// Wraps the I/O error reported by the mapping layer. On the thread `Create`
    /// path this is escalated to a fatal abort (no fallback size, no retry).
    #[error("memory mapping failed: {0}")]
    Map(#[from] std::io::Error),
}

/// Specialized Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
