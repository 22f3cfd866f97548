//! The process-wide runtime context.

use std::sync::Arc;

use crate::exception;
use crate::interop::{BasicInteropFactory, InteropEnvFactory, InteropVm};
use crate::objects::ObjectSystem;
use crate::runtime::RuntimeConfig;
use crate::threading::{Thread, ThreadRegistry};

/// Owner of the thread substrate's process-global state.
///
/// The context anchors the [`ThreadRegistry`], the class/object system
/// collaborator, and the global interop handle, and is the only place
/// threads enter or leave the runtime. It also owns the lifecycle of the
/// current-thread storage slot: each OS thread gets exactly one
/// installation (at create/attach) and one removal (at detach or thread
/// exit).
///
/// # Lifecycle
///
/// 1. Bootstrap with [`new()`](Self::new) (or
///    [`with_basic_interop()`](Self::with_basic_interop))
/// 2. Adopt the embedding thread with
///    [`attach_current_thread()`](Self::attach_current_thread)
/// 3. Spawn workers with [`create_thread()`](Self::create_thread)
/// 4. Let every thread terminate or detach
/// 5. Drop the context. Teardown is fatal if any thread other than the
///    dropping one is still registered
///
/// # Example
///
/// ```rust,ignore
/// let ctx = RuntimeContext::new(RuntimeConfig::default(), objects, interop);
///
/// let main = ctx.attach_current_thread();
/// let worker = ctx.create_thread(|thread| {
///     // runs Runnable, registered, with `Thread::current()` == thread
/// });
///
/// // ... run the runtime ...
///
/// ctx.detach_current_thread();
/// drop(ctx);
/// ```
pub struct RuntimeContext {
    /// Embedder-supplied configuration.
    config: RuntimeConfig,

    /// The class/object system, consumed by exception signaling.
    objects: Arc<dyn ObjectSystem>,

    /// The global native-interop handle.
    interop: InteropVm,

    /// The process-wide set of live control blocks.
    registry: ThreadRegistry,
}

impl RuntimeContext {
    /// Bootstraps the context from configuration and collaborators.
    ///
    /// The interop factory is combined with the configuration's checking
    /// flag into the global [`InteropVm`] handle.
    pub fn new(
        config: RuntimeConfig,
        objects: Arc<dyn ObjectSystem>,
        interop_factory: Arc<dyn InteropEnvFactory>,
    ) -> Arc<RuntimeContext> {
        let interop = InteropVm::new(interop_factory, config.check_interop);
        Arc::new(RuntimeContext {
            config,
            objects,
            interop,
            registry: ThreadRegistry::new(),
        })
    }

    /// Bootstraps with [`BasicInteropFactory`] for embedders without a
    /// native layer.
    pub fn with_basic_interop(
        config: RuntimeConfig,
        objects: Arc<dyn ObjectSystem>,
    ) -> Arc<RuntimeContext> {
        RuntimeContext::new(config, objects, Arc::new(BasicInteropFactory))
    }

    /// Returns the runtime configuration.
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Returns the class/object system collaborator.
    #[must_use]
    pub fn objects(&self) -> &dyn ObjectSystem {
        self.objects.as_ref()
    }

    /// Returns the global native-interop handle.
    #[must_use]
    pub fn interop(&self) -> &InteropVm {
        &self.interop
    }

    /// Returns the process-wide thread registry.
    #[must_use]
    pub fn registry(&self) -> &ThreadRegistry {
        &self.registry
    }

    /// Spawns a new runtime thread executing `entry`.
    ///
    /// See the [threading module](crate::threading) documentation for the
    /// publication order and the workload contract. Stack mapping or OS
    /// spawn failure is fatal.
    pub fn create_thread<F>(self: &Arc<Self>, entry: F) -> Arc<Thread>
    where
        F: FnOnce(&Arc<Thread>) + Send + 'static,
    {
        Thread::create(self, Box::new(entry))
    }

    /// Adopts the calling OS thread into the runtime.
    ///
    /// Fatal if this thread is already attached.
    pub fn attach_current_thread(self: &Arc<Self>) -> Arc<Thread> {
        Thread::attach(self)
    }

    /// Withdraws the calling OS thread from the runtime: `Terminated`,
    /// unregistered, current-thread slot cleared.
    ///
    /// Fatal if this thread is not attached.
    pub fn detach_current_thread(&self) {
        Thread::detach(self);
    }

    /// Builds a managed exception and attaches it to `thread`.
    ///
    /// See [`exception::throw_new_exception`].
    pub fn throw_new_exception(&self, thread: &Thread, class_descriptor: &str, message: &str) {
        exception::throw_new_exception(self.objects(), thread, class_descriptor, message);
    }

    /// Formatted variant of [`throw_new_exception`](Self::throw_new_exception),
    /// bounded by [`exception::EXCEPTION_MESSAGE_CAPACITY`].
    pub fn throw_new_exception_fmt(
        &self,
        thread: &Thread,
        class_descriptor: &str,
        args: std::fmt::Arguments<'_>,
    ) {
        exception::throw_new_exception_fmt(self.objects(), thread, class_descriptor, args);
    }
}
