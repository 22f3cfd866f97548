//! The per-OS-thread control block and its lifecycle.
//!
//! A [`Thread`] records everything the runtime knows about one OS thread:
//! its logical and native identity, the bounds of its managed call stack,
//! its lifecycle [`ThreadState`], the at-most-one pending managed
//! exception, and the native interop environment owned by the thread.
//!
//! Control blocks come into existence on exactly two paths:
//!
//! - **Create**: the runtime provisions a fresh, guarded read/write stack
//!   region, constructs the block, and spawns a new detached OS thread
//!   whose trampoline publishes the block and runs the supplied workload.
//! - **Attach**: an existing OS thread (one the runtime did not spawn) is
//!   adopted: the block is constructed with best-effort bounds for the
//!   native stack that already exists, published to the calling thread's
//!   slot, and registered.
//!
//! Publication is ordered: stack provisioning and control-block
//! construction always complete before the block becomes visible through
//! [`Thread::current`] or the registry, so no reader ever observes a
//! half-initialized thread.
//!
//! # Workload contract
//!
//! The workload given to the create path is a boxed `FnOnce(&Arc<Thread>)`.
//! It runs after the trampoline has published and registered the block and
//! moved it to `Runnable`. When it returns, the thread cooperatively
//! transitions to `Terminated`, unregisters itself, and clears its slot;
//! termination is never forced from outside.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use crossbeam_utils::atomic::AtomicCell;

use crate::interop::InteropEnv;
use crate::memory::{page_size, MappedRegion, Protection};
use crate::objects::ObjectHandle;
use crate::runtime::RuntimeContext;
use crate::threading::{current_native_id, tls, NativeThreadId, ThreadState};

/// Process-unique logical identity of a thread, assigned at construction.
pub type ThreadId = u32;

/// The workload a runtime-created thread executes once it is runnable.
///
/// Supplied by the surrounding runtime to
/// [`RuntimeContext::create_thread`](crate::runtime::RuntimeContext::create_thread);
/// receives the thread's own control block. Return ends the thread's
/// managed life.
pub type ThreadEntry = Box<dyn FnOnce(&Arc<Thread>) + Send + 'static>;

/// Next logical thread id. Ids start at 1 and are never reused.
static NEXT_THREAD_ID: AtomicU32 = AtomicU32::new(1);

/// Native-id value of a created thread before its trampoline has run.
const NATIVE_ID_UNSET: u64 = 0;

/// The per-OS-thread control block.
///
/// Exactly one control block exists per live OS thread, and a thread
/// resolves its own block in O(1) via [`Thread::current`]. The block's
/// stack, state, and exception slot belong to its own thread; collaborating
/// runtime code (e.g. exception signaling) may write the state and
/// exception slot on that thread's behalf under its own synchronization.
///
/// The `Display` rendering is the thread-dump line used across the runtime:
/// `Thread[<address>,id=<id>,tid=<native id>,state=<state name>]`.
pub struct Thread {
    /// Process-unique logical id.
    id: ThreadId,

    /// OS identity; [`NATIVE_ID_UNSET`] until the owning thread records it.
    native_id: AtomicU64,

    /// Lifecycle state; starts [`ThreadState::New`] until publication.
    state: AtomicCell<ThreadState>,

    /// High end of the stack range (stacks grow downward).
    stack_base: usize,

    /// Low end of the stack range.
    stack_limit: usize,

    /// The owned stack mapping. `None` for attached threads, whose native
    /// stack already exists and is merely described by the bounds above.
    stack: Option<MappedRegion>,

    /// At most one pending managed exception.
    pending_exception: parking_lot::Mutex<Option<ObjectHandle>>,

    /// The native interop environment, constructed once at attach/create.
    interop_env: OnceLock<InteropEnv>,
}

impl Thread {
    /// Constructs a control block in the `New` state.
    fn new(stack: Option<MappedRegion>, stack_base: usize, stack_limit: usize) -> Thread {
        Thread {
            id: NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed),
            native_id: AtomicU64::new(NATIVE_ID_UNSET),
            state: AtomicCell::new(ThreadState::New),
            stack_base,
            stack_limit,
            stack,
            pending_exception: parking_lot::Mutex::new(None),
            interop_env: OnceLock::new(),
        }
    }

    /// Spawns a new runtime thread executing `entry`.
    ///
    /// Provisions a read/write stack region of the configured size (fatal
    /// if the mapping fails; there is no fallback size and no retry),
    /// constructs the control block with the region's high end as base and
    /// low end as limit, and starts a detached OS thread. The trampoline
    /// on that thread publishes the block to its current-thread slot,
    /// constructs the interop environment, moves the state to `Runnable`,
    /// registers with the registry, and only then runs `entry`.
    ///
    /// Returns the new control block immediately; the native id reads as 0
    /// until the spawned thread has published itself. OS spawn failure is
    /// fatal.
    pub(crate) fn create(ctx: &Arc<RuntimeContext>, entry: ThreadEntry) -> Arc<Thread> {
        let stack_size = ctx.config().stack_size;
        let stack = match MappedRegion::map(stack_size, Protection::READ | Protection::WRITE) {
            Ok(region) => region,
            Err(error) => fatal!("failed to allocate thread stack: {}", error),
        };

        let stack_base = stack.base();
        let stack_limit = stack.limit();
        let thread = Arc::new(Thread::new(Some(stack), stack_base, stack_limit));

        let trampoline_ctx = Arc::clone(ctx);
        let trampoline_thread = Arc::clone(&thread);
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", ctx.config().thread_name_prefix, thread.id))
            .spawn(move || trampoline(trampoline_ctx, trampoline_thread, entry));

        // Detached: the handle is dropped, the thread winds itself down.
        match spawned {
            Ok(_handle) => {}
            Err(error) => fatal!("failed to spawn OS thread: {}", error),
        }

        thread
    }

    /// Adopts the calling OS thread into the runtime.
    ///
    /// Constructs a control block with best-effort bounds for the calling
    /// thread's existing native stack, records the native id, moves the
    /// state to `Runnable`, publishes the block to the current-thread slot
    /// (fatal if the calling thread is already attached), constructs the
    /// interop environment with the configured checking mode, and registers
    /// the block as the final step, so an attached thread is part of the
    /// observable thread set before this returns.
    pub(crate) fn attach(ctx: &Arc<RuntimeContext>) -> Arc<Thread> {
        let (stack_base, stack_limit) = native_stack_bounds(ctx.config().stack_size);
        let thread = Arc::new(Thread::new(None, stack_base, stack_limit));

        thread
            .native_id
            .store(current_native_id(), Ordering::Release);
        thread.set_state(ThreadState::Runnable);

        tls::install(Arc::clone(&thread));

        thread.publish_interop_env(ctx.interop().create_env(thread.id));

        ctx.registry().register(Arc::clone(&thread));
        thread
    }

    /// Withdraws the calling OS thread from the runtime.
    ///
    /// The reverse of attach: transitions to `Terminated`, unregisters, and
    /// clears the current-thread slot. Fatal if the calling thread is not
    /// attached.
    pub(crate) fn detach(ctx: &RuntimeContext) {
        let thread = match tls::clear() {
            Some(thread) => thread,
            None => fatal!("detach of an OS thread that is not attached"),
        };

        thread.set_state(ThreadState::Terminated);
        ctx.registry().unregister(&thread);
    }

    /// Returns the calling OS thread's control block.
    ///
    /// Valid only after the thread has been created or attached; calling
    /// this from an unadopted OS thread is a fatal contract violation. Use
    /// [`try_current`](Self::try_current) where absence is expected.
    #[must_use]
    pub fn current() -> Arc<Thread> {
        match Thread::try_current() {
            Some(thread) => thread,
            None => fatal!("no control block installed for this OS thread"),
        }
    }

    /// Returns the calling OS thread's control block, or `None` if this
    /// thread has not been adopted into the runtime.
    #[must_use]
    pub fn try_current() -> Option<Arc<Thread>> {
        tls::current()
    }

    /// Returns the process-unique logical id.
    #[must_use]
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Returns the native OS identity, or 0 for a created thread whose
    /// trampoline has not yet published it.
    #[must_use]
    pub fn native_id(&self) -> NativeThreadId {
        self.native_id.load(Ordering::Acquire)
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ThreadState {
        self.state.load()
    }

    /// Sets the lifecycle state.
    ///
    /// State transitions are cooperative: the owning thread (or runtime
    /// code acting on its behalf) moves the state along; nothing external
    /// forces `Terminated`.
    pub fn set_state(&self, state: ThreadState) {
        self.state.store(state);
    }

    /// Returns the high end of this thread's stack range.
    #[must_use]
    pub fn stack_base(&self) -> usize {
        self.stack_base
    }

    /// Returns the low end of this thread's stack range.
    #[must_use]
    pub fn stack_limit(&self) -> usize {
        self.stack_limit
    }

    /// Returns the stack extent in bytes (`base - limit`).
    ///
    /// Exact for created threads (the requested size rounded to the page
    /// size); best-effort for attached threads.
    #[must_use]
    pub fn stack_size(&self) -> usize {
        self.stack_base - self.stack_limit
    }

    /// Attaches a managed exception to this thread's pending slot.
    ///
    /// Overwrites (and logs) any exception already pending; delivery policy
    /// for the displaced value belongs to the layers above this crate.
    pub fn set_pending_exception(&self, exception: ObjectHandle) {
        let mut slot = self.pending_exception.lock();
        if slot.is_some() {
            log::warn!("overwriting pending exception on {self}");
        }
        *slot = Some(exception);
    }

    /// Removes and returns the pending exception, leaving the slot empty.
    #[must_use]
    pub fn take_pending_exception(&self) -> Option<ObjectHandle> {
        self.pending_exception.lock().take()
    }

    /// Returns the pending exception without clearing the slot.
    #[must_use]
    pub fn pending_exception(&self) -> Option<ObjectHandle> {
        self.pending_exception.lock().clone()
    }

    /// Returns `true` while an exception is pending on this thread.
    #[must_use]
    pub fn has_pending_exception(&self) -> bool {
        self.pending_exception.lock().is_some()
    }

    /// Returns this thread's native interop environment.
    ///
    /// `None` only before the owning thread has finished publication; the
    /// environment is owned exclusively by this control block and is
    /// usable only from its thread.
    #[must_use]
    pub fn interop_env(&self) -> Option<&InteropEnv> {
        self.interop_env.get()
    }

    /// Installs the interop environment, exactly once.
    pub(crate) fn publish_interop_env(&self, env: InteropEnv) {
        if self.interop_env.set(env).is_err() {
            fatal!("interop environment already constructed for {self}");
        }
    }

    /// Constructs an unpublished control block for unit tests.
    #[cfg(test)]
    pub(crate) fn unpublished() -> Thread {
        let (stack_base, stack_limit) = approximate_stack_bounds(64 * 1024);
        let thread = Thread::new(None, stack_base, stack_limit);
        thread
            .native_id
            .store(current_native_id(), Ordering::Release);
        thread
    }
}

impl fmt::Display for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Thread[{:p},id={},tid={},state={}]",
            self as *const Thread,
            self.id,
            self.native_id(),
            self.state()
        )
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.id)
            .field("native_id", &self.native_id())
            .field("state", &self.state())
            .field("stack_base", &self.stack_base)
            .field("stack_limit", &self.stack_limit)
            .finish()
    }
}

/// Entry point of a runtime-created OS thread.
///
/// Publishes the control block, runs the workload, and winds the thread
/// down cooperatively. The publication order here is the create-path
/// counterpart of the attach sequence: slot install, interop environment,
/// `Runnable`, registration, workload.
fn trampoline(ctx: Arc<RuntimeContext>, thread: Arc<Thread>, entry: ThreadEntry) {
    thread
        .native_id
        .store(current_native_id(), Ordering::Release);

    tls::install(Arc::clone(&thread));
    thread.publish_interop_env(ctx.interop().create_env(thread.id()));
    thread.set_state(ThreadState::Runnable);
    ctx.registry().register(Arc::clone(&thread));

    entry(&thread);

    thread.set_state(ThreadState::Terminated);
    ctx.registry().unregister(&thread);
    tls::clear();
}

/// Determines the bounds of the calling thread's existing native stack.
///
/// On Linux the exact range is read back from the platform's thread
/// attributes. Elsewhere the bounds fall back to a page-rounded
/// approximation anchored at a local address; this is explicitly a
/// heuristic for adopted threads, not the hard bound the create path
/// provides.
#[cfg(target_os = "linux")]
fn native_stack_bounds(fallback_size: usize) -> (usize, usize) {
    unsafe {
        let mut attr: libc::pthread_attr_t = std::mem::zeroed();
        if libc::pthread_getattr_np(libc::pthread_self(), &mut attr) == 0 {
            let mut addr: *mut libc::c_void = std::ptr::null_mut();
            let mut size: libc::size_t = 0;
            let rc = libc::pthread_attr_getstack(&attr, &mut addr, &mut size);
            libc::pthread_attr_destroy(&mut attr);
            if rc == 0 {
                let limit = addr as usize;
                return (limit + size, limit);
            }
        }
    }
    approximate_stack_bounds(fallback_size)
}

/// See the Linux variant; non-Linux platforms always approximate.
#[cfg(not(target_os = "linux"))]
fn native_stack_bounds(fallback_size: usize) -> (usize, usize) {
    approximate_stack_bounds(fallback_size)
}

/// Approximates stack bounds from the address of a local, rounded up to the
/// next page as the base, extending one configured stack size downward.
fn approximate_stack_bounds(assumed_size: usize) -> (usize, usize) {
    let probe = 0u8;
    let anchor = std::ptr::addr_of!(probe) as usize;
    let page = page_size();
    let base = (anchor + page - 1) & !(page - 1);
    let limit = base.saturating_sub(assumed_size);

    log::warn!(
        "approximated native stack bounds [{limit:#x},{base:#x}) for attached thread"
    );
    (base, limit)
}
