//! Cross-thread synchronization scenarios: mutex ownership handoff and the
//! registry's membership and shutdown contracts.

use std::sync::mpsc;
use std::sync::Arc;

use javelin::prelude::*;

mod support;

use support::TestObjects;

fn context() -> Arc<RuntimeContext> {
    let _ = env_logger::builder().is_test(true).try_init();
    RuntimeContext::with_basic_interop(
        RuntimeConfig::default().with_stack_size(128 * 1024),
        Arc::new(TestObjects::default()),
    )
}

#[test]
fn try_lock_observes_handoff_between_threads() {
    // Thread A locks, B's try_lock fails, A unlocks, B's try_lock succeeds.
    let mutex = Arc::new(Mutex::new("handoff lock"));

    let (a_locked_tx, a_locked_rx) = mpsc::channel();
    let (b_failed_tx, b_failed_rx) = mpsc::channel();
    let (b_done_tx, b_done_rx) = mpsc::channel();

    let a_mutex = Arc::clone(&mutex);
    let a = std::thread::spawn(move || {
        a_mutex.lock();
        a_locked_tx.send(()).unwrap();
        b_failed_rx.recv().unwrap();
        a_mutex.unlock();
    });

    let b_mutex = Arc::clone(&mutex);
    let b = std::thread::spawn(move || {
        a_locked_rx.recv().unwrap();
        assert!(!b_mutex.try_lock());
        b_failed_tx.send(()).unwrap();

        // Spin until the release lands; try_lock never blocks.
        loop {
            if b_mutex.try_lock() {
                break;
            }
            std::thread::yield_now();
        }
        b_mutex.unlock();
        b_done_tx.send(()).unwrap();
    });

    b_done_rx.recv().unwrap();
    a.join().unwrap();
    b.join().unwrap();
    assert!(!mutex.is_held());
}

#[test]
fn lock_blocks_until_holder_releases() {
    let mutex = Arc::new(Mutex::new("blocking lock"));
    let (held_tx, held_rx) = mpsc::channel();

    mutex.lock();

    let waiter_mutex = Arc::clone(&mutex);
    let waiter = std::thread::spawn(move || {
        held_tx.send(()).unwrap();
        waiter_mutex.lock();
        waiter_mutex.unlock();
    });

    held_rx.recv().unwrap();
    // The waiter is parked (or about to be); releasing lets it finish.
    mutex.unlock();
    waiter.join().unwrap();
    assert_eq!(mutex.owner(), None);
}

#[test]
fn registry_round_trip_is_observable_noop() {
    let ctx = context();
    let main = ctx.attach_current_thread();

    let standalone = ThreadRegistry::new();
    assert!(standalone.is_empty());

    standalone.register(Arc::clone(&main));
    assert_eq!(standalone.len(), 1);
    standalone.unregister(&main);
    assert!(standalone.is_empty());
    assert!(!standalone.contains(&main));

    drop(standalone);
    ctx.detach_current_thread();
}

#[test]
fn registry_teardown_with_sole_survivor_being_destroyer() {
    let ctx = context();
    let main = ctx.attach_current_thread();

    let standalone = ThreadRegistry::new();
    standalone.register(Arc::clone(&main));
    // Still registered, but the destroying thread is the survivor.
    drop(standalone);

    ctx.detach_current_thread();
}

#[test]
#[should_panic(expected = "fatal:")]
fn registry_teardown_with_two_live_threads_is_rejected() {
    let ctx = context();
    let main = ctx.attach_current_thread();

    let (tx, rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let worker = ctx.create_thread(move |_| {
        tx.send(()).unwrap();
        release_rx.recv().unwrap();
    });
    rx.recv().unwrap();

    let standalone = ThreadRegistry::new();
    standalone.register(Arc::clone(&main));
    standalone.register(Arc::clone(&worker));

    let teardown = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        drop(standalone);
    }));

    // Unblock and drain the worker before the violation is re-raised, so
    // the runtime context itself still shuts down cleanly.
    release_tx.send(()).unwrap();
    loop {
        if ctx.registry().len() == 1 {
            break;
        }
        std::thread::yield_now();
    }
    ctx.detach_current_thread();

    std::panic::resume_unwind(teardown.unwrap_err());
}

#[test]
fn worker_threads_can_share_a_runtime_mutex() {
    let ctx = context();
    ctx.attach_current_thread();

    let mutex = Arc::new(Mutex::new("shared counter lock"));
    let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let (done_tx, done_rx) = mpsc::channel();

    for _ in 0..4 {
        let mutex = Arc::clone(&mutex);
        let counter = Arc::clone(&counter);
        let done_tx = done_tx.clone();
        ctx.create_thread(move |_| {
            for _ in 0..100 {
                mutex.lock();
                counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                mutex.unlock();
            }
            done_tx.send(()).unwrap();
        });
    }
    drop(done_tx);

    for _ in 0..4 {
        done_rx.recv().unwrap();
    }
    assert_eq!(counter.load(std::sync::atomic::Ordering::Relaxed), 400);

    loop {
        if ctx.registry().len() == 1 {
            break;
        }
        std::thread::yield_now();
    }
    ctx.detach_current_thread();
}
