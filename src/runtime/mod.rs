//! Runtime-wide configuration and the process context.
//!
//! This module provides the two pieces of process-global state the thread
//! substrate hangs off of:
//!
//! - [`RuntimeConfig`] - plain-data knobs supplied by the embedder (stack
//!   size for created threads, interop checking, thread naming)
//! - [`RuntimeContext`] - the bootstrap/teardown anchor owning the thread
//!   registry, the class/object system, and the global interop handle
//!
//! # Lifecycle
//!
//! A process hosts at most one live context at a time. Bootstrap builds it
//! with [`RuntimeContext::new`]; threads are then adopted with
//! [`RuntimeContext::attach_current_thread`] or spawned with
//! [`RuntimeContext::create_thread`]; shutdown requires every thread except
//! at most the tearing-down one to have detached or terminated before the
//! context is dropped; the registry enforces this fatally.

mod config;
mod context;

pub use config::{RuntimeConfig, DEFAULT_STACK_SIZE};
pub use context::RuntimeContext;
