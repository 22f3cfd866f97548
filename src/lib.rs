// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
//#![deny(unsafe_code)]
// - 'threading/registry.rs' keeps its member map in an UnsafeCell reached only under the registry mutex
// - 'threading/mutex.rs' releases the raw lock after proving ownership
// - 'memory/region.rs' and the attach path query the platform through libc

//! # javelin
//!
//! The thread-management core of the Javelin managed-code runtime. This crate sits below
//! every other runtime facility (class loading, interpretation, object allocation,
//! exception delivery) and provides the concurrency primitives and thread identity those
//! facilities are built on: per-OS-thread control blocks, stack memory provisioning, a
//! thread-local current-thread lookup, an ownership-tracking mutex, and the process-wide
//! thread registry with its clean-shutdown invariant.
//!
//! ## Features
//!
//! - **🧵 One control block per OS thread** - [`Thread`] carries identity, stack bounds,
//!   lifecycle state, the pending managed exception, and the native interop environment
//! - **📦 Provisioned stacks** - created threads get page-rounded, read/write mapped stack
//!   regions with exact bounds; attached threads get best-effort bounds for the stack they
//!   already have
//! - **🔒 Owner-tracked locking** - [`threading::Mutex`] pairs an OS lock primitive with an
//!   explicit owner compared by identity; unlock by a non-owner is rejected fatally
//! - **🗂️ Registry with a shutdown invariant** - the process-wide live-thread set refuses
//!   teardown while other threads remain registered
//! - **⚡ Managed exceptions as values** - exception signaling builds an initialized
//!   exception object through the class/object system and parks it on a thread
//!
//! ## Failure Model
//!
//! This layer has no degraded mode. Failures split three ways, and no operation retries:
//!
//! - **Invariant violations** (duplicate registration, unlock by a non-owner, double
//!   publication of a control block) are programming defects in the caller: process-fatal.
//! - **OS/resource failures** (stack mapping, thread spawn, slot publication) are
//!   boot-time-fatal conditions: process-fatal, no fallback and no retry.
//! - **Managed exceptions** are ordinary values attached to a thread for the layers above
//!   to deliver; only a failure to *construct* one escalates to a fatal abort.
//!
//! Fatal conditions surface as a `fatal:`-prefixed panic after logging at error level; the
//! runtime ships with `panic = "abort"`, making them true process termination.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use javelin::prelude::*;
//!
//! # struct NoObjects;
//! # impl javelin::objects::ObjectSystem for NoObjects {
//! #     fn resolve_class(&self, d: &str) -> javelin::Result<javelin::objects::ClassHandle> {
//! #         Err(javelin::Error::ClassNotFound(d.to_string()))
//! #     }
//! #     fn allocate_instance(&self, _: &javelin::objects::ClassHandle) -> javelin::Result<javelin::objects::ObjectHandle> {
//! #         Err(javelin::Error::StringAllocation)
//! #     }
//! #     fn intern_string(&self, _: &str) -> javelin::Result<javelin::objects::ObjectHandle> {
//! #         Err(javelin::Error::StringAllocation)
//! #     }
//! #     fn find_constructor(&self, _: &javelin::objects::ClassHandle, s: &str) -> javelin::Result<javelin::objects::ConstructorHandle> {
//! #         Err(javelin::Error::ConstructorNotFound { class: String::new(), signature: s.to_string() })
//! #     }
//! #     fn invoke_constructor(&self, _: &javelin::objects::ConstructorHandle, _: &javelin::objects::ObjectHandle, _: &javelin::objects::ObjectHandle) -> javelin::Result<()> {
//! #         Ok(())
//! #     }
//! # }
//! // Bootstrap the context with the embedder's class/object system.
//! let ctx = RuntimeContext::with_basic_interop(
//!     RuntimeConfig::default().with_stack_size(512 * 1024),
//!     Arc::new(NoObjects),
//! );
//!
//! // Adopt the embedding thread, then spawn a runtime thread.
//! let main = ctx.attach_current_thread();
//! let worker = ctx.create_thread(|thread| {
//!     assert_eq!(Thread::current().id(), thread.id());
//! });
//!
//! println!("{main}");
//!
//! // Orderly shutdown: workers wind down, the embedder detaches last.
//! ctx.detach_current_thread();
//! ```
//!
//! ## Architecture
//!
//! `javelin` is organized into several key modules:
//!
//! - [`threading`] - control blocks, lifecycle states, the current-thread lookup, the
//!   ownership-tracking [`threading::Mutex`], and the [`threading::ThreadRegistry`]
//! - [`memory`] - anonymous mapped regions provisioned as thread stacks
//! - [`runtime`] - the [`RuntimeConfig`] knobs and the [`RuntimeContext`] that owns
//!   bootstrap and teardown
//! - [`exception`] - building managed exception values and attaching them to threads
//! - [`objects`] / [`interop`] - the collaborator seams toward the class/object system and
//!   the native interop layer
//! - [`Error`] and [`Result`] - collaborator-boundary error handling
//!
//! ## Scheduling Model
//!
//! Preemptive OS threads, one per control block. This crate defines no green threads, no
//! work stealing and no cooperative yielding beyond standard mutex blocking; the waiting
//! states ([`ThreadState::Blocked`], [`ThreadState::Waiting`],
//! [`ThreadState::TimedWaiting`]) exist for the synchronization facilities layered above
//! it. Termination is always cooperative: a thread reaches
//! [`ThreadState::Terminated`] through its own progression, never through external
//! cancellation.
//!
//! ## Testing
//!
//! ```bash
//! cargo test
//! ```

#[macro_use]
pub(crate) mod macros;

pub(crate) mod error;


/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the javelin crate, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust,no_run
/// use javelin::prelude::*;
///
/// let config = RuntimeConfig::default();
/// assert!(config.stack_size > 0);
/// ```
pub mod prelude;

pub mod exception;
pub mod interop;
pub mod memory;
pub mod objects;
pub mod runtime;
pub mod threading;

pub use error::{Error, Result};
pub use runtime::{RuntimeConfig, RuntimeContext};
pub use threading::{Thread, ThreadState};
