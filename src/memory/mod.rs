//! Memory provisioning for thread stacks.
//!
//! This module is the boundary to the platform's memory mapper. It provides
//! [`MappedRegion`], an anonymous read/write mapping used to back the managed
//! call stack of a runtime-created thread, and [`Protection`], the protection
//! vocabulary of the `map(size, protection)` contract.
//!
//! Regions are handed out with their length rounded up to the platform page
//! size, and expose their address range under the downward-growth model used
//! by every stack in the runtime: [`MappedRegion::base`] is the high end of
//! the range, [`MappedRegion::limit`] the low end.
//!
//! There is no unmap operation; a region is released when its owning thread
//! control block is dropped.

mod region;

pub use region::{page_size, MappedRegion, Protection};
