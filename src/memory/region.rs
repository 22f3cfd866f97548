//! Anonymous read/write mappings used as thread stacks.

use std::sync::OnceLock;

use bitflags::bitflags;
use memmap2::{MmapMut, MmapOptions};

use crate::Result;

bitflags! {
    /// Protection modes understood by the memory mapper.
    ///
    /// This mirrors the `map(size, protection)` contract the runtime requires
    /// from the platform. Thread stacks are always requested as
    /// `READ | WRITE`; other combinations exist in the vocabulary but are
    /// rejected by [`MappedRegion::map`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Protection: u8 {
        /// Pages may be read.
        const READ = 0b0001;
        /// Pages may be written.
        const WRITE = 0b0010;
        /// Pages may be executed.
        const EXEC = 0b0100;
    }
}

/// Returns the platform page size in bytes.
///
/// The value is queried once and cached for the lifetime of the process.
#[must_use]
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(query_page_size)
}

#[cfg(unix)]
fn query_page_size() -> usize {
    // sysconf cannot fail for _SC_PAGESIZE on any supported platform.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    size as usize
}

#[cfg(not(unix))]
fn query_page_size() -> usize {
    4096
}

/// Rounds `value` up to the next multiple of the platform page size.
fn round_up_to_page(value: usize) -> usize {
    let page = page_size();
    (value + page - 1) & !(page - 1)
}

/// An anonymous memory mapping provisioned as a thread stack.
///
/// The region's length is the requested size rounded up to the platform page
/// size. Under the downward-growth model the high end of the range is the
/// stack [`base`](Self::base) and the low end the stack
/// [`limit`](Self::limit), so `base - limit` always equals the rounded
/// length and `limit < base` holds for every region.
///
/// # Examples
///
/// ```rust
/// use javelin::memory::{page_size, MappedRegion, Protection};
///
/// let region = MappedRegion::map(64 * 1024, Protection::READ | Protection::WRITE)?;
/// assert_eq!(region.base() - region.limit(), region.len());
/// assert_eq!(region.len() % page_size(), 0);
/// # Ok::<(), javelin::Error>(())
/// ```
#[derive(Debug)]
pub struct MappedRegion {
    /// The backing anonymous mapping. Kept alive for the region's lifetime.
    map: MmapMut,
}

impl MappedRegion {
    /// Maps an anonymous region of at least `len` bytes.
    ///
    /// The length is rounded up to the platform page size before mapping.
    /// Only `READ | WRITE` protection is supported; stacks are never mapped
    /// executable or read-only.
    ///
    /// # Arguments
    /// * `len` - Requested region size in bytes
    /// * `protection` - Requested protection, must be exactly `READ | WRITE`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnsupportedProtection`] for any protection
    /// other than `READ | WRITE`, or [`crate::Error::Map`] if the platform
    /// rejects the mapping.
    pub fn map(len: usize, protection: Protection) -> Result<MappedRegion> {
        if protection != Protection::READ | Protection::WRITE {
            return Err(crate::Error::UnsupportedProtection(protection));
        }

        let rounded = round_up_to_page(len);
        let map = MmapOptions::new().len(rounded).map_anon()?;

        Ok(MappedRegion { map })
    }

    /// Returns the mapped length in bytes (the requested size, page-rounded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the region has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the low end of the region: the stack limit.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.map.as_ptr() as usize
    }

    /// Returns the high end of the region: the stack base.
    ///
    /// Stacks grow downward, so the first frame lives just below this
    /// address and growth proceeds toward [`limit`](Self::limit).
    #[must_use]
    pub fn base(&self) -> usize {
        self.limit() + self.len()
    }
}
