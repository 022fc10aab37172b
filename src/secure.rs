// This file is part of Diceware.
//
// Copyright (c) 2025  René Coignard <contact@renecoignard.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Fixed-capacity memory for secret material.
//!
//! A [`SecureBuffer`] owns one page-aligned region of whole pages for its
//! whole lifetime, so no two buffers ever share a page and unlocking one
//! cannot unlock another. The region is locked against swapping while held
//! and is overwritten with zeros before it goes back to the allocator,
//! whichever path drops it.

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::slice;

use zeroize::Zeroize;

use crate::error::AllocationError;

const FALLBACK_PAGE_SIZE: usize = 4096;

/// What to do when the OS refuses to lock a region in RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    /// Log a warning and keep the unlocked region.
    #[default]
    BestEffort,
    /// Fail with [`AllocationError::LockFailed`].
    Required,
}

pub struct SecureBuffer {
    ptr: NonNull<u8>,
    /// `None` for zero capacity, where nothing is allocated.
    layout: Option<Layout>,
    capacity: usize,
    len: usize,
    locked: bool,
}

// SAFETY: the region is exclusively owned and only reachable through `&self`/`&mut self`.
unsafe impl Send for SecureBuffer {}
// SAFETY: shared access only ever reads the region.
unsafe impl Sync for SecureBuffer {}

impl SecureBuffer {
    pub fn new(capacity: usize) -> Result<Self, AllocationError> {
        Self::with_policy(capacity, LockPolicy::default())
    }

    pub fn with_policy(capacity: usize, policy: LockPolicy) -> Result<Self, AllocationError> {
        if capacity == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                layout: None,
                capacity: 0,
                len: 0,
                locked: false,
            });
        }

        let exhausted = || AllocationError::Exhausted { size: capacity };
        let page = page_size();
        let region = capacity.checked_next_multiple_of(page).ok_or_else(exhausted)?;
        let layout = Layout::from_size_align(region, page).map_err(|_| exhausted())?;

        // SAFETY: `layout` has a non-zero size.
        let ptr = NonNull::new(unsafe { alloc::alloc_zeroed(layout) }).ok_or_else(exhausted)?;

        let mut buffer = Self {
            ptr,
            layout: Some(layout),
            capacity,
            len: 0,
            locked: false,
        };
        buffer.locked = lock_region(ptr, region);

        if !buffer.locked {
            match policy {
                LockPolicy::Required => return Err(AllocationError::LockFailed { size: capacity }),
                LockPolicy::BestEffort => {
                    tracing::warn!(size = capacity, "memory lock refused, region may be swapped")
                }
            }
        }

        Ok(buffer)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The filled part of the region.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `len <= capacity <= region size`; the pointer is valid or dangling for len 0.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Hands out the whole usable region and marks all of it as filled.
    pub fn as_full_mut(&mut self) -> &mut [u8] {
        self.len = self.capacity;
        // SAFETY: `capacity <= region size` and `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
    }

    /// Whole pages backing the buffer, including the tail past `capacity`.
    fn region_mut(&mut self) -> &mut [u8] {
        let size = self.layout.map_or(0, |layout| layout.size());
        // SAFETY: the allocation is exactly `size` bytes, or `size` is zero.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), size) }
    }

    pub fn extend_from_slice(&mut self, data: &[u8]) -> Result<(), AllocationError> {
        let end = self.len + data.len();
        if end > self.capacity {
            return Err(AllocationError::CapacityExceeded {
                capacity: self.capacity,
                requested: end,
            });
        }

        let start = self.len;
        self.as_full_mut()[start..end].copy_from_slice(data);
        self.len = end;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.region_mut().zeroize();
        self.len = 0;
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.region_mut().zeroize();

        #[cfg(test)]
        release_log::record(self.capacity, self.region_mut());

        let Some(layout) = self.layout else {
            return;
        };

        if self.locked {
            // SAFETY: same region that was locked in `with_policy`, still owned here.
            unsafe {
                memsec::munlock(self.ptr.as_ptr(), layout.size());
            }
        }

        // SAFETY: allocated in `with_policy` with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
    }
}

impl fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(size)
        .ok()
        .filter(|size| size.is_power_of_two())
        .unwrap_or(FALLBACK_PAGE_SIZE)
}

#[cfg(not(unix))]
fn page_size() -> usize {
    FALLBACK_PAGE_SIZE
}

fn lock_region(ptr: NonNull<u8>, size: usize) -> bool {
    #[cfg(test)]
    if lock_refusal::active() {
        return false;
    }

    // SAFETY: the pointer and size describe one live allocation owned by the caller.
    unsafe { memsec::mlock(ptr.as_ptr(), size) }
}

/// Makes the OS lock call fail on the current thread.
#[cfg(test)]
pub(crate) mod lock_refusal {
    use std::cell::Cell;

    thread_local! {
        static REFUSE: Cell<bool> = const { Cell::new(false) };
    }

    pub(crate) fn active() -> bool {
        REFUSE.with(Cell::get)
    }

    /// Refuses locks until the guard is dropped.
    pub(crate) fn refuse() -> Guard {
        REFUSE.with(|refuse| refuse.set(true));
        Guard
    }

    pub(crate) struct Guard;

    impl Drop for Guard {
        fn drop(&mut self) {
            REFUSE.with(|refuse| refuse.set(false));
        }
    }
}

/// Snapshots of whole regions taken at the last moment before they are released.
#[cfg(test)]
pub(crate) mod release_log {
    use std::cell::RefCell;

    pub(crate) struct Released {
        pub capacity: usize,
        pub region: Vec<u8>,
    }

    thread_local! {
        static RELEASED: RefCell<Vec<Released>> = const { RefCell::new(Vec::new()) };
    }

    pub(crate) fn record(capacity: usize, region: &[u8]) {
        RELEASED.with(|released| {
            released.borrow_mut().push(Released {
                capacity,
                region: region.to_vec(),
            })
        });
    }

    pub(crate) fn take() -> Vec<Released> {
        RELEASED.with(|released| std::mem::take(&mut *released.borrow_mut()))
    }
}
