// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Page geometry and raw-pointer helpers.
//!
//! The guarded allocator works on whole virtual-memory pages; this
//! crate centralizes the page-size lookup and the byte-level pointer
//! arithmetic it needs. The page size is queried once from the OS and
//! cached in an atomic.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

use core::sync::atomic::{AtomicUsize, Ordering};

static PAGE_SIZE: AtomicUsize = AtomicUsize::new(0);

/// Returns the system page size in bytes.
///
/// The first call queries `sysconf(_SC_PAGESIZE)` and caches the
/// result. Concurrent first calls may each issue the syscall; they
/// all store the same value.
pub fn page_size() -> usize {
    match PAGE_SIZE.load(Ordering::Relaxed) {
        0 => {
            let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
            PAGE_SIZE.store(size, Ordering::Relaxed);
            size
        }
        size => size,
    }
}

/// Rounds `n` up to the smallest multiple of the page size that is
/// greater than or equal to it.
///
/// `page_round_up(0)` is one full page, so even an empty user region
/// reserves a page of capacity.
pub fn page_round_up(n: usize) -> usize {
    let page = page_size();

    if n == 0 {
        return page;
    }

    match n % page {
        0 => n,
        rem => n - rem + page,
    }
}

/// Offsets `ptr` by `delta` bytes, in either direction.
pub fn ptr_offset(ptr: *mut u8, delta: isize) -> *mut u8 {
    ptr.wrapping_offset(delta)
}

/// Returns the start of the page containing `ptr`.
pub fn ptr_page_base(ptr: *mut u8) -> *mut u8 {
    ptr.wrapping_sub(ptr as usize % page_size())
}
