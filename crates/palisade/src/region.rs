// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Guarded allocation for secret user regions.
//!
//! Layout of one allocation, in contiguous virtual pages:
//!
//! ```text
//! [ guard page ][ user pages ... ][ canary ][ guard page ]
//!   PROT_NONE    pinned, rounded    128 B     PROT_NONE
//! ```
//!
//! The user extent is `page_round_up(user_len + CANARY_LEN)` bytes,
//! so the canary always fits on mapped, pinnable pages. The guard
//! pages are mapped with no access and never pinned; any adjacent
//! overrun faults in hardware. The canary sits immediately after the
//! logical end of the user data and is verified on shrink and free.

use core::ptr;

use zeroize::Zeroize;

use palisade_util::{page_round_up, page_size, ptr_offset, ptr_page_base};

use crate::canary::{self, CANARY_LEN};
use crate::error::SecretError;
use crate::fatal::{self, Violation};
use crate::protect::{set_access, AccessMode};

/// Regions released so far; lets tests observe the finalizer path.
#[cfg(test)]
pub(crate) static FREED_REGIONS: core::sync::atomic::AtomicUsize =
    core::sync::atomic::AtomicUsize::new(0);

/// Bytes of mapped user capacity backing a region created for
/// `alloc_len` logical bytes.
pub(crate) fn rounded_len(alloc_len: usize) -> usize {
    page_round_up(alloc_len + CANARY_LEN)
}

/// Allocates a guarded, pinned, zeroed user region of `user_len`
/// bytes and installs the canary after it.
///
/// The region is returned quiesced (`PROT_NONE`).
pub(crate) fn alloc(user_len: usize) -> Result<*mut u8, SecretError> {
    // Bound the request so the page arithmetic below cannot overflow.
    if user_len > isize::MAX as usize / 2 {
        return Err(SecretError::ResourceExhausted);
    }

    let page = page_size();
    let rounded = rounded_len(user_len);
    let total = 2 * page + rounded;

    let base = unsafe {
        libc::mmap(
            ptr::null_mut(),
            total,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };

    if base == libc::MAP_FAILED {
        return Err(SecretError::ResourceExhausted);
    }

    let user_ptr = ptr_offset(base as *mut u8, page as isize);

    set_access(user_ptr, rounded, AccessMode::ReadWrite);

    // Only the user pages must never reach swap; the guards hold no
    // data and stay unpinned.
    if unsafe { libc::mlock(user_ptr as *const libc::c_void, rounded) } != 0 {
        unsafe { libc::munmap(base, total) };
        return Err(SecretError::PinFailed);
    }

    unsafe { core::slice::from_raw_parts_mut(user_ptr, rounded) }.zeroize();

    canary_write(user_ptr, user_len);

    set_access(user_ptr, rounded, AccessMode::None);

    Ok(user_ptr)
}

/// Moves the logical end of a region from `old_len` down to
/// `new_len`.
///
/// The old canary is verified, the dropped bytes are scrubbed, and a
/// fresh canary is installed at the new offset. Mapping and pinning
/// are untouched; only the logical length moves. Old canary bytes
/// past the new canary's coverage are left in place, so a write
/// across the old boundary still trips a later verify through the
/// bytes the new canary covers.
pub(crate) fn shrink(user_ptr: *mut u8, old_len: usize, new_len: usize) {
    debug_assert!(new_len < old_len);

    // Widen only the window the shrink touches: from the page holding
    // the new canary through the end of the old one.
    let window = ptr_page_base(ptr_offset(user_ptr, new_len as isize));
    let window_len = user_ptr as usize + old_len + CANARY_LEN - window as usize;

    set_access(window, window_len, AccessMode::ReadWrite);

    canary_verify(user_ptr, old_len);

    unsafe {
        core::slice::from_raw_parts_mut(ptr_offset(user_ptr, new_len as isize), old_len - new_len)
    }
    .zeroize();

    canary_write(user_ptr, new_len);

    set_access(window, window_len, AccessMode::None);
}

/// Verifies the canary, scrubs the region, and returns the whole
/// guarded mapping to the operating system.
///
/// `alloc_len` is the immutable capacity the region was created with;
/// it fixes the true mapped extent regardless of how far `user_len`
/// has been trimmed since.
pub(crate) fn free(user_ptr: *mut u8, user_len: usize, alloc_len: usize) {
    let page = page_size();
    let rounded = rounded_len(alloc_len);
    let total = 2 * page + rounded;
    let base = ptr_offset(user_ptr, -(page as isize));

    set_access(user_ptr, rounded, AccessMode::ReadWrite);

    canary_verify(user_ptr, user_len);

    // Scrub everything that may ever have held secret bytes, the
    // canary included, before the pages can be reused.
    unsafe { core::slice::from_raw_parts_mut(user_ptr, rounded) }.zeroize();

    unsafe {
        libc::munlock(user_ptr as *const libc::c_void, rounded);
        libc::munmap(base as *mut libc::c_void, total);
    }

    #[cfg(test)]
    FREED_REGIONS.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
}

/// Writes the process canary immediately after `user_len` bytes.
/// Caller must have the canary's pages writable.
fn canary_write(user_ptr: *mut u8, user_len: usize) {
    let canary_ptr = ptr_offset(user_ptr, user_len as isize);

    unsafe {
        ptr::copy_nonoverlapping(canary::canary().as_ptr(), canary_ptr, CANARY_LEN);
    }
}

/// Compares the canary at `user_len` against the process canary.
/// Caller must have the canary's pages readable. Mismatch is fatal.
fn canary_verify(user_ptr: *mut u8, user_len: usize) {
    let canary_ptr = ptr_offset(user_ptr, user_len as isize);
    let found = unsafe { core::slice::from_raw_parts(canary_ptr, CANARY_LEN) };

    if found != canary::canary() {
        fatal::die(Violation::CanaryTriggered);
    }
}
