// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Access-mode control for a secret's user region.

use crate::fatal::{self, Violation};

/// Access rights currently granted on a secret's user region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// No access; the quiesced state between uses.
    None,
    /// Read-only access.
    Read,
    /// Write-only access.
    Write,
    /// Read and write access.
    ReadWrite,
}

impl AccessMode {
    fn prot(self) -> libc::c_int {
        match self {
            AccessMode::None => libc::PROT_NONE,
            AccessMode::Read => libc::PROT_READ,
            AccessMode::Write => libc::PROT_WRITE,
            AccessMode::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
        }
    }
}

/// Applies `mode` to `len` bytes of user region starting at `ptr`.
///
/// The kernel widens the change to whole pages; the range never
/// includes a guard page. A zero-length region is left untouched.
/// Failure means the protection invariant is already lost and is
/// fatal.
pub(crate) fn set_access(ptr: *mut u8, len: usize, mode: AccessMode) {
    if len == 0 {
        return;
    }

    let failed = unsafe { libc::mprotect(ptr as *mut libc::c_void, len, mode.prot()) } != 0;

    if failed {
        fatal::die(Violation::ProtectionFailed);
    }
}
