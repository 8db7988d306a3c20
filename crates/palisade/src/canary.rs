// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Process-wide overflow canary and one-time initialization.
//!
//! Every allocation carries a copy of a single process-wide block of
//! random bytes immediately past its logical end; a mismatch on
//! shrink or free means an overflow happened. The block is filled
//! once, lazily, from the OS CSPRNG. Initialization also applies
//! best-effort process hardening (`PR_SET_DUMPABLE` on Linux) so
//! secret pages stay out of core dumps.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use palisade_rand::{EntropySource, SystemEntropySource};

use crate::fatal::{self, Violation};

/// Length in bytes of the overflow canary trailing every user region.
pub const CANARY_LEN: usize = 128;

/// Initialization state: not yet attempted
const STATE_UNINIT: u8 = 0;
/// Initialization state: in progress by another thread
const STATE_IN_PROGRESS: u8 = 1;
/// Initialization state: completed
const STATE_DONE: u8 = 2;

struct CanaryCell(UnsafeCell<[u8; CANARY_LEN]>);

// Safety: written exactly once, before STATE_DONE is published; every
// later access is a read ordered after the Acquire load of STATE_DONE.
unsafe impl Sync for CanaryCell {}

static INIT_STATE: AtomicU8 = AtomicU8::new(STATE_UNINIT);
static HARDENED: AtomicBool = AtomicBool::new(false);
static CANARY: CanaryCell = CanaryCell(UnsafeCell::new([0u8; CANARY_LEN]));

/// Returns the process canary, initializing it on first use.
///
/// Thread-safe and idempotent: concurrent first callers spin until
/// the winning thread publishes the value. Entropy failure is fatal;
/// the library never operates with a guessable canary.
pub(crate) fn canary() -> &'static [u8; CANARY_LEN] {
    if INIT_STATE.load(Ordering::Acquire) != STATE_DONE {
        init_slow();
    }

    unsafe { &*CANARY.0.get() }
}

#[cold]
#[inline(never)]
fn init_slow() {
    match INIT_STATE.compare_exchange(
        STATE_UNINIT,
        STATE_IN_PROGRESS,
        Ordering::Acquire,
        Ordering::Relaxed,
    ) {
        Ok(_) => {
            let bytes = unsafe { &mut *CANARY.0.get() };
            if (SystemEntropySource {}).fill_bytes(bytes).is_err() {
                fatal::die(Violation::InitFailed);
            }

            HARDENED.store(disable_core_dumps(), Ordering::Relaxed);
            INIT_STATE.store(STATE_DONE, Ordering::Release);
        }
        Err(_) => {
            // Another thread is initializing, spin until done
            while INIT_STATE.load(Ordering::Acquire) != STATE_DONE {
                core::hint::spin_loop();
            }
        }
    }
}

/// Returns whether core dumps could be disabled for this process.
///
/// Forces initialization on first call. `false` means the prctl was
/// refused (e.g. by seccomp) or the platform has no equivalent;
/// operation continues unhardened.
pub fn hardening_active() -> bool {
    let _ = canary();
    HARDENED.load(Ordering::Relaxed)
}

#[cfg(target_os = "linux")]
fn disable_core_dumps() -> bool {
    unsafe { libc::prctl(libc::PR_SET_DUMPABLE, 0, 0, 0, 0) == 0 }
}

#[cfg(not(target_os = "linux"))]
fn disable_core_dumps() -> bool {
    false
}
