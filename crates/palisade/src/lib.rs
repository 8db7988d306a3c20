// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # palisade
//!
//! Guarded in-memory buffers for cryptographic secrets.
//!
//! A [`Secret`] holds short-lived key material on pages the rest of
//! the process cannot reach by accident:
//!
//! - **Guard pages** — the user region sits between two `PROT_NONE`
//!   pages, so overruns and underruns fault in hardware.
//! - **Canary** — 128 random bytes just past the logical end catch
//!   overflows that stay inside the mapped pages; a mismatch aborts.
//! - **Pinning** — user pages are `mlock`ed and never reach swap.
//! - **Quiescence** — between uses the region is mapped `PROT_NONE`;
//!   access is granted per operation and revoked afterwards.
//! - **Guaranteed scrub** — contents are zeroized exactly once, on
//!   [`wipe`](Secret::wipe) or on drop, whichever comes first.
//!
//! Allocations are pessimistic: if the pages cannot be mapped or
//! pinned, no secret is created and an error is returned. If a
//! protection cannot be maintained on a live secret, the process
//! aborts rather than continue with undefined page rights.
//!
//! # Example
//!
//! ```rust
//! use palisade::Secret;
//!
//! fn example() -> Result<(), palisade::SecretError> {
//!     let mut key = Secret::new(32)?;
//!
//!     // Fill under a scoped write; protection is restored when the
//!     // guard drops, on every exit path.
//!     key.writing().fill(0xA5);
//!
//!     let backup = key.copy()?;
//!     assert!(key.equal(&backup));
//!
//!     // Explicit wipe; otherwise drop scrubs.
//!     key.wipe();
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! Use of this crate should be limited to storing cryptographic
//! secrets: every allocation costs at least three pages plus a
//! pin against the locked-pages quota, and every access toggles page
//! protections.

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(not(unix))]
compile_error!("palisade requires a Unix virtual-memory interface (mmap/mprotect/mlock)");

#[cfg(test)]
mod tests;

mod canary;
mod error;
mod fatal;
mod protect;
mod region;
mod secret;

pub use canary::{hardening_active, CANARY_LEN};
pub use error::SecretError;
pub use protect::AccessMode;
pub use secret::{ReadGuard, Secret, WriteGuard};
