// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! # palisade-rand
//!
//! Cryptographically secure random bytes for the palisade stack.
//!
//! The single production implementation, [`SystemEntropySource`],
//! reaches the OS CSPRNG through `getrandom`:
//!
//! - Linux/Android: `getrandom()` syscall
//! - macOS/iOS: `getentropy()`
//! - Other Unix: `/dev/urandom`
//!
//! ## Example
//!
//! ```rust
//! use palisade_rand::{EntropySource, SystemEntropySource};
//!
//! let entropy = SystemEntropySource {};
//!
//! let mut canary = [0u8; 128];
//! entropy.fill_bytes(&mut canary).expect("Failed to fill_bytes(..)");
//! ```

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
mod tests;

mod error;
mod system;
mod traits;

pub use error::EntropyError;
pub use system::SystemEntropySource;
pub use traits::EntropySource;
