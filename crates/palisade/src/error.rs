// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for palisade.

use thiserror::Error;

/// Recoverable allocation failures surfaced by [`Secret`](crate::Secret)
/// constructors, [`copy`](crate::Secret::copy) and
/// [`split`](crate::Secret::split).
///
/// The failing call leaves the caller's state unchanged. No variant
/// carries secret bytes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SecretError {
    /// The operating system rejected the anonymous mapping.
    #[error("virtual memory mapping failed")]
    ResourceExhausted,

    /// The mapping succeeded but its pages could not be pinned into
    /// RAM (locked-pages quota, permissions). The mapping is undone
    /// before this is returned.
    #[error("failed to pin secret pages into RAM")]
    PinFailed,
}
