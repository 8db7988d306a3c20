// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Tests for the process canary.

use crate::canary::{canary, hardening_active, CANARY_LEN};

#[test]
fn test_canary_is_stable_across_calls() {
    assert_eq!(canary(), canary());
    assert!(core::ptr::eq(canary(), canary()));
}

#[test]
fn test_canary_is_not_all_zero() {
    // 128 zero bytes from a working CSPRNG is not a realistic outcome
    assert!(canary().iter().any(|&b| b != 0));
}

#[test]
fn test_canary_length() {
    assert_eq!(canary().len(), CANARY_LEN);
    assert_eq!(CANARY_LEN, 128);
}

#[test]
fn test_hardening_active_is_idempotent() {
    assert_eq!(hardening_active(), hardening_active());
}
