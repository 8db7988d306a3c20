// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use getrandom::Error as GetRandomError;

use crate::error::EntropyError;
use crate::system::SystemEntropySource;
use crate::traits::EntropySource;

#[test]
fn test_fill_bytes_with_failure() {
    let mut bytes = [0u8; 32];
    let result =
        SystemEntropySource::fill_bytes_with(&|_| Err(GetRandomError::UNSUPPORTED), &mut bytes);

    assert!(result.is_err());
    assert!(matches!(result, Err(EntropyError::EntropyNotAvailable)))
}

#[test]
fn test_fill_bytes_ok() {
    let source = SystemEntropySource {};
    let mut bytes = [0u8; 32];
    let result = source.fill_bytes(&mut bytes);

    assert!(result.is_ok());
}

#[test]
fn test_fill_bytes_changes_buffer() {
    let source = SystemEntropySource {};
    let mut bytes = [0u8; 64];

    source.fill_bytes(&mut bytes).expect("Failed to fill_bytes(..)");

    // 64 zero bytes from a working CSPRNG is not a realistic outcome
    assert!(bytes.iter().any(|&b| b != 0));
}

#[test]
fn test_fill_bytes_empty_dest() {
    let source = SystemEntropySource {};
    let mut bytes = [0u8; 0];

    assert!(source.fill_bytes(&mut bytes).is_ok());
}

#[test]
fn test_distinct_fills_differ() {
    let source = SystemEntropySource {};
    let mut first = [0u8; 32];
    let mut second = [0u8; 32];

    source.fill_bytes(&mut first).expect("Failed to fill_bytes(..)");
    source.fill_bytes(&mut second).expect("Failed to fill_bytes(..)");

    assert_ne!(first, second);
}
