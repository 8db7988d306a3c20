// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

#[cfg(test)]
mod tests {
    use palisade_util::ptr_offset;

    #[test]
    fn test_positive_offset() {
        let mut buf = [0u8; 16];
        let base = buf.as_mut_ptr();

        assert_eq!(ptr_offset(base, 7), buf[7..].as_mut_ptr());
    }

    #[test]
    fn test_negative_offset() {
        let mut buf = [0u8; 16];
        let base = buf.as_mut_ptr();
        let seventh = ptr_offset(base, 7);

        assert_eq!(ptr_offset(seventh, -7), base);
    }

    #[test]
    fn test_zero_offset() {
        let mut byte = 0u8;
        let ptr = &mut byte as *mut u8;

        assert_eq!(ptr_offset(ptr, 0), ptr);
    }
}
