// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

#[cfg(test)]
mod tests {
    use palisade_util::{page_size, ptr_offset, ptr_page_base};

    #[test]
    fn test_page_base_is_aligned() {
        let mut byte = 0u8;
        let base = ptr_page_base(&mut byte as *mut u8);

        assert_eq!(base as usize % page_size(), 0);
    }

    #[test]
    fn test_aligned_pointer_is_its_own_base() {
        let base = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                page_size(),
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        } as *mut u8;

        assert_eq!(ptr_page_base(base), base);

        unsafe { libc::munmap(base as *mut libc::c_void, page_size()) };
    }

    #[test]
    fn test_interior_pointer_resolves_to_page_start() {
        let base = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                page_size(),
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        } as *mut u8;
        let interior = ptr_offset(base, (page_size() / 2) as isize);

        assert_eq!(ptr_page_base(interior), base);

        unsafe { libc::munmap(base as *mut libc::c_void, page_size()) };
    }
}
