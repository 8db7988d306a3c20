// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! The [`Secret`] buffer and its access state machine.

use core::cell::Cell;
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr;
use core::slice;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::SecretError;
use crate::fatal::{self, Violation};
use crate::protect::AccessMode;
use crate::region;

/// A guarded buffer for cryptographic key material.
///
/// The contents live on dedicated pages bracketed by two inaccessible
/// guard pages, pinned out of swap, with a random canary just past
/// the logical end. Between uses the pages are mapped `PROT_NONE`;
/// access must be requested explicitly and is revoked afterwards.
/// The contents are scrubbed exactly once, either by an explicit
/// [`wipe`](Secret::wipe) or when the value is dropped.
///
/// `Secret` is move-only. [`copy`](Secret::copy) is the explicit deep
/// operation; there is no `Clone`.
///
/// # Example
///
/// ```rust
/// use palisade::Secret;
///
/// let mut secret = Secret::new(8)?;
///
/// secret.writing().copy_from_slice(b"secrets!");
/// assert_eq!(&*secret.reading(), b"secrets!");
///
/// secret.wipe();
/// # Ok::<(), palisade::SecretError>(())
/// ```
///
/// # Wiped handles
///
/// After [`wipe`](Secret::wipe), [`len`](Secret::len) reports `0` and
/// [`as_ptr`](Secret::as_ptr) reports null, but every transition or
/// access is undefined; this implementation aborts the process.
///
/// # Threads
///
/// A `Secret` may move to another thread, but a single `Secret` must
/// not be used from two threads: the access mode is a property of the
/// underlying mapping and toggling it races at the kernel level. The
/// type is deliberately not `Sync`.
pub struct Secret {
    core: Option<SecretCore>,
}

// Safety: the region is owned exclusively by this value and moves
// with it. Shared concurrent use stays impossible because the access
// mode lives in a `Cell`, which keeps the type `!Sync`.
unsafe impl Send for Secret {}

/// Owner of one guarded region.
///
/// `ptr` is null for empty secrets. `alloc_len` is the capacity fixed
/// at creation; `len` only ever decreases below it.
struct SecretCore {
    ptr: *mut u8,
    len: usize,
    alloc_len: usize,
    mode: Cell<AccessMode>,
}

impl SecretCore {
    fn empty() -> Self {
        SecretCore {
            ptr: ptr::null_mut(),
            len: 0,
            alloc_len: 0,
            mode: Cell::new(AccessMode::None),
        }
    }

    fn with_len(len: usize) -> Result<Self, SecretError> {
        if len == 0 {
            return Ok(Self::empty());
        }

        let ptr = region::alloc(len)?;

        Ok(SecretCore {
            ptr,
            len,
            alloc_len: len,
            mode: Cell::new(AccessMode::None),
        })
    }

    /// Applies `mode` to the logical user region. Trivially valid on
    /// empty secrets, which have no pages to protect.
    fn set_mode(&self, mode: AccessMode) {
        if self.ptr.is_null() {
            return;
        }

        crate::protect::set_access(self.ptr, self.len, mode);
        self.mode.set(mode);
    }

    /// Runs `f` under `mode`, restoring the caller's mode afterwards.
    fn with_mode<R>(&self, mode: AccessMode, f: impl FnOnce(&Self) -> R) -> R {
        let prior = self.mode.get();

        self.set_mode(mode);
        let result = f(self);
        self.set_mode(prior);

        result
    }

    /// Scrubs and releases the region. Consumes the core so the
    /// release happens at most once.
    fn release(self) {
        if !self.ptr.is_null() {
            region::free(self.ptr, self.len, self.alloc_len);
        }
    }
}

impl Secret {
    /// Creates a secret of `len` zero bytes, quiesced.
    ///
    /// `len == 0` maps no pages and is always valid.
    ///
    /// # Errors
    ///
    /// [`SecretError::ResourceExhausted`] if the mapping is refused,
    /// [`SecretError::PinFailed`] if the pages cannot be pinned.
    pub fn new(len: usize) -> Result<Self, SecretError> {
        Ok(Secret {
            core: Some(SecretCore::with_len(len)?),
        })
    }

    /// Creates a secret from `src`, then scrubs `src` in place.
    ///
    /// The source cannot be protected retroactively: anything that
    /// copied it before this call is outside the library's reach.
    /// Call this as soon as the secret bytes exist.
    ///
    /// # Errors
    ///
    /// On allocation failure `src` is returned untouched; it remains
    /// the caller's responsibility.
    pub fn from_bytes(src: &mut [u8]) -> Result<Self, SecretError> {
        let secret = Self::new(src.len())?;

        if let Some(core) = &secret.core {
            if !core.ptr.is_null() {
                core.with_mode(AccessMode::Write, |core| unsafe {
                    ptr::copy_nonoverlapping(src.as_ptr(), core.ptr, core.len);
                });
            }
        }

        src.zeroize();

        Ok(secret)
    }

    /// The current logical length in bytes. `0` after a wipe.
    pub fn len(&self) -> usize {
        self.core.as_ref().map_or(0, |core| core.len)
    }

    /// Whether the logical length is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Base of the user region; null when empty or wiped.
    ///
    /// Reads through this pointer are valid only up to
    /// [`len`](Secret::len) bytes and only while a matching unlock is
    /// in effect.
    pub fn as_ptr(&self) -> *const u8 {
        self.core
            .as_ref()
            .map_or(ptr::null(), |core| core.ptr as *const u8)
    }

    /// Mutable base of the user region; null when empty or wiped.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.core.as_ref().map_or(ptr::null_mut(), |core| core.ptr)
    }

    /// Grants read-only access until the next transition.
    ///
    /// Pair every unlock with a [`lock`](Secret::lock) on each exit
    /// path, or prefer [`reading`](Secret::reading), which restores
    /// protection automatically.
    pub fn unlock_read(&self) {
        self.core().set_mode(AccessMode::Read);
    }

    /// Grants write-only access until the next transition.
    pub fn unlock_write(&self) {
        self.core().set_mode(AccessMode::Write);
    }

    /// Grants read-write access until the next transition.
    pub fn unlock_readwrite(&self) {
        self.core().set_mode(AccessMode::ReadWrite);
    }

    /// Revokes all access; the quiesced state.
    pub fn lock(&self) {
        self.core().set_mode(AccessMode::None);
    }

    /// Borrows the contents as a byte slice.
    ///
    /// # Safety
    ///
    /// The secret must currently be unlocked for reading
    /// ([`unlock_read`](Secret::unlock_read) or
    /// [`unlock_readwrite`](Secret::unlock_readwrite)) for the whole
    /// lifetime of the returned slice; otherwise any read faults.
    pub unsafe fn as_slice(&self) -> &[u8] {
        let core = self.core();

        if core.ptr.is_null() {
            return &[];
        }

        unsafe { slice::from_raw_parts(core.ptr, core.len) }
    }

    /// Borrows the contents as a mutable byte slice.
    ///
    /// # Safety
    ///
    /// The secret must currently be unlocked for writing for the
    /// whole lifetime of the returned slice; reads through the slice
    /// additionally require read access.
    pub unsafe fn as_slice_mut(&mut self) -> &mut [u8] {
        let core = self.core();

        if core.ptr.is_null() {
            return &mut [];
        }

        unsafe { slice::from_raw_parts_mut(core.ptr, core.len) }
    }

    /// Opens a scoped read-only view.
    ///
    /// The region becomes readable for the guard's lifetime; dropping
    /// the guard restores whatever mode was in effect before.
    pub fn reading(&self) -> ReadGuard<'_> {
        let core = self.core();
        let prior = core.mode.get();

        core.set_mode(AccessMode::Read);

        ReadGuard {
            secret: self,
            prior,
        }
    }

    /// Opens a scoped mutable view.
    ///
    /// A `&mut [u8]` admits reads as well as writes, so the region is
    /// widened to read-write for the guard's lifetime; use
    /// [`unlock_write`](Secret::unlock_write) for a strict write-only
    /// window. Dropping the guard restores the prior mode.
    pub fn writing(&mut self) -> WriteGuard<'_> {
        let core = self.core();
        let prior = core.mode.get();

        core.set_mode(AccessMode::ReadWrite);

        WriteGuard {
            secret: self,
            prior,
        }
    }

    /// Shrinks the logical length to `min(len, self.len())`,
    /// relocating the canary to the new end. A no-op when `len`
    /// is not smaller.
    ///
    /// The dropped bytes are scrubbed. Capacity and pinning are
    /// unchanged; a secret never grows.
    pub fn trim(&mut self, len: usize) {
        let core = self.core_mut();

        if len >= core.len {
            return;
        }

        let prior = core.mode.get();
        core.set_mode(AccessMode::None);

        region::shrink(core.ptr, core.len, len);
        core.len = len;

        core.set_mode(prior);
    }

    /// Splits off everything from `offset` onward into a new secret,
    /// trimming this one down to `offset` bytes.
    ///
    /// # Panics
    ///
    /// If `offset > self.len()`.
    ///
    /// # Errors
    ///
    /// Allocation failures for the new secret; this secret is then
    /// unchanged.
    pub fn split(&mut self, offset: usize) -> Result<Secret, SecretError> {
        let len = self.core().len;
        assert!(offset <= len, "split offset {offset} out of bounds of {len}");

        let tail_len = len - offset;
        let tail = Secret::new(tail_len)?;

        if tail_len > 0 {
            let src = self.core();
            let dst = tail.core();

            src.with_mode(AccessMode::Read, |src| {
                dst.with_mode(AccessMode::Write, |dst| unsafe {
                    ptr::copy_nonoverlapping(src.ptr.add(offset), dst.ptr, tail_len);
                });
            });
        }

        self.trim(offset);

        Ok(tail)
    }

    /// Copies the contents into a freshly allocated secret.
    ///
    /// # Errors
    ///
    /// Allocation failures for the new secret; this secret is then
    /// unchanged.
    pub fn copy(&self) -> Result<Secret, SecretError> {
        let src = self.core();
        let duplicate = Secret::new(src.len)?;

        if src.len > 0 {
            let dst = duplicate.core();

            src.with_mode(AccessMode::Read, |src| {
                dst.with_mode(AccessMode::Write, |dst| unsafe {
                    ptr::copy_nonoverlapping(src.ptr, dst.ptr, src.len);
                });
            });
        }

        Ok(duplicate)
    }

    /// Compares two secrets in constant time.
    ///
    /// Returns `false` immediately on a length mismatch; equal-length
    /// contents are compared without short-circuiting on the first
    /// differing byte. Both secrets are restored to their prior modes
    /// afterwards.
    pub fn equal(&self, other: &Secret) -> bool {
        let a = self.core();
        let b = other.core();

        if a.len != b.len {
            return false;
        }

        if a.len == 0 {
            return true;
        }

        a.with_mode(AccessMode::Read, |a| {
            b.with_mode(AccessMode::Read, |b| {
                let lhs = unsafe { slice::from_raw_parts(a.ptr, a.len) };
                let rhs = unsafe { slice::from_raw_parts(b.ptr, b.len) };

                lhs.ct_eq(rhs).into()
            })
        })
    }

    /// Scrubs and releases the region immediately.
    ///
    /// Dropping the secret later is a no-op; the wipe already ran the
    /// finalization path. A second explicit `wipe` is a caller bug
    /// and aborts.
    pub fn wipe(&mut self) {
        match self.core.take() {
            Some(core) => core.release(),
            None => fatal::die(Violation::UseAfterWipe),
        }
    }

    fn core(&self) -> &SecretCore {
        match &self.core {
            Some(core) => core,
            None => fatal::die(Violation::UseAfterWipe),
        }
    }

    fn core_mut(&mut self) -> &mut SecretCore {
        match &mut self.core {
            Some(core) => core,
            None => fatal::die(Violation::UseAfterWipe),
        }
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        if let Some(core) = self.core.take() {
            core.release();
        }
    }
}

impl fmt::Debug for Secret {
    /// Never exposes contents.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.core {
            Some(core) => f
                .debug_struct("Secret")
                .field("len", &core.len)
                .field("mode", &core.mode.get())
                .finish_non_exhaustive(),
            None => f.debug_struct("Secret").field("wiped", &true).finish(),
        }
    }
}

/// Scoped read-only view of a [`Secret`].
///
/// Restores the secret's prior access mode on drop, on every
/// control-flow exit.
pub struct ReadGuard<'a> {
    secret: &'a Secret,
    prior: AccessMode,
}

impl Deref for ReadGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { self.secret.as_slice() }
    }
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.secret.core().set_mode(self.prior);
    }
}

/// Scoped mutable view of a [`Secret`].
///
/// Restores the secret's prior access mode on drop, on every
/// control-flow exit.
pub struct WriteGuard<'a> {
    secret: &'a mut Secret,
    prior: AccessMode,
}

impl Deref for WriteGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { self.secret.as_slice() }
    }
}

impl DerefMut for WriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        unsafe { self.secret.as_slice_mut() }
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.secret.core().set_mode(self.prior);
    }
}
