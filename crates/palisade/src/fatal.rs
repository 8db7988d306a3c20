// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Process-fatal invariant violations.
//!
//! A violated memory-safety invariant leaves the process with
//! undefined page protections or a detected overflow already in
//! flight; recovery is not attempted. The violation is named on
//! stderr and the process aborts.

/// Invariant violations that abort the process.
///
/// The discriminant doubles as the exit code in test builds so
/// subprocess tests can assert which invariant fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    /// `mprotect` refused to change the user region's access rights.
    ProtectionFailed = 2,
    /// The overflow canary no longer matches the process canary.
    CanaryTriggered = 3,
    /// A wiped secret was transitioned, accessed, or wiped again.
    UseAfterWipe = 4,
    /// The process canary could not be filled with random bytes.
    InitFailed = 5,
}

impl Violation {
    fn diagnostic(self) -> &'static str {
        match self {
            Violation::ProtectionFailed => "palisade: memory protection change failed",
            Violation::CanaryTriggered => "palisade: buffer overflow canary triggered",
            Violation::UseAfterWipe => "palisade: secret used after wipe",
            Violation::InitFailed => "palisade: canary initialization failed",
        }
    }
}

/// Reports the violation and terminates the process.
///
/// Test builds exit with the violation code instead of raising
/// SIGABRT so the subprocess test harness can distinguish controlled
/// aborts from genuine faults.
pub(crate) fn die(violation: Violation) -> ! {
    eprintln!("{}", violation.diagnostic());

    #[cfg(test)]
    std::process::exit(violation as i32);

    #[cfg(not(test))]
    unsafe {
        libc::abort()
    }
}
