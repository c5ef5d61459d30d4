//! Trap vector setup. Actual trap dispatch — `usertrap`/`usertrapret`,
//! trap-frame construction, and the syscall-number switch — is out of scope
//! per spec.md §1 ("trap-frame construction... system-call dispatch, the
//! tick interrupt source" are named external collaborators); this module
//! keeps only the hart-local vector-register setup those collaborators
//! would otherwise need, so `kmain` has somewhere real to call into on
//! real hardware without pulling in the trampoline/kernelvec assembly (see
//! `crate::asm`, DESIGN.md).

use crate::spinlock::Spinlock;

static mut TICKS_LOCK: Option<Spinlock> = None;

pub fn trapinit() {
    unsafe {
        TICKS_LOCK = Some(Spinlock::init_lock("time"));
    }
}

/// Point `stvec` at the kernel trap vector. On real hardware this would be
/// `kernelvec.S`'s entry point; that assembly isn't part of this repository
/// (see `crate::asm`), so the riscv64 build has nothing valid to point at
/// yet and this is a no-op until a real boot image supplies one.
#[cfg(target_arch = "riscv64")]
pub fn trapinithart() {}

#[cfg(not(target_arch = "riscv64"))]
pub fn trapinithart() {}
