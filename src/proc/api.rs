//! The scheduler's public surface: the lock-taking, context-switching glue
//! around the pure `&mut Ptable` transforms in `lifecycle`/`mlfq`/`stride`/
//! `sched`. Everything here corresponds to a line in spec.md §6's "System-
//! call surface exposed by the core" — `fork`, `exit`, `wait`, `kill`,
//! `yield_cpu`, `sleep`/`wakeup`, `set_cpu_share`, `inctick` — plus the
//! per-CPU `scheduler()` loop from §4.5.
//!
//! Argument fetching from a trap frame and the trap/syscall-number dispatch
//! that would normally call into these (xv6's `argint`/`argaddr` and
//! `syscall()`) are out of scope per spec.md §1 ("system-call dispatch");
//! these functions are the boundary a real dispatch layer would call into,
//! already holding well-typed arguments.

use crate::proc::lifecycle::{self, chan_of, WaitOutcome};
use crate::proc::sched::{self, Picked};
use crate::proc::share;
use crate::proc::table::{Ptable, PTABLE, PTABLE_LOCK};
use crate::proc::{dump, mycpu, myproc, SchedError};

/// Acquire `ptable.lock`, run `f` against the global table, release, and
/// return whatever `f` produced. Every entry point in this module funnels
/// through here, mirroring `proc.c`'s `acquire(&ptable.lock) ... release`
/// bracketing around each syscall body.
fn with_ptable<R>(f: impl FnOnce(&mut Ptable) -> R) -> R {
    unsafe {
        PTABLE_LOCK.acquire();
        let r = f(&mut PTABLE);
        PTABLE_LOCK.release();
        r
    }
}

/// Set up the first user process at boot. Called once from `kmain` on the
/// boot hart, before `scheduler()` starts picking processes.
pub fn userinit() {
    with_ptable(|pt| lifecycle::userinit(pt));
}

pub fn fork() -> Result<u32, SchedError> {
    with_ptable(|pt| {
        let parent = myproc().expect("fork: no current process");
        lifecycle::fork(pt, parent)
    })
}

/// Never returns: the caller must immediately re-enter the scheduler loop,
/// which never switches back to a ZOMBIE. `ptable.lock` is held across both
/// the state transition and `sched()`'s switch away, exactly as `proc.c`'s
/// `exit()` holds it from its own `acquire` through the `sched()` call that
/// never returns.
pub fn exit(xstate: i32) -> ! {
    unsafe {
        PTABLE_LOCK.acquire();
        let me = myproc().expect("exit: no current process");
        lifecycle::exit(&mut PTABLE, me, xstate);
        sched();
    }
    unreachable!("exit: scheduled a ZOMBIE process");
}

pub fn wait() -> Result<u32, SchedError> {
    unsafe {
        PTABLE_LOCK.acquire();
        let parent = myproc().expect("wait: no current process");
        loop {
            match lifecycle::wait(&mut PTABLE, parent) {
                WaitOutcome::Reaped(pid) => {
                    PTABLE_LOCK.release();
                    return Ok(pid);
                }
                WaitOutcome::NoChildren => {
                    PTABLE_LOCK.release();
                    return Err(SchedError::NoChildren);
                }
                WaitOutcome::MustSleep => {
                    sleep_locked(chan_of(parent));
                }
            }
        }
    }
}

pub fn kill(pid: u32) -> Result<(), SchedError> {
    with_ptable(|pt| lifecycle::kill(pt, pid))
}

/// Give up the CPU for one round and immediately re-enter the scheduler.
/// `ptable.lock` is held across the transition and the switch away, same
/// reasoning as `exit`.
pub fn yield_cpu() {
    unsafe {
        PTABLE_LOCK.acquire();
        let me = myproc().expect("yield: no current process");
        lifecycle::yield_now(&mut PTABLE, me);
        sched();
        PTABLE_LOCK.release();
    }
}

/// Block the current process on `chan`. Caller must already hold
/// `ptable.lock` (the only lock this trimmed kernel's sleep/wakeup surface
/// needs — see SPEC_FULL.md's note on the dropped second-lock parameter).
/// Held continuously across `sched()`'s switch away and back, like `exit`
/// and `yield_cpu`.
fn sleep_locked(chan: usize) {
    unsafe {
        let me = myproc().expect("sleep: no current process");
        lifecycle::sleep_enter(&mut PTABLE, me, chan);
        sched();
        lifecycle::sleep_exit(&mut PTABLE, me);
    }
}

/// Block the calling process on `chan`. Acquires and releases
/// `ptable.lock` itself; callers that already hold it (like `wait`) use
/// `sleep_locked` instead to avoid a reentrant acquire.
pub fn sleep(chan: usize) {
    unsafe {
        PTABLE_LOCK.acquire();
        sleep_locked(chan);
        PTABLE_LOCK.release();
    }
}

pub fn wakeup(chan: usize) {
    with_ptable(|pt| lifecycle::wakeup1(pt, chan));
}

pub fn set_cpu_share(share_pct: i32) -> Result<(), SchedError> {
    with_ptable(|pt| {
        let me = myproc().expect("set_cpu_share: no current process");
        share::set_cpu_share(pt, me, share_pct)
    })
}

/// Charge the calling process's MLFQ `ticks` without it having to have run a
/// full tick of CPU time. Called from voluntary-sleep syscalls so blocking
/// cannot be used to dodge demotion. spec.md §4.6 / `proc.c`'s `inctick`.
pub fn inctick() {
    with_ptable(|pt| {
        if let Some(me) = myproc() {
            pt.procs[me].ticks += 1;
        }
    });
}

pub fn procdump() {
    unsafe { dump::procdump(&PTABLE) };
}

/// Save the running process's context, switch to this CPU's scheduler
/// context, and re-enter `scheduler()`'s loop. The caller must already hold
/// `ptable.lock` and have left the process in a non-RUNNING state; `sched`
/// checks those invariants (spec.md §7 item 2) before handing off.
///
/// The actual register save/restore is the per-CPU context-switch primitive
/// spec.md §6 lists as an external collaborator (`swtch`); it is declared in
/// `crate::proc` and intentionally has no body in this repository (see
/// DESIGN.md).
fn sched() {
    unsafe {
        let c = mycpu();
        let me = (*c).proc.expect("sched: no current process");
        sched::check_sched_invariants(PTABLE_LOCK.holding(), (*c).noff, PTABLE.procs[me].state);
        crate::proc::swtch_to_scheduler(me);
    }
}

/// The per-CPU scheduler loop (spec.md §4.5): pick a process via the single
/// pass comparator, switch to it, and on return run both sides' per-tick
/// bookkeeping before picking again.
pub fn scheduler() -> ! {
    loop {
        unsafe {
            crate::riscv::intr_on();

            PTABLE_LOCK.acquire();
            let picked = sched::pick(&mut PTABLE);
            if let Some(p) = &picked {
                let node = match p {
                    Picked::Mlfq(n) | Picked::Stride(n) => *n,
                };
                (*mycpu()).proc = Some(node);
                crate::proc::swtch_to_proc(node);
                (*mycpu()).proc = None;
            }
            sched::account(&mut PTABLE, &picked);
            PTABLE_LOCK.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_ptable_releases_the_lock_on_every_path() {
        with_ptable(|pt| {
            pt.mlfq.ticks += 1;
        });
        with_ptable(|pt| {
            assert_eq!(pt.mlfq.ticks, 1);
        });
    }
}
