//! fork/exit/wait/sleep/wakeup/kill/yield: the state transitions that move a
//! process between the free list, a ready-set, the sleep list, and zombie
//! state. spec.md §4.4.
//!
//! Every function here is a pure transformation of `&mut Ptable` so it can
//! be driven directly from tests, the same way `mlfq`/`stride`/`sched` are.
//! The context switch itself (`sched()`/`swtch`) is out of scope (spec.md
//! §6) and happens in the real kernel's scheduler loop, outside these
//! functions: callers that need to block (`wait`, `sleep`) get a `MustSleep`
//! / "now call sched()" signal back instead of this module performing the
//! switch itself.

use crate::collab;
use crate::param::MAXPROCNAME;
use crate::proc::list;
use crate::proc::mlfq;
use crate::proc::stride;
use crate::proc::table::{sent_mlfq, Ptable, SENT_RUN, SENT_SLEEP};
use crate::proc::{Proc, Procstate, Proctype, SchedError};

/// Sleep channel a process waits on while blocked in `wait()`, and the one
/// its parent is woken on by `exit()`. xv6 uses the `struct proc *` address
/// as the channel; since processes here are table indices rather than
/// pointers, the slot's index (offset by one, so that 0 keeps meaning "not
/// sleeping on anything") plays the same role.
pub fn chan_of(slot: usize) -> usize {
    slot + 1
}

/// Look in the free list for an UNUSED slot, give it a pid and a kernel
/// stack, and leave it EMBRYO. `spec.md` §4.4, §7 item 1.
pub fn allocproc(pt: &mut Ptable) -> Result<usize, SchedError> {
    let slot = pt.alloc_slot().ok_or(SchedError::NoFreeSlot)?;

    let kstack = unsafe { crate::kalloc::KMEM.kalloc::<u8>() };
    if kstack.is_null() {
        pt.procs[slot] = Proc::default();
        pt.free_slot(slot);
        return Err(SchedError::NoFreeSlot);
    }

    pt.procs[slot] = Proc::default();
    pt.procs[slot].state = Procstate::Embryo;
    pt.procs[slot].pid = pt.alloc_pid();
    pt.procs[slot].kstack = kstack as usize;
    Ok(slot)
}

/// Set up the first user process and hand it to the MLFQ side at level 0.
pub fn userinit(pt: &mut Ptable) {
    let slot = allocproc(pt).expect("userinit: out of process slots at boot");

    let pagetable = collab::setupkvm();
    collab::inituvm(pagetable, 4096);

    let name = b"initcode";
    pt.procs[slot].name[..name.len()].copy_from_slice(name);
    pt.procs[slot].sz = 4096;
    pt.procs[slot].ptype = Proctype::Mlfq;
    pt.procs[slot].privlevel = 0;

    pt.initproc = Some(slot);

    pt.procs[slot].state = Procstate::Runnable;
    mlfq::enqueue(pt, slot, 0);
}

/// Allocate a child, copy the parent's address space and file state into
/// it, and enqueue it RUNNABLE at MLFQ level 0 regardless of the parent's
/// own scheduling side. `spec.md` §4.4.
pub fn fork(pt: &mut Ptable, parent: usize) -> Result<u32, SchedError> {
    let child = allocproc(pt)?;

    if collab::copyuvm(0, pt.procs[parent].sz).is_err() {
        freeproc(pt, child);
        return Err(SchedError::ForkCopyFailed);
    }

    pt.procs[child].sz = pt.procs[parent].sz;
    pt.procs[child].parent = Some(parent);
    let name = pt.procs[parent].name;
    pt.procs[child].name = name;
    pt.procs[child].ptype = Proctype::Mlfq;
    pt.procs[child].privlevel = 0;
    pt.procs[child].ticks = 0;

    let pid = pt.procs[child].pid;
    pt.procs[child].state = Procstate::Runnable;
    mlfq::enqueue(pt, child, 0);

    Ok(pid)
}

/// Close out a process: wake its parent, reparent its children to
/// `initproc`, leave whichever ready-set it was on (returning tickets to
/// MLFQ if it was STRIDE), and mark it ZOMBIE. The caller must `sched()`
/// immediately afterward; this process never runs again.
pub fn exit(pt: &mut Ptable, slot: usize, xstate: i32) {
    if pt.initproc == Some(slot) {
        panic!("init exiting");
    }

    wakeup1(pt, chan_of(pt.procs[slot].parent.unwrap_or(slot)));

    let initproc = pt.initproc.expect("exit: no initproc to reparent orphans to");
    for i in 0..pt.procs.len() {
        if pt.procs[i].parent == Some(slot) {
            pt.procs[i].parent = Some(initproc);
            if pt.procs[i].state == Procstate::Zombie {
                wakeup1(pt, chan_of(initproc));
            }
        }
    }

    match pt.procs[slot].ptype {
        Proctype::Mlfq => mlfq::dequeue(pt, slot),
        Proctype::Stride => {
            pt.mlfq.tickets += pt.procs[slot].tickets;
            list::del(&mut pt.links, slot);
        }
    }

    pt.procs[slot].xstate = xstate;
    pt.procs[slot].state = Procstate::Zombie;
    log::debug!("pid {} exited, status {}", pt.procs[slot].pid, xstate);
}

/// Release a ZOMBIE's kernel stack and page table and return its slot to
/// the free list. Called by `wait()` once it has found a reapable child.
pub fn freeproc(pt: &mut Ptable, slot: usize) {
    if pt.procs[slot].kstack != 0 {
        unsafe { crate::kalloc::KMEM.kfree(pt.procs[slot].kstack as *mut u8) };
    }
    collab::freevm(0);
    pt.procs[slot] = Proc::default();
    pt.free_slot(slot);
}

pub enum WaitOutcome {
    Reaped(u32),
    NoChildren,
    MustSleep,
}

/// One pass over `parent`'s children. If a ZOMBIE is found it is reaped
/// immediately and its pid returned; otherwise the caller is told whether
/// to give up (`NoChildren`, also returned if `parent` has been killed) or
/// to `sleep(chan_of(parent), ptable.lock)` and call this again on wakeup.
pub fn wait(pt: &mut Ptable, parent: usize) -> WaitOutcome {
    let mut any_children = false;
    for i in 0..pt.procs.len() {
        if pt.procs[i].parent == Some(parent) && pt.procs[i].state != Procstate::Unused {
            any_children = true;
            if pt.procs[i].state == Procstate::Zombie {
                let pid = pt.procs[i].pid;
                freeproc(pt, i);
                return WaitOutcome::Reaped(pid);
            }
        }
    }

    if !any_children || pt.procs[parent].killed {
        WaitOutcome::NoChildren
    } else {
        WaitOutcome::MustSleep
    }
}

/// Give up the CPU for one scheduling round. A STRIDE process leaves the
/// run list so `stridelogic` re-inserts it onto the heap once the scheduler
/// loop completes this iteration. The caller must `sched()` immediately
/// afterward.
pub fn yield_now(pt: &mut Ptable, slot: usize) {
    if pt.procs[slot].ptype == Proctype::Stride {
        list::del(&mut pt.links, slot);
    }
    pt.procs[slot].state = Procstate::Runnable;
}

/// Move `slot` off whichever ready-set it's on and onto the sleep list,
/// blocked on `chan`. The caller must `sched()` immediately afterward and
/// call `sleep_exit` once control returns.
pub fn sleep_enter(pt: &mut Ptable, slot: usize, chan: usize) {
    pt.procs[slot].chan = chan;
    match pt.procs[slot].ptype {
        Proctype::Mlfq => mlfq::dequeue(pt, slot),
        Proctype::Stride => list::del(&mut pt.links, slot),
    }
    pt.procs[slot].state = Procstate::Sleeping;
    list::add_tail(&mut pt.links, SENT_SLEEP, slot);
}

pub fn sleep_exit(pt: &mut Ptable, slot: usize) {
    pt.procs[slot].chan = 0;
}

/// Wake every process sleeping on `chan`. MLFQ wakers go back onto their
/// current level's queue, preserving whatever privlevel boost/demotion left
/// them at while asleep. STRIDE wakers are pushed onto the heap here rather
/// than waiting for the next `stridelogic` pass for a process that ran —
/// see the REDESIGN FLAGS entry in SPEC_FULL.md.
pub fn wakeup1(pt: &mut Ptable, chan: usize) {
    let mut node = list::first(&pt.links, SENT_SLEEP);
    while let Some(cur) = node {
        let nxt = list::next(&pt.links, cur);
        if pt.procs[cur].chan == chan {
            list::del(&mut pt.links, cur);
            pt.procs[cur].chan = 0;
            pt.procs[cur].state = Procstate::Runnable;
            match pt.procs[cur].ptype {
                Proctype::Mlfq => mlfq::enqueue(pt, cur, pt.procs[cur].privlevel),
                Proctype::Stride => stride::pushheap(pt, cur),
            }
        }
        node = if nxt == SENT_SLEEP { None } else { Some(nxt) };
    }
}

/// Mark `pid` killed. If it's asleep, wake it the same way `wakeup1` does so
/// it can observe `killed` and exit once it returns to user space.
pub fn kill(pt: &mut Ptable, pid: u32) -> Result<(), SchedError> {
    let slot = (0..pt.procs.len())
        .find(|&i| pt.procs[i].pid == pid && pt.procs[i].state != Procstate::Unused)
        .ok_or(SchedError::UnknownPid)?;

    pt.procs[slot].killed = true;
    if pt.procs[slot].state == Procstate::Sleeping {
        list::del(&mut pt.links, slot);
        pt.procs[slot].chan = 0;
        pt.procs[slot].state = Procstate::Runnable;
        match pt.procs[slot].ptype {
            Proctype::Mlfq => mlfq::enqueue(pt, slot, pt.procs[slot].privlevel),
            Proctype::Stride => stride::pushheap(pt, slot),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc::table::Ptable;

    #[test]
    fn fork_enqueues_child_at_mlfq_level_zero() {
        let mut pt = Ptable::new();
        let parent = allocproc(&mut pt).unwrap();
        pt.procs[parent].state = Procstate::Running;

        let pid = fork(&mut pt, parent).unwrap();
        let child = (0..pt.procs.len())
            .find(|&i| pt.procs[i].pid == pid)
            .unwrap();
        assert_eq!(pt.procs[child].state, Procstate::Runnable);
        assert_eq!(pt.procs[child].privlevel, 0);
        assert_eq!(pt.procs[child].parent, Some(parent));
    }

    #[test]
    fn exit_returns_stride_tickets_to_mlfq() {
        let mut pt = Ptable::new();
        pt.initproc = Some(allocproc(&mut pt).unwrap());
        let slot = allocproc(&mut pt).unwrap();
        pt.procs[slot].parent = pt.initproc;
        pt.procs[slot].ptype = Proctype::Stride;
        pt.procs[slot].tickets = 30;
        pt.mlfq.tickets = 70;
        list::add_tail(&mut pt.links, SENT_RUN, slot);

        exit(&mut pt, slot, 0);

        assert_eq!(pt.mlfq.tickets, 100);
        assert_eq!(pt.procs[slot].state, Procstate::Zombie);
    }

    #[test]
    fn wait_reaps_zombie_child_and_returns_its_pid() {
        let mut pt = Ptable::new();
        let parent = allocproc(&mut pt).unwrap();
        let child = allocproc(&mut pt).unwrap();
        pt.procs[child].parent = Some(parent);
        let child_pid = pt.procs[child].pid;
        pt.procs[child].state = Procstate::Zombie;

        match wait(&mut pt, parent) {
            WaitOutcome::Reaped(pid) => assert_eq!(pid, child_pid),
            _ => panic!("expected a reaped child"),
        }
        assert_eq!(pt.procs[child].state, Procstate::Unused);
    }

    #[test]
    fn wait_with_no_children_returns_no_children() {
        let mut pt = Ptable::new();
        let parent = allocproc(&mut pt).unwrap();
        assert!(matches!(wait(&mut pt, parent), WaitOutcome::NoChildren));
    }

    #[test]
    fn wait_with_live_child_must_sleep() {
        let mut pt = Ptable::new();
        let parent = allocproc(&mut pt).unwrap();
        let child = allocproc(&mut pt).unwrap();
        pt.procs[child].parent = Some(parent);
        pt.procs[child].state = Procstate::Runnable;
        assert!(matches!(wait(&mut pt, parent), WaitOutcome::MustSleep));
    }

    #[test]
    fn orphan_reparented_to_initproc_on_exit() {
        let mut pt = Ptable::new();
        let init = allocproc(&mut pt).unwrap();
        pt.initproc = Some(init);
        let parent = allocproc(&mut pt).unwrap();
        pt.procs[parent].state = Procstate::Runnable;
        mlfq::enqueue(&mut pt, parent, 0);
        let child = allocproc(&mut pt).unwrap();
        pt.procs[child].parent = Some(parent);
        pt.procs[child].state = Procstate::Runnable;

        exit(&mut pt, parent, 0);

        assert_eq!(pt.procs[child].parent, Some(init));
    }

    #[test]
    fn kill_wakes_a_sleeping_mlfq_process() {
        let mut pt = Ptable::new();
        let slot = allocproc(&mut pt).unwrap();
        let pid = pt.procs[slot].pid;
        sleep_enter(&mut pt, slot, 0xdead);

        kill(&mut pt, pid).unwrap();

        assert!(pt.procs[slot].killed);
        assert_eq!(pt.procs[slot].state, Procstate::Runnable);
        assert!(!list::is_empty(&pt.links, sent_mlfq(0)));
    }

    #[test]
    fn kill_unknown_pid_is_an_error() {
        let mut pt = Ptable::new();
        assert_eq!(kill(&mut pt, 9999), Err(SchedError::UnknownPid));
    }

    #[test]
    fn wakeup1_pushes_stride_waker_onto_heap() {
        let mut pt = Ptable::new();
        let slot = allocproc(&mut pt).unwrap();
        pt.procs[slot].ptype = Proctype::Stride;
        pt.procs[slot].tickets = 10;
        sleep_enter(&mut pt, slot, 0x1234);

        wakeup1(&mut pt, 0x1234);

        assert_eq!(pt.procs[slot].state, Procstate::Runnable);
        assert_eq!(pt.stride.size, 1);
    }

    #[test]
    fn sleep_truncated_ticks_do_not_survive_a_rename() {
        // Regression guard for the MAXPROCNAME copy in fork: names longer
        // than the buffer must not panic.
        let mut pt = Ptable::new();
        let parent = allocproc(&mut pt).unwrap();
        pt.procs[parent].name = [b'a'; MAXPROCNAME];
        let pid = fork(&mut pt, parent).unwrap();
        assert!(pid > 0);
    }
}
