//! Per-CPU scheduler loop: pick Stride vs. MLFQ via the single pass
//! comparator, context switch, then run both sides' bookkeeping on the way
//! back. spec.md §4.5.

use crate::proc::stride::Ran;
use crate::proc::table::{Ptable, SENT_RUN};
use crate::proc::{list, mlfq, stride, Procstate, Proctype};
use crate::riscv::intr_get;

/// Which side produced the process we're about to run, kept around so the
/// caller knows whether to run `mlfqlogic` once it returns.
pub enum Picked {
    Mlfq(usize),
    Stride(usize),
}

/// `min(stride.heap[1].pass, mlfq.pass)`: if the heap's minimum pass is
/// smaller, Stride runs next; otherwise MLFQ's own selection runs.
pub fn pick(pt: &mut Ptable) -> Option<Picked> {
    if stride::getminpass(pt) < pt.mlfq.pass {
        let node = stride::popheap(pt).expect("getminpass < mlfq.pass implies a nonempty heap");
        list::add_tail(&mut pt.links, SENT_RUN, node);
        pt.procs[node].state = Procstate::Running;
        Some(Picked::Stride(node))
    } else {
        let node = mlfq::select(pt)?;
        pt.procs[node].state = Procstate::Running;
        Some(Picked::Mlfq(node))
    }
}

/// Run both sides' per-tick bookkeeping for whatever the loop just ran (or
/// didn't, if nothing was runnable).
pub fn account(pt: &mut Ptable, picked: &Option<Picked>) {
    match picked {
        Some(Picked::Mlfq(node)) => {
            mlfq::mlfqlogic(pt, *node);
            stride::stridelogic(pt, &Ran::Mlfq);
        }
        Some(Picked::Stride(node)) => {
            stride::stridelogic(pt, &Ran::Stride(*node));
        }
        None => {
            stride::stridelogic(pt, &Ran::Idle);
        }
    }
}

/// Asserted on every entry to `sched`, mirroring xv6's own checks: the
/// ptable lock must be held, push_off nesting must be exactly one level
/// deep (the one `sched` itself expects to hold across the switch), the
/// calling process must not still be RUNNING, and interrupts must be off.
pub fn check_sched_invariants(lock_held: bool, noff: u8, state: Procstate) {
    if !lock_held {
        panic!("sched: ptable.lock not held");
    }
    if noff != 1 {
        panic!("sched: noff != 1");
    }
    if state == Procstate::Running {
        panic!("sched: still RUNNING");
    }
    if intr_get() {
        panic!("sched: interruptible");
    }
}

/// Returns true if any process, of either type, is ready or sleeping (used
/// only by tests to assert the loop has something to do).
pub fn any_pending(pt: &Ptable) -> bool {
    for level in 0..crate::param::QSIZE {
        if !list::is_empty(&pt.links, crate::proc::table::sent_mlfq(level)) {
            return true;
        }
    }
    pt.stride.size > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc::Proctype;

    #[test]
    fn stride_runs_before_mlfq_when_its_pass_is_behind() {
        let mut pt = Ptable::new();
        pt.procs[0].ptype = Proctype::Mlfq;
        pt.procs[0].state = Procstate::Runnable;
        mlfq::enqueue(&mut pt, 0, 0);

        pt.procs[1].ptype = Proctype::Stride;
        pt.procs[1].state = Procstate::Runnable;
        pt.procs[1].tickets = 20;
        pt.procs[1].pass = 0;
        stride::pushheap(&mut pt, 1);

        pt.mlfq.pass = 1_000_000;

        match pick(&mut pt) {
            Some(Picked::Stride(n)) => assert_eq!(n, 1),
            _ => panic!("expected stride pick"),
        }
    }

    #[test]
    fn falls_back_to_mlfq_when_stride_pass_is_ahead() {
        let mut pt = Ptable::new();
        pt.procs[0].ptype = Proctype::Mlfq;
        pt.procs[0].state = Procstate::Runnable;
        mlfq::enqueue(&mut pt, 0, 0);

        pt.procs[1].ptype = Proctype::Stride;
        pt.procs[1].state = Procstate::Runnable;
        pt.procs[1].tickets = 20;
        pt.procs[1].pass = 1_000_000;
        stride::pushheap(&mut pt, 1);

        match pick(&mut pt) {
            Some(Picked::Mlfq(n)) => assert_eq!(n, 0),
            _ => panic!("expected mlfq pick"),
        }
    }

    #[test]
    fn idle_when_nothing_runnable() {
        let mut pt = Ptable::new();
        assert!(pick(&mut pt).is_none());
        assert!(!any_pending(&pt));
    }
}
