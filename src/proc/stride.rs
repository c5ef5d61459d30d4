//! Proportional-share scheduling: a 1-indexed binary min-heap of Stride
//! processes keyed by `pass`, plus the per-tick pass accounting and
//! overflow rebase. See spec.md §4.3.

use crate::param::{BARRIER, LARGE, NPROC};
use crate::proc::list;
use crate::proc::table::{Ptable, SENT_RUN};
use crate::proc::Procstate;

pub struct Stride {
    /// 1-indexed; heap[0] is unused so that child(i) = 2i/2i+1 holds.
    pub heap: [usize; NPROC + 1],
    pub size: usize,
}

impl Stride {
    pub const fn empty() -> Self {
        Stride {
            heap: [0; NPROC + 1],
            size: 0,
        }
    }
}

/// STRD(t) = LARGE / t. A scheduled tick of a participant with `tickets`
/// tickets advances its pass by this amount.
pub fn strd(tickets: i32) -> u64 {
    LARGE / tickets as u64
}

/// Smallest pass on the heap, or an effectively-infinite sentinel when the
/// heap is empty so the MLFQ side always wins the comparator (spec.md
/// §4.3's `getminpass`, which returns MAXINT for the same reason — we use
/// u64::MAX instead of a 32-bit MAXINT since pass values routinely exceed
/// i32::MAX well before a BARRIER rebase brings them back down).
pub fn getminpass(pt: &Ptable) -> u64 {
    if pt.stride.size == 0 {
        u64::MAX
    } else {
        pt.procs[pt.stride.heap[1]].pass
    }
}

fn sift_up(pt: &mut Ptable, mut i: usize) {
    while i > 1 {
        let parent = i / 2;
        if pt.procs[pt.stride.heap[parent]].pass <= pt.procs[pt.stride.heap[i]].pass {
            break;
        }
        pt.stride.heap.swap(parent, i);
        i = parent;
    }
}

fn sift_down(pt: &mut Ptable, mut i: usize) {
    loop {
        let left = 2 * i;
        let right = 2 * i + 1;
        let mut smallest = i;
        if left <= pt.stride.size
            && pt.procs[pt.stride.heap[left]].pass < pt.procs[pt.stride.heap[smallest]].pass
        {
            smallest = left;
        }
        if right <= pt.stride.size
            && pt.procs[pt.stride.heap[right]].pass < pt.procs[pt.stride.heap[smallest]].pass
        {
            smallest = right;
        }
        if smallest == i {
            break;
        }
        pt.stride.heap.swap(smallest, i);
        i = smallest;
    }
}

pub fn pushheap(pt: &mut Ptable, node: usize) {
    pt.stride.size += 1;
    let i = pt.stride.size;
    pt.stride.heap[i] = node;
    sift_up(pt, i);
}

pub fn popheap(pt: &mut Ptable) -> Option<usize> {
    if pt.stride.size == 0 {
        return None;
    }
    let root = pt.stride.heap[1];
    pt.stride.heap[1] = pt.stride.heap[pt.stride.size];
    pt.stride.size -= 1;
    if pt.stride.size > 0 {
        sift_down(pt, 1);
    }
    Some(root)
}

/// What the scheduler's per-tick accounting (spec.md §4.3, item 2) needs to
/// know about the process that just ran.
pub enum Ran {
    Mlfq,
    Idle,
    Stride(usize),
}

/// Per-tick Stride accounting, run every scheduler iteration regardless of
/// which side ran.
pub fn stridelogic(pt: &mut Ptable, ran: &Ran) {
    let minpass = match ran {
        Ran::Stride(node) => pt.procs[*node].pass,
        Ran::Mlfq | Ran::Idle => pt.mlfq.pass,
    };

    if minpass > BARRIER {
        pt.mlfq.pass -= minpass.min(pt.mlfq.pass);
        for i in 1..=pt.stride.size {
            let n = pt.stride.heap[i];
            pt.procs[n].pass -= minpass.min(pt.procs[n].pass);
        }
        let mut cur = list::next(&pt.links, SENT_RUN);
        while cur != SENT_RUN {
            pt.procs[cur].pass -= minpass.min(pt.procs[cur].pass);
            cur = list::next(&pt.links, cur);
        }
        log::debug!("stride pass overflow rebase by {}", minpass);
    }

    match ran {
        Ran::Mlfq | Ran::Idle => {
            pt.mlfq.pass += strd(pt.mlfq.tickets);
        }
        Ran::Stride(node) => {
            let node = *node;
            // Already off SENT_RUN: yield_now/sleep_enter/exit remove it before
            // this runs. Only pushheap if it's still around to be scheduled.
            pt.procs[node].pass += strd(pt.procs[node].tickets);
            if matches!(pt.procs[node].state, Procstate::Runnable | Procstate::Sleeping) {
                pushheap(pt, node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc::Proctype;

    fn stride_proc(pt: &mut Ptable, slot: usize, tickets: i32, pass: u64) {
        pt.procs[slot].ptype = Proctype::Stride;
        pt.procs[slot].tickets = tickets;
        pt.procs[slot].pass = pass;
        pt.procs[slot].state = Procstate::Runnable;
    }

    #[test]
    fn heap_pops_smallest_pass_first() {
        let mut pt = Ptable::new();
        stride_proc(&mut pt, 0, 10, 300);
        stride_proc(&mut pt, 1, 10, 100);
        stride_proc(&mut pt, 2, 10, 200);
        pushheap(&mut pt, 0);
        pushheap(&mut pt, 1);
        pushheap(&mut pt, 2);

        assert_eq!(popheap(&mut pt), Some(1));
        assert_eq!(popheap(&mut pt), Some(2));
        assert_eq!(popheap(&mut pt), Some(0));
        assert_eq!(popheap(&mut pt), None);
    }

    #[test]
    fn empty_heap_reports_infinite_minpass() {
        let pt = Ptable::new();
        assert_eq!(getminpass(&pt), u64::MAX);
    }

    #[test]
    fn stride_tick_advances_pass_and_requeues_runnable() {
        let mut pt = Ptable::new();
        stride_proc(&mut pt, 0, 20, 0);
        list::add_tail(&mut pt.links, SENT_RUN, 0);
        stridelogic(&mut pt, &Ran::Stride(0));
        assert_eq!(pt.procs[0].pass, strd(20));
        assert_eq!(getminpass(&pt), strd(20));
    }

    #[test]
    fn exited_stride_process_is_not_requeued() {
        let mut pt = Ptable::new();
        stride_proc(&mut pt, 0, 20, 0);
        pt.procs[0].state = Procstate::Zombie;
        list::add_tail(&mut pt.links, SENT_RUN, 0);
        stridelogic(&mut pt, &Ran::Stride(0));
        assert_eq!(pt.stride.size, 0);
    }

    #[test]
    fn idle_tick_advances_mlfq_pass() {
        let mut pt = Ptable::new();
        let before = pt.mlfq.pass;
        stridelogic(&mut pt, &Ran::Idle);
        assert_eq!(pt.mlfq.pass, before + strd(pt.mlfq.tickets));
    }
}
