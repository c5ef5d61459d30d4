//! Multi-level feedback queue: QSIZE per-level FIFOs, a round-robin "pin"
//! cursor per level, quantum/allotment accounting, and the periodic
//! priority boost. See spec.md §4.2.

use crate::param::{BOOSTINTERVAL, NPROC, QSIZE, TA, TQ};
use crate::proc::list;
use crate::proc::table::{sent_mlfq, Ptable};
use crate::proc::{Procstate, Proctype};

pub struct Mlfq {
    /// pin[l] is either sent_mlfq(l) itself (queue considered to start from
    /// its first real entry) or a node currently in queue l.
    pub pin: [usize; QSIZE],
    pub ticks: u64,
    pub pass: u64,
    pub tickets: i32,
}

impl Mlfq {
    pub const fn empty() -> Self {
        Mlfq {
            pin: [0; QSIZE],
            ticks: 0,
            pass: 0,
            tickets: 100,
        }
    }
}

/// Append `node` to the tail of level `level`'s queue.
pub fn enqueue(pt: &mut Ptable, node: usize, level: usize) {
    pt.procs[node].privlevel = level;
    list::add_tail(&mut pt.links, sent_mlfq(level), node);
}

/// Remove `node` from whichever level it is currently queued at. If the
/// pin pointed at `node`, it advances to `node`'s successor first, so the
/// round-robin cursor survives removal of the node it was parked on.
pub fn dequeue(pt: &mut Ptable, node: usize) {
    let level = pt.procs[node].privlevel;
    let head = sent_mlfq(level);
    if pt.mlfq.pin[level] == node {
        pt.mlfq.pin[level] = list::next(&pt.links, node);
    }
    list::del(&mut pt.links, node);
}

/// Scan levels 0 upward; at each non-empty level walk once around the
/// circle starting at the pin looking for a RUNNABLE process. First match
/// wins and becomes the new pin for that level.
pub fn select(pt: &mut Ptable) -> Option<usize> {
    for level in 0..QSIZE {
        let head = sent_mlfq(level);
        if list::is_empty(&pt.links, head) {
            continue;
        }
        let start = if pt.mlfq.pin[level] == head {
            list::first(&pt.links, head).unwrap()
        } else {
            pt.mlfq.pin[level]
        };
        let mut cur = start;
        let mut first_iter = true;
        loop {
            if cur == head {
                cur = list::first(&pt.links, head).unwrap();
            }
            if !first_iter && cur == start {
                break;
            }
            first_iter = false;
            if pt.procs[cur].state == Procstate::Runnable {
                pt.mlfq.pin[level] = cur;
                return Some(cur);
            }
            cur = list::next(&pt.links, cur);
        }
    }
    None
}

/// Per-tick bookkeeping for the process that just ran (or just blocked),
/// `spec.md` §4.2 `mlfqlogic`.
pub fn mlfqlogic(pt: &mut Ptable, node: usize) {
    pt.mlfq.ticks += 1;

    match pt.procs[node].state {
        Procstate::Runnable => {
            pt.procs[node].ticks += 1;
            let level = pt.procs[node].privlevel;
            if level < QSIZE - 1 && pt.procs[node].ticks % TA[level] == 0 {
                dequeue(pt, node);
                pt.procs[node].privlevel = level + 1;
                pt.procs[node].ticks = 0;
                enqueue(pt, node, level + 1);
                log::debug!(
                    "pid {} demoted to level {}",
                    pt.procs[node].pid,
                    pt.procs[node].privlevel
                );
            } else if pt.procs[node].ticks % TQ[level] == 0 {
                pt.mlfq.pin[level] = list::next(&pt.links, node);
            }
        }
        Procstate::Sleeping => {
            let level = pt.procs[node].privlevel;
            if level < QSIZE - 1 && pt.procs[node].ticks >= TA[level] {
                pt.procs[node].privlevel = level + 1;
                pt.procs[node].ticks = 0;
            } else {
                let tq = TQ[level];
                pt.procs[node].ticks = (pt.procs[node].ticks / tq) * tq;
            }
        }
        _ => {}
    }

    if pt.mlfq.ticks % BOOSTINTERVAL == 0 {
        boost(pt);
        log::debug!("priority boost at mlfq tick {}", pt.mlfq.ticks);
    }
}

/// Reset every MLFQ process to level 0 and splice levels 1.. onto level 0,
/// preserving FIFO order within each source level. `spec.md` §4.2
/// "concatqueue".
fn boost(pt: &mut Ptable) {
    let head0 = sent_mlfq(0);
    for level in 1..QSIZE {
        let headl = sent_mlfq(level);
        if list::is_empty(&pt.links, head0) && pt.mlfq.pin[level] != headl {
            pt.mlfq.pin[0] = pt.mlfq.pin[level];
        }
        list::bulk_move_tail(&mut pt.links, head0, headl);
        pt.mlfq.pin[level] = headl;
    }

    for i in 0..NPROC {
        if pt.procs[i].ptype == Proctype::Mlfq && pt.procs[i].state != Procstate::Unused {
            pt.procs[i].privlevel = 0;
            pt.procs[i].ticks = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc::table::Ptable;

    fn runnable(pt: &mut Ptable, slot: usize, level: usize) {
        pt.procs[slot].state = Procstate::Runnable;
        pt.procs[slot].ptype = Proctype::Mlfq;
        enqueue(pt, slot, level);
    }

    #[test]
    fn select_picks_lowest_nonempty_level_first() {
        let mut pt = Ptable::new();
        runnable(&mut pt, 0, 1);
        runnable(&mut pt, 1, 0);
        assert_eq!(select(&mut pt), Some(1));
    }

    #[test]
    fn select_round_robins_within_a_level() {
        let mut pt = Ptable::new();
        runnable(&mut pt, 0, 0);
        runnable(&mut pt, 1, 0);
        assert_eq!(select(&mut pt), Some(0));
        // pin now at slot 0; advance it like dequeue would on rotation
        pt.mlfq.pin[0] = list::next(&pt.links, 0);
        assert_eq!(select(&mut pt), Some(1));
    }

    #[test]
    fn demotes_at_allotment_boundary() {
        let mut pt = Ptable::new();
        runnable(&mut pt, 0, 0);
        for _ in 0..TA[0] - 1 {
            mlfqlogic(&mut pt, 0);
        }
        assert_eq!(pt.procs[0].privlevel, 0);
        mlfqlogic(&mut pt, 0);
        assert_eq!(pt.procs[0].privlevel, 1);
        assert_eq!(pt.procs[0].ticks, 0);
    }

    #[test]
    fn boost_resets_every_mlfq_process_to_level_zero() {
        let mut pt = Ptable::new();
        runnable(&mut pt, 0, 2);
        pt.procs[0].ticks = 7;
        for _ in 0..BOOSTINTERVAL {
            mlfqlogic(&mut pt, 0);
        }
        assert_eq!(pt.procs[0].privlevel, 0);
        assert_eq!(pt.procs[0].ticks, 0);
        assert!(!list::is_empty(&pt.links, sent_mlfq(0)));
    }

    #[test]
    fn sleeping_truncates_ticks_to_quantum_multiple() {
        let mut pt = Ptable::new();
        pt.procs[0].state = Procstate::Sleeping;
        pt.procs[0].ptype = Proctype::Mlfq;
        pt.procs[0].privlevel = 0;
        pt.procs[0].ticks = 3;
        mlfqlogic(&mut pt, 0);
        assert_eq!(pt.procs[0].ticks, (3 / TQ[0]) * TQ[0]);
    }
}
