//! `set_cpu_share`: migrate the caller from MLFQ to Stride, or resize an
//! existing Stride caller's ticket share. spec.md §4.3 "Migration MLFQ ->
//! Stride" and §6 (`set_cpu_share(share:int) -> 0 | -1`).

use crate::param::RESERVE;
use crate::proc::mlfq;
use crate::proc::stride;
use crate::proc::table::{Ptable, SENT_RUN};
use crate::proc::{list, Procstate, Proctype, SchedError};

/// Admit `caller` to proportional-share scheduling with `share` percent of
/// the ticket pool, or resize its existing share if it is already STRIDE.
///
/// Per `proc.c:54-78` (ported in full, see SPEC_FULL.md's SUPPLEMENTED
/// FEATURES section): the admission check adds the caller's *current*
/// stride tickets back into the pool before checking against the requested
/// share, so a STRIDE process may legally call this again to resize itself,
/// not just an MLFQ process migrating for the first time.
pub fn set_cpu_share(pt: &mut Ptable, caller: usize, share: i32) -> Result<(), SchedError> {
    if share < 1 || share > 100 - RESERVE {
        return Err(SchedError::InvalidShare);
    }

    let mut remain = pt.mlfq.tickets;
    if pt.procs[caller].ptype == Proctype::Stride {
        remain += pt.procs[caller].tickets;
    }

    if remain - share < RESERVE {
        log::info!(
            "set_cpu_share: pid {} requested {}%, rejected (remain {}, reserve {})",
            pt.procs[caller].pid,
            share,
            remain,
            RESERVE
        );
        return Err(SchedError::InsufficientTickets);
    }

    if pt.procs[caller].ptype == Proctype::Mlfq {
        mlfq::dequeue(pt, caller);
        let minpass = stride::getminpass(pt);
        let mlfqpass = pt.mlfq.pass;
        pt.procs[caller].pass = minpass.min(mlfqpass);
        pt.procs[caller].ptype = Proctype::Stride;
        // The caller is presently RUNNING (it is the one making this call);
        // place it on the stride run list, matching proc.c's
        // `list_add(&p->queue, &ptable.stride.run)`.
        debug_assert_eq!(pt.procs[caller].state, Procstate::Running);
        list::add_tail(&mut pt.links, SENT_RUN, caller);
    }

    pt.mlfq.tickets = remain - share;
    pt.procs[caller].tickets = share;
    log::info!(
        "set_cpu_share: pid {} admitted at {}%, mlfq.tickets now {}",
        pt.procs[caller].pid,
        share,
        pt.mlfq.tickets
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proc::table::Ptable;
    use crate::proc::Procstate;

    fn running_mlfq(pt: &mut Ptable, slot: usize) {
        pt.procs[slot].ptype = Proctype::Mlfq;
        pt.procs[slot].state = Procstate::Running;
    }

    #[test]
    fn admits_mlfq_caller_and_debits_pool() {
        let mut pt = Ptable::new();
        running_mlfq(&mut pt, 0);

        assert_eq!(set_cpu_share(&mut pt, 0, 30), Ok(()));
        assert_eq!(pt.mlfq.tickets, 70);
        assert_eq!(pt.procs[0].tickets, 30);
        assert_eq!(pt.procs[0].ptype, Proctype::Stride);
    }

    #[test]
    fn rejects_share_that_would_starve_mlfq_below_reserve() {
        let mut pt = Ptable::new();
        running_mlfq(&mut pt, 0);
        assert_eq!(set_cpu_share(&mut pt, 0, 30), Ok(()));

        running_mlfq(&mut pt, 1);
        assert_eq!(
            set_cpu_share(&mut pt, 1, 60),
            Err(SchedError::InsufficientTickets)
        );
        assert_eq!(pt.mlfq.tickets, 70);
        assert_eq!(pt.procs[1].ptype, Proctype::Mlfq);
    }

    #[test]
    fn rejects_out_of_range_share() {
        let mut pt = Ptable::new();
        running_mlfq(&mut pt, 0);
        assert_eq!(set_cpu_share(&mut pt, 0, 0), Err(SchedError::InvalidShare));
        assert_eq!(
            set_cpu_share(&mut pt, 0, 81),
            Err(SchedError::InvalidShare)
        );
    }

    #[test]
    fn resizes_an_existing_stride_callers_share() {
        let mut pt = Ptable::new();
        running_mlfq(&mut pt, 0);
        set_cpu_share(&mut pt, 0, 20).unwrap();
        assert_eq!(pt.mlfq.tickets, 80);

        // Caller is already STRIDE; resize from 20% to 50%.
        pt.procs[0].state = Procstate::Running;
        assert_eq!(set_cpu_share(&mut pt, 0, 50), Ok(()));
        assert_eq!(pt.procs[0].tickets, 50);
        assert_eq!(pt.mlfq.tickets, 50);
    }
}
