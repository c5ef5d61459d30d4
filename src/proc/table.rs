//! The single global scheduler state, guarded by one coarse spinlock —
//! xv6-public's `ptable` and `ptable.lock` in one owned structure. Every
//! scheduling operation takes `&mut Ptable`; the lock itself is a separate
//! static so that tests can build and drive a `Ptable` directly without
//! ever touching it (see spec.md §9, "model the entire ptable as a single
//! owned structure ... all scheduler operations take a locked reference").

use crate::param::{NPROC, QSIZE};
use crate::proc::list::{self, ListLink};
use crate::proc::mlfq::Mlfq;
use crate::proc::stride::Stride;
use crate::proc::{Proc, Procstate};
use crate::spinlock::Spinlock;

/// One sentinel per MLFQ level, plus one each for the Stride run list, the
/// sleep list, and the free list.
pub const NUM_SENTINELS: usize = QSIZE + 3;
pub const LINKS_LEN: usize = NPROC + NUM_SENTINELS;

pub const fn sent_mlfq(level: usize) -> usize {
    NPROC + level
}
pub const SENT_RUN: usize = NPROC + QSIZE;
pub const SENT_SLEEP: usize = NPROC + QSIZE + 1;
pub const SENT_FREE: usize = NPROC + QSIZE + 2;

pub struct Ptable {
    pub procs: [Proc; NPROC],
    pub links: [ListLink; LINKS_LEN],
    pub mlfq: Mlfq,
    pub stride: Stride,
    pub initproc: Option<usize>,
    next_pid: u32,
}

impl Ptable {
    /// A disconnected, not-yet-initialized table. Only used to give the
    /// `static mut PTABLE` a `const` initializer; call `init()` (or use
    /// `new()`) before scheduling anything.
    pub const fn empty() -> Self {
        Ptable {
            procs: [Proc::default(); NPROC],
            links: [ListLink::unlinked(); LINKS_LEN],
            mlfq: Mlfq::empty(),
            stride: Stride::empty(),
            initproc: None,
            next_pid: 1,
        }
    }

    /// Wire up every sentinel and the free list. Called once from
    /// `proc::procinit` for the real kernel table, and by `new()` for
    /// tests.
    pub fn init(&mut self) {
        for l in 0..QSIZE {
            list::init_head(&mut self.links, sent_mlfq(l));
            self.mlfq.pin[l] = sent_mlfq(l);
        }
        list::init_head(&mut self.links, SENT_RUN);
        list::init_head(&mut self.links, SENT_SLEEP);
        list::init_head(&mut self.links, SENT_FREE);
        for i in 0..NPROC {
            list::add_tail(&mut self.links, SENT_FREE, i);
        }
        self.mlfq.tickets = 100;
        self.mlfq.ticks = 0;
        self.mlfq.pass = 0;
        self.stride.size = 0;
        self.next_pid = 1;
    }

    /// A freshly initialized table, for tests and for any caller that does
    /// not need the `const fn empty()` / `init()` split.
    pub fn new() -> Self {
        let mut pt = Self::empty();
        pt.init();
        pt
    }

    pub fn alloc_pid(&mut self) -> u32 {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }

    /// Take one slot off the free list, or `None` if the table is full.
    pub fn alloc_slot(&mut self) -> Option<usize> {
        let slot = list::first(&self.links, SENT_FREE)?;
        list::del(&mut self.links, slot);
        Some(slot)
    }

    /// Return a slot to the free list. Caller must have already reset the
    /// proc's fields and set its state to Unused.
    pub fn free_slot(&mut self, slot: usize) {
        debug_assert_eq!(self.procs[slot].state, Procstate::Unused);
        list::add_tail(&mut self.links, SENT_FREE, slot);
    }
}

unsafe impl Sync for Ptable {}

pub static mut PTABLE: Ptable = Ptable::empty();
pub static mut PTABLE_LOCK: Spinlock = Spinlock::init_lock("ptable");
