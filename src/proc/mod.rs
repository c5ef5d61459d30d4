//! Process table and hybrid MLFQ/Stride scheduler.
//!
//! The scheduler owns one coarse-grained structure (`table::Ptable`)
//! guarded by one spinlock (`PTABLE_LOCK`), the same shape xv6-public uses
//! for its single `ptable.lock`. Every module here is a pure function of
//! `&mut Ptable` (plus, for the lifecycle operations, the scheduling
//! decisions spelled out in `spec.md`'s §4.4) so the whole scheduler core
//! can be built and torn down without touching any hardware state, which is
//! what lets `cargo test` exercise it directly.

pub mod api;
pub mod dump;
pub mod lifecycle;
pub mod list;
pub mod mlfq;
pub mod sched;
pub mod share;
pub mod stride;
pub mod table;

use crate::param::{MAXPROCNAME, NCPU};

pub use table::{Ptable, PTABLE, PTABLE_LOCK};

// The scheduler's public surface (spec.md §6): the lock-taking wrappers
// around the pure `Ptable` transforms above.
pub use api::{
    exit, fork, inctick, kill, procdump, scheduler, set_cpu_share, sleep, userinit, wait, wakeup,
    yield_cpu,
};

/// Saved callee-saved registers for a kernel context switch. The actual
/// save/restore sequence lives in switch.S (see `crate::asm`); this struct
/// just describes the slots `swtch(&old, &new)` reads and writes.
#[derive(Copy, Clone)]
#[repr(C)]
pub struct Context {
    ra: u64,
    sp: u64,
    s0: u64,
    s1: u64,
    s2: u64,
    s3: u64,
    s4: u64,
    s5: u64,
    s6: u64,
    s7: u64,
    s8: u64,
    s9: u64,
    s10: u64,
    s11: u64,
}

impl Context {
    pub const fn zeroed() -> Self {
        Context {
            ra: 0,
            sp: 0,
            s0: 0,
            s1: 0,
            s2: 0,
            s3: 0,
            s4: 0,
            s5: 0,
            s6: 0,
            s7: 0,
            s8: 0,
            s9: 0,
            s10: 0,
            s11: 0,
        }
    }
}

extern "C" {
    /// Save the current callee-saved registers into `old`, then load them
    /// from `new` and return into whatever called `swtch` for `new` last.
    /// Implemented in switch.S; out of scope for this core (spec.md §6).
    fn swtch(old: *mut Context, new: *const Context);
}

/// Called by `scheduler()` right before resuming `node`: save the CPU's own
/// (scheduler-loop) context and load `node`'s saved context.
pub(crate) unsafe fn swtch_to_proc(node: usize) {
    let c = mycpu();
    swtch(&mut (*c).context as *mut Context, &PTABLE.procs[node].context as *const Context);
}

/// Called by `sched()` when the currently running process gives up the CPU:
/// save its context and resume this CPU's scheduler-loop context.
pub(crate) unsafe fn swtch_to_scheduler(node: usize) {
    let c = mycpu();
    swtch(&mut PTABLE.procs[node].context as *mut Context, &(*c).context as *const Context);
}

/// Per-CPU state: which process (if any) is running here, this CPU's own
/// saved context for entering/leaving the scheduler loop, and the nested
/// push_off/pop_off interrupt-disable depth.
#[derive(Copy, Clone)]
pub struct Cpu {
    pub proc: Option<usize>,
    context: Context,
    pub noff: u8,
    pub intena: bool,
}

impl Cpu {
    pub const fn default() -> Self {
        Cpu {
            proc: None,
            context: Context::zeroed(),
            noff: 0,
            intena: false,
        }
    }
}

static mut CPUS: [Cpu; NCPU] = [Cpu::default(); NCPU];

/// Must be called with interrupts disabled, to prevent a race with the
/// process being moved to a different CPU.
pub fn cpuid() -> usize {
    crate::riscv::r_tp() as usize
}

/// Return this CPU's `Cpu` struct. Interrupts must be disabled.
pub fn mycpu() -> *mut Cpu {
    unsafe { &mut CPUS[cpuid()] as *mut Cpu }
}

/// Index into `Ptable::procs` of the process running on this CPU, if any.
pub fn myproc() -> Option<usize> {
    crate::spinlock::push_off();
    let p = unsafe { (*mycpu()).proc };
    crate::spinlock::pop_off();
    p
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Procstate {
    Unused,
    Embryo,
    Runnable,
    Running,
    Sleeping,
    Zombie,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Proctype {
    Mlfq,
    Stride,
}

/// One process table slot. Execution-context fields (`sz`, `kstack`, the
/// page table, the open-file table, the trap frame) are opaque to the
/// scheduler core per spec.md §1/§6 — they are named here because the
/// lifecycle operations (fork/exit/wait) touch them, but their contents are
/// owned by the out-of-scope VM/file-system collaborators in `collab.rs`.
#[derive(Copy, Clone)]
pub struct Proc {
    pub state: Procstate,
    pub ptype: Proctype,
    pub pid: u32,
    pub parent: Option<usize>,
    pub killed: bool,
    pub xstate: i32,
    /// Sleep channel. 0 means "not sleeping on anything".
    pub chan: usize,

    // MLFQ-only fields (meaningless for STRIDE, see spec.md invariant 5).
    pub privlevel: usize,
    pub ticks: u64,

    // STRIDE-only fields (meaningless for MLFQ).
    pub tickets: i32,
    pub pass: u64,

    pub name: [u8; MAXPROCNAME],

    // Opaque to the scheduler; owned by collaborators named in collab.rs.
    pub sz: usize,
    pub kstack: usize,
    context: Context,
}

impl Proc {
    pub const fn default() -> Self {
        Proc {
            state: Procstate::Unused,
            ptype: Proctype::Mlfq,
            pid: 0,
            parent: None,
            killed: false,
            xstate: 0,
            chan: 0,
            privlevel: 0,
            ticks: 0,
            tickets: 0,
            pass: 0,
            name: [0; MAXPROCNAME],
            sz: 0,
            kstack: 0,
            context: Context::zeroed(),
        }
    }
}

/// Recoverable scheduler failures, surfaced to syscall wrappers as `Err`
/// instead of the C original's bare `-1`. Kernel invariant violations
/// (spec.md §7, item 2) stay `panic!` — they are not representable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    NoFreeSlot,
    ForkCopyFailed,
    NoChildren,
    Killed,
    InvalidShare,
    InsufficientTickets,
    UnknownPid,
}

/// Install the table and spinlock once at boot (called from `kmain`).
pub fn procinit() {
    unsafe {
        PTABLE.init();
    }
    log::info!("scheduler: process table initialized ({} slots)", crate::param::NPROC);
}
