// Compile-time tunables. xv6 keeps all of these in param.h; we keep the
// same convention instead of a runtime config file since there is no
// filesystem left to load one from at the point the scheduler needs them.

pub const NPROC: usize = 64;
pub const NCPU: usize = 8;
pub const NOFILE: usize = 16;
pub const KSTACKSIZE: usize = 4096;

/// Number of MLFQ priority levels. Level 0 is highest priority.
pub const QSIZE: usize = 3;

/// Time quantum, in ticks, for each MLFQ level. A RUNNABLE process is moved
/// to the back of its level's queue (and, for level 0, the pin advances)
/// once it has run this many ticks since it last rotated.
pub const TQ: [u64; QSIZE] = [5, 10, 20];

/// Time allotment, in ticks, for each MLFQ level. A process demotes to the
/// next level once its accumulated ticks at the current level reach this
/// value.
pub const TA: [u64; QSIZE] = [20, 40, 60];

/// Ticks between MLFQ priority boosts. Every BOOSTINTERVAL ticks, all
/// queued (and queued-on-wake) processes reset to level 0 with ticks = 0.
pub const BOOSTINTERVAL: u64 = 100;

/// Minimum ticket headroom the pool must retain so an MLFQ process can
/// always be admitted to stride scheduling later. set_cpu_share rejects a
/// request that would drop the unclaimed pool below this.
pub const RESERVE: i32 = 20;

/// Scale factor for pass-value arithmetic: STRD(tickets) = LARGE / tickets.
pub const LARGE: u64 = 1 << 20;

/// Pass-overflow threshold. When getminpass() exceeds BARRIER, every
/// runnable/sleeping stride process's pass (and mlfq.pass) is rebased down
/// by the current minimum pass to keep the values from overflowing u64.
pub const BARRIER: u64 = 1 << 62;

pub const MAXINT: i32 = i32::MAX;

pub const MAXPROCNAME: usize = 16;
