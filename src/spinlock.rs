//! A spinlock with interrupt-disable discipline, in the style of xv6's
//! `spinlock.c`: acquiring a lock disables interrupts on the current hart
//! first (so an interrupt handler can never deadlock against itself by
//! trying to reacquire a lock its own kernel thread holds), and nested
//! acquires are tracked per-CPU so interrupts are only re-enabled once the
//! outermost lock is released.

use crate::proc::Cpu;
use crate::riscv::{__sync_lock_release, __sync_lock_test_and_set, __sync_synchronize, intr_get, intr_off, intr_on};

pub struct Spinlock {
    locked: u64,
    name: &'static str,
    cpu: Option<*mut Cpu>,
}

unsafe impl Sync for Spinlock {}

impl Spinlock {
    pub const fn init_lock(name: &'static str) -> Spinlock {
        Spinlock {
            locked: 0,
            name,
            cpu: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Acquire the lock. Disables interrupts on this hart for the duration
    /// (via push_off) to avoid a deadlock against an interrupt handler that
    /// would try to reacquire the same lock on this hart.
    pub fn acquire(&mut self) {
        push_off();
        if self.holding() {
            panic!("acquire: already holding {}", self.name);
        }
        while __sync_lock_test_and_set(&mut self.locked as *mut u64, 1) != 0 {}
        __sync_synchronize();
        self.cpu = Some(crate::proc::mycpu());
    }

    pub fn release(&mut self) {
        if !self.holding() {
            panic!("release: not holding {}", self.name);
        }
        self.cpu = None;
        __sync_synchronize();
        __sync_lock_release(&self.locked as *const u64);
        pop_off();
    }

    /// Whether this CPU is holding the lock. Must be called with
    /// interrupts disabled, same as the C original.
    pub fn holding(&self) -> bool {
        self.locked != 0 && self.cpu == Some(crate::proc::mycpu())
    }
}

/// push_off/pop_off are like intr_off()/intr_on() except they are matched:
/// it takes two pop_off()s to undo two push_off()s. Also, if interrupts are
/// off, doing a push_off and a pop_off should leave them off.
pub fn push_off() {
    let old = intr_get();
    intr_off();
    let c = unsafe { &mut *crate::proc::mycpu() };
    if c.noff == 0 {
        c.intena = old;
    }
    c.noff += 1;
}

pub fn pop_off() {
    if intr_get() {
        panic!("pop_off: interruptible");
    }
    let c = unsafe { &mut *crate::proc::mycpu() };
    if c.noff < 1 {
        panic!("pop_off: not held");
    }
    c.noff -= 1;
    let should_enable = c.noff == 0 && c.intena;
    if should_enable {
        intr_on();
    }
}
