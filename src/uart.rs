//! 16550 UART, output side only. Console input (`consoleintr`, the line
//! buffer, `^U`/backspace editing) is out of scope per spec.md §1 — this
//! kernel has no user-space `read()` to feed, only the `printf!`/log byte
//! stream `Console` forwards here. Mirrors the host/hardware split already
//! used in `crate::riscv`/`crate::kalloc`: on real hardware bytes go out the
//! memory-mapped 16550 at `UART0`; under `cargo test` there is no such
//! device, so the host fallback is a no-op.

#[cfg(target_arch = "riscv64")]
mod hw {
    use crate::memlayout::UART0;

    const THR: usize = 0; // transmit holding register
    const LCR: usize = 3; // line control register
    const LCR_EIGHT_BITS: u8 = 3 << 0;
    const LCR_BAUD_LATCH: u8 = 1 << 7;
    const FCR: usize = 2;
    const FCR_FIFO_ENABLE: u8 = 1 << 0;
    const FCR_FIFO_CLEAR: u8 = 3 << 1;
    const IER: usize = 1;
    const LSR: usize = 5;
    const LSR_TX_IDLE: u8 = 1 << 5;

    unsafe fn reg(offset: usize) -> *mut u8 {
        (UART0 + offset) as *mut u8
    }

    pub fn init() {
        unsafe {
            reg(IER).write_volatile(0x00);
            reg(LCR).write_volatile(LCR_BAUD_LATCH);
            reg(0).write_volatile(0x03); // 38.4K baud, LSB
            reg(1).write_volatile(0x00); // 38.4K baud, MSB
            reg(LCR).write_volatile(LCR_EIGHT_BITS);
            reg(FCR).write_volatile(FCR_FIFO_ENABLE | FCR_FIFO_CLEAR);
            reg(IER).write_volatile(0x00);
        }
    }

    /// Busy-wait for the transmit holding register to go idle, then send one
    /// byte. Used by `printf!`, so it cannot itself go through `printf!`.
    pub fn putc_sync(c: u8) {
        crate::spinlock::push_off();
        unsafe {
            while reg(LSR).read_volatile() & LSR_TX_IDLE == 0 {}
            reg(THR).write_volatile(c);
        }
        crate::spinlock::pop_off();
    }
}

#[cfg(not(target_arch = "riscv64"))]
mod hw {
    pub fn init() {}
    pub fn putc_sync(_c: u8) {}
}

pub fn init() {
    hw::init();
}

pub fn putc_sync(c: u8) {
    hw::putc_sync(c);
}
