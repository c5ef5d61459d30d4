#![cfg_attr(not(any(test, feature = "kernel_as_a_lib")), no_std)]
#![cfg_attr(not(any(test, feature = "kernel_as_a_lib")), no_main)]
#![feature(panic_info_message)]

mod asm;
mod collab;
mod console;
mod kalloc;
mod klog;
mod memlayout;
mod param;
mod plic;
mod printf;
mod proc;
mod riscv;
mod spinlock;
mod string;
mod trap;
mod uart;

#[cfg(target_arch = "riscv64")]
mod start;

use core::sync::atomic::{AtomicBool, Ordering};

use crate::kalloc::KMem;
use crate::proc::cpuid;
use crate::riscv::__sync_synchronize;

#[cfg(not(any(test, feature = "kernel_as_a_lib")))]
#[no_mangle]
extern "C" fn eh_personality() {}

#[cfg(not(any(test, feature = "kernel_as_a_lib")))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    printf!("Aborting: \n");
    if let Some(p) = info.location() {
        printf!(
            "line {}, file {}: {}\n",
            p.line(),
            p.file(),
            info.message().unwrap()
        );
    } else {
        printf!("no information available.\n");
    }
    abort();
}

#[cfg(not(any(test, feature = "kernel_as_a_lib")))]
#[no_mangle]
extern "C" fn abort() -> ! {
    loop {
        unsafe { core::arch::asm!("wfi") }
    }
}

static STARTED: AtomicBool = AtomicBool::new(false);

/// Boot entry reached (via `start.rs`'s `mret`) once per hart. Brings up the
/// process table, logging, trap vectors and PLIC, starts the first user
/// process on the boot hart, then hands every hart to the scheduler loop.
///
/// Virtual memory, the file system, and the virtio disk are out of scope
/// (spec.md §1) and so are not brought up here; a real boot sequence would
/// initialize them between `KMem::kinit` and `proc::userinit`.
#[no_mangle]
pub extern "C" fn kmain() {
    if cpuid() == 0 {
        console::Console::init();
        klog::init();
        printf!("\nkernel is booting...\n\n");

        KMem::kinit(); // physical page allocator
        debug_log!("Kernel memory initialized.\n");

        proc::procinit(); // process table
        debug_log!("Processes initialized\n");

        trap::trapinit(); // trap vectors
        trap::trapinithart(); // install kernel trap vector
        debug_log!("Trap initialized\n");

        plic::plicinit(); // set up interrupt controller
        plic::plicinithart(); // ask PLIC for device interrupts
        debug_log!("Plic initialized\n");

        proc::userinit(); // first user process
        debug_log!("First user process initialized\n");

        __sync_synchronize();
        STARTED.store(true, Ordering::Relaxed);
        printf!("\nSystem boot successful\n")
    } else {
        while !STARTED.load(Ordering::Relaxed) {}

        __sync_synchronize();
        printf!("hart {} starting\n", cpuid());
        trap::trapinithart(); // install kernel trap vector
        plic::plicinithart(); // ask PLIC for device interrupts
    }

    proc::scheduler();
}
