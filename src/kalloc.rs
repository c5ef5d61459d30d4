use core::ptr;

use crate::riscv::PGSIZE;
use crate::spinlock::Spinlock;
use crate::string::memset;
use crate::PGROUNDUP;

/// The range of physical memory this allocator hands out pages from.
/// On real hardware that's everything from the end of the kernel image
/// (the linker-provided `end` symbol) up to `PHYSTOP`. `cargo test` builds
/// this crate as an ordinary host binary with no kernel image or physical
/// memory map, so the host fallback carves the same shape out of a static
/// array instead — same free-list allocator, different backing store,
/// mirroring the host/hardware split already in `crate::riscv`.
#[cfg(target_arch = "riscv64")]
mod region {
    use crate::memlayout::PHYSTOP;

    extern "C" {
        // first address after kernel. defined by kernel.ld.
        static mut end: u8;
    }

    pub fn bounds() -> (usize, usize) {
        unsafe { ((&end) as *const u8 as usize, PHYSTOP) }
    }
}

#[cfg(not(target_arch = "riscv64"))]
mod region {
    use crate::riscv::PGSIZE;

    const HOST_ARENA_PAGES: usize = 64;
    static mut HOST_ARENA: [u8; HOST_ARENA_PAGES * PGSIZE] = [0; HOST_ARENA_PAGES * PGSIZE];

    pub fn bounds() -> (usize, usize) {
        unsafe {
            let start = HOST_ARENA.as_mut_ptr() as usize;
            (start, start + HOST_ARENA.len())
        }
    }
}

struct Run {
    next: *mut Run,
}

pub struct KMem {
    lock: Spinlock,
    freelist: *mut Run,
    inited: bool,
}

pub static mut KMEM: KMem = KMem::create();

impl KMem {
    const fn create() -> Self {
        Self {
            lock: Spinlock::init_lock("kmem"),
            freelist: ptr::null_mut(),
            inited: false,
        }
    }
    pub fn kinit() {
        unsafe {
            KMEM.init_once();
        }
    }

    /// Populate the free list from `region::bounds()` on first use. `kmain`
    /// calls `kinit()` explicitly before anything else runs; host unit tests
    /// have no such boot sequence and call straight into `allocproc`, so
    /// `kalloc` lazily self-inits the same free list the first time it's
    /// asked for a page.
    fn init_once(self: &mut Self) {
        if self.inited {
            return;
        }
        self.inited = true;
        let (start, end) = region::bounds();
        self.freerange(start as *mut u8, end as *mut u8);
    }

    fn freerange<T: Sized>(self: &mut Self, pa_start: *mut T, pa_end: *mut T) {
        let mut p = PGROUNDUP!(pa_start);
        while p + PGSIZE <= pa_end as usize {
            self.kfree(p as *mut T);
            p += PGSIZE;
        }
    }

    /// Free the page of physical memory pointed at by pa,
    /// which normally should have been returned by a
    /// call to kalloc().  (The exception is when
    /// initializing the allocator; see kinit above.)
    pub fn kfree<T: Sized>(self: &mut Self, pa: *mut T) {
        let (lo, hi) = region::bounds();
        let pa_usize = pa as usize;
        if pa_usize % PGSIZE != 0 || pa_usize < lo || pa_usize >= hi {
            panic!("kfree");
        }

        // Fill with junk to catch dangling refs.
        memset(pa as *mut u8, 1, PGSIZE);

        let r = pa as *mut Run;

        self.lock.acquire();
        unsafe {
            (*r).next = self.freelist;
        }
        self.freelist = r;
        self.lock.release();
    }

    /// Allocate one 4096-byte page of physical memory.
    /// Returns a pointer that the kernel can use.
    /// Returns 0 if the memory cannot be allocated.
    pub fn kalloc<T: Sized>(self: &mut Self) -> *mut T {
        self.init_once();
        self.lock.acquire();
        let r = self.freelist;
        if !r.is_null() {
            unsafe {
                self.freelist = (*r).next;
            }
        }
        self.lock.release();

        if !r.is_null() {
            memset(r as *mut u8, 5, PGSIZE); // fill with junk
        }
        r as *mut T
    }
}
