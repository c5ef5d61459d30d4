//! Named interfaces for the collaborators spec.md §1/§6 explicitly place out
//! of scope: process-creation mechanics beyond the scheduler's view (virtual
//! memory setup, copy-on-fork of a page table, file descriptor/inode
//! plumbing). The scheduler core calls these exactly where xv6-public's
//! `proc.c` calls `copyuvm`/`filedup`/`idup`/`namei`/`begin_op`/`end_op`, but
//! their bodies are stand-ins: a real checkout of this kernel would replace
//! them with the VM and file-system subsystems, which this repository does
//! not implement (see DESIGN.md).
//!
//! `kalloc`/`kfree`, the one collaborator spec.md §6 names that this
//! repository *does* implement for real, live in `crate::kalloc` instead —
//! they are genuinely needed to hand a fresh process a kernel stack.

/// Opaque handle standing in for a process's page table. The real kernel's
/// `pagetable_t` is a physical page full of PTEs; nothing in the scheduler
/// core inspects its contents, so a bare token is enough to thread through
/// `fork`'s copy-on-write path.
pub type Pagetable = usize;

/// `copyuvm`: duplicate the parent's address space for a forking child.
/// Out of scope per spec.md §1; stubbed to always succeed since this
/// repository has no virtual-memory subsystem to fail against. A real
/// implementation can fail (out of physical memory), which is why the
/// signature returns `Result` and `fork` propagates the error as
/// `SchedError::ForkCopyFailed`.
pub fn copyuvm(_parent: Pagetable, _sz: usize) -> Result<Pagetable, ()> {
    Ok(0)
}

/// `freevm`: release a process's page table and everything it maps. Called
/// from `freeproc` once a zombie has been reaped.
pub fn freevm(_pt: Pagetable) {}

/// `setupkvm`/`inituvm`: build the first user process's address space.
/// Called once from `userinit`.
pub fn setupkvm() -> Pagetable {
    0
}

pub fn inituvm(_pt: Pagetable, _sz: usize) {}

/// `allocuvm`/`deallocuvm`: grow or shrink a process's address space, the
/// collaborator behind `sbrk`. Not exercised by the scheduler core itself.
pub fn allocuvm(_pt: Pagetable, old_sz: usize, new_sz: usize) -> Result<usize, ()> {
    Ok(new_sz.max(old_sz))
}

pub fn deallocuvm(_pt: Pagetable, old_sz: usize, new_sz: usize) -> Result<usize, ()> {
    Ok(new_sz.min(old_sz))
}

/// `switchuvm`/`switchkvm`: point the hart's `satp` at a process's page
/// table (or back at the kernel's). Called around the context switch;
/// out of scope here since there is no MMU setup to switch between.
pub fn switchuvm(_pt: Pagetable) {}
pub fn switchkvm() {}

/// Opaque handle standing in for an open file or inode. As with
/// `Pagetable`, the scheduler core never looks inside it.
pub type FileHandle = usize;

/// `filedup`/`fileclose`: bump or drop an open file's reference count.
/// `fork` dups every fd the parent has open; `exit` closes them all.
pub fn filedup(f: FileHandle) -> FileHandle {
    f
}

pub fn fileclose(_f: FileHandle) {}

/// `idup`/`iput`: the inode-table equivalents, for a process's cwd.
pub fn idup(ip: FileHandle) -> FileHandle {
    ip
}

pub fn iput(_ip: FileHandle) {}

/// `namei`: path lookup, used once by `userinit` to resolve "/" as the first
/// process's cwd.
pub fn namei(_path: &str) -> FileHandle {
    0
}

/// `begin_op`/`end_op`: bracket a file-system transaction. `exit` wraps its
/// `iput(cwd)` in one, matching `proc.c`.
pub fn begin_op() {}
pub fn end_op() {}
