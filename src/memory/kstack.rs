//! Bounded kernel-stack pool: `NPROC` fixed-size regions handed out by index.
//! Stands in for a real physical-frame allocator — the allocation unit this
//! core actually needs is "one more kernel stack", not general-purpose
//! paging, so that's the entire contract modeled here.

use crate::param::{KSTACK_SIZE, NPROC};
use crate::sync::spinlock::Spinlock;

struct Pool {
    used: [bool; NPROC],
}

static STACKS: Spinlock<Pool> = Spinlock::new(Pool {
    used: [false; NPROC],
});

// One region per process slot. `static mut` rather than inside the lock
// because the lock only needs to protect the allocation bitmap; once a slot
// is handed out, that process's kernel stack is exclusively its own.
static mut REGIONS: [[u8; KSTACK_SIZE]; NPROC] = [[0; KSTACK_SIZE]; NPROC];

/// Reserve one free kernel stack region, returning its pool index.
/// Returns `None` if every region is in use.
pub fn alloc() -> Option<usize> {
    let mut pool = STACKS.lock();
    for (i, used) in pool.used.iter_mut().enumerate() {
        if !*used {
            *used = true;
            return Some(i);
        }
    }
    None
}

/// Release a previously allocated region back to the pool.
pub fn free(idx: usize) {
    let mut pool = STACKS.lock();
    debug_assert!(pool.used[idx], "kstack::free: region {idx} was not allocated");
    pool.used[idx] = false;
}

/// Top-of-stack address for a given pool index, used to seed a fresh
/// `Context`. 16-byte aligned per the System V ABI.
pub fn top_of(idx: usize) -> u64 {
    let base = unsafe { (&raw const REGIONS[idx]) as u64 };
    (base + KSTACK_SIZE as u64) & !0xF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_exhausts_and_frees() {
        let mut taken = std::vec::Vec::new();
        while let Some(idx) = alloc() {
            taken.push(idx);
        }
        assert_eq!(taken.len(), NPROC);
        assert!(alloc().is_none());

        free(taken.pop().unwrap());
        assert!(alloc().is_some());
    }
}
