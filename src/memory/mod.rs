//! The scheduler's only dependency on memory management: a kernel-stack pool
//! (`kstack`) and an opaque address-space handle. Real page-table
//! construction, frame allocation, and copy-on-write are an external
//! collaborator's concern (see spec PURPOSE & SCOPE) — this module models
//! only the narrow `new`/`try_clone`/`activate` contract the scheduler
//! actually calls.

pub mod kstack;

use crate::proc::error::ProcError;
use core::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle standing in for a process's page-table root. In a build
/// with real paging this would wrap a physical frame holding the top-level
/// page directory; here it is a placeholder counter so `try_clone` has a
/// distinct value to hand out and `activate` has something to "load".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSpace(u64);

static NEXT_SPACE_ID: AtomicU64 = AtomicU64::new(1);

impl AddressSpace {
    /// Allocate a fresh, empty address space (used by `allocate()`).
    pub fn new() -> Self {
        AddressSpace(NEXT_SPACE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Placeholder value for a process-table slot that has not yet had a
    /// real address space assigned (`Proc::empty()`'s const initializer —
    /// `new()` isn't `const` since it advances the global id counter).
    pub(crate) const fn unallocated() -> Self {
        AddressSpace(0)
    }

    /// Clone this address space for a forked child. Trivial in this build
    /// since there is no real paging layer to copy, but the fallible
    /// signature preserves `fork`'s failure contract: a real implementation
    /// allocating physical frames for the copy can run out of memory here.
    pub fn try_clone(&self) -> Result<Self, ProcError> {
        Ok(AddressSpace::new())
    }

    /// Switch the active translation root to this address space. A
    /// documented no-op placeholder where a real build would write `CR3`.
    pub fn activate(&self) {}
}

impl Default for AddressSpace {
    fn default() -> Self {
        AddressSpace::new()
    }
}

pub fn init() {
    crate::log_info!("memory: kernel-stack pool ready ({} regions)", crate::param::NPROC);
}
