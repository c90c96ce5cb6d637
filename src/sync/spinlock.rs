//! The interrupt-disabling, nesting-counted spinlock the process table is
//! built on. Grounded on the `spin` crate's atomic-bool mutex (the teacher
//! already depends on `spin` for `SCHEDULER: Mutex<Scheduler>`), layered with
//! xv6's `push_off`/`pop_off` discipline: acquiring disables interrupts so a
//! preempting timer tick cannot deadlock against a lock this CPU already
//! holds, and interrupts are only re-enabled once the outermost guard drops.

use crate::cpu;
use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Sentinel `holder` value meaning "not held by anyone".
const NO_HOLDER: usize = usize::MAX;

pub struct Spinlock<T> {
    locked: AtomicBool,
    /// Id of the CPU currently holding the lock, `NO_HOLDER` when free.
    /// Set after the CAS wins, cleared before the CAS-visible release, so
    /// `holding()` can tell a genuine self-reentrant acquire (xv6's
    /// `holding()`) apart from a different CPU spinning on the same lock.
    holder: AtomicUsize,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Sync for Spinlock<T> {}

impl<T> Spinlock<T> {
    pub const fn new(data: T) -> Self {
        Spinlock {
            locked: AtomicBool::new(false),
            holder: AtomicUsize::new(NO_HOLDER),
            data: UnsafeCell::new(data),
        }
    }

    /// Acquire the lock, disabling interrupts for the CPU's critical section.
    pub fn lock(&self) -> SpinlockGuard<'_, T> {
        cpu::push_off();
        if self.holding() {
            panic!("Spinlock::lock: already held by this CPU");
        }
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        self.holder.store(cpu::id(), Ordering::Release);
        SpinlockGuard { lock: self }
    }

    /// Best-effort non-blocking acquire, used by callers (e.g. a wakeup
    /// broadcaster) that must not spin while holding another lock.
    pub fn try_lock(&self) -> Option<SpinlockGuard<'_, T>> {
        cpu::push_off();
        match self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
        {
            Ok(_) => {
                self.holder.store(cpu::id(), Ordering::Release);
                Some(SpinlockGuard { lock: self })
            }
            Err(_) => {
                cpu::pop_off();
                None
            }
        }
    }

    /// Whether this CPU already holds the lock, xv6's `holding()`: a true
    /// reentrant-acquire check, not just "is someone holding it".
    fn holding(&self) -> bool {
        self.locked.load(Ordering::Acquire) && self.holder.load(Ordering::Acquire) == cpu::id()
    }

    unsafe fn unlock(&self) {
        self.holder.store(NO_HOLDER, Ordering::Release);
        self.locked.store(false, Ordering::Release);
        cpu::pop_off();
    }
}

pub struct SpinlockGuard<'a, T> {
    lock: &'a Spinlock<T>,
}

impl<'a, T> Deref for SpinlockGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<'a, T> DerefMut for SpinlockGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<'a, T> Drop for SpinlockGuard<'a, T> {
    fn drop(&mut self) {
        unsafe { self.lock.unlock() }
    }
}

impl<'a, T> SpinlockGuard<'a, T> {
    /// Identity check used by `sleep` to decide whether it is already
    /// holding the table lock or needs to acquire-then-drop-other per 4.D.
    pub fn guards(&self, other: &Spinlock<T>) -> bool {
        core::ptr::eq(self.lock, other)
    }

    /// Reconstruct a guard for a lock this CPU already holds, without going
    /// through `lock()` again. Used on the far side of a context switch: the
    /// process being resumed never called `lock()` on this stack frame, but
    /// the table lock has been continuously held (by whichever call chain
    /// originally acquired it) across the switch, since `sched()` only
    /// `mem::forget`s the outgoing guard rather than dropping it.
    ///
    /// # Safety
    /// The caller must guarantee this CPU currently holds `lock`, with a
    /// `push_off()` nesting level that some other `SpinlockGuard` for this
    /// same lock will eventually balance via its own `Drop`.
    pub unsafe fn assume_held(lock: &'a Spinlock<T>) -> Self {
        SpinlockGuard { lock }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static COUNTER: Spinlock<u32> = Spinlock::new(0);

    #[test]
    fn lock_excludes_and_unlocks_on_drop() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        crate::cpu::enable_interrupts();
        {
            let mut v = COUNTER.lock();
            *v += 1;
        }
        assert!(crate::cpu::interrupts_enabled());
        assert_eq!(*COUNTER.lock(), 1);
    }

    #[test]
    fn try_lock_fails_while_held() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        crate::cpu::enable_interrupts();
        let held = COUNTER.lock();
        assert!(COUNTER.try_lock().is_none());
        drop(held);
        assert!(COUNTER.try_lock().is_some());
    }

    #[test]
    fn guards_identifies_own_lock() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        crate::cpu::enable_interrupts();
        static OTHER: Spinlock<u32> = Spinlock::new(0);
        let g = COUNTER.lock();
        assert!(g.guards(&COUNTER));
        assert!(!g.guards(&OTHER));
    }
}
