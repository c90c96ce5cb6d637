//! Counting semaphores built directly atop the process table's sleep/wake
//! machinery, rather than on the generic `chan`-keyed `sleep`/`wakeup` pair:
//! a waiter is an explicit table index pushed onto this semaphore's own
//! stack, and `sem_release` transitions that exact slot to `RUNNABLE`
//! itself instead of broadcasting to every sleeper on a shared channel.
//! Grounded on the original `sem_acquire`/`sem_release` (`sem.c`): a bounded
//! LIFO waiter stack (`list`/`last`), not a FIFO queue — the dining
//! philosophers demo is the reference use case and does not require FIFO
//! fairness.

use core::fmt;

use super::{ProcState, ProcTable};
use crate::cpu;
use crate::param::{NPROC, NSEM};
use crate::sync::spinlock::SpinlockGuard;

/// Argument and lookup failures the semaphore layer can return. No
/// programmer-error variant: an out-of-range index is a caller mistake, not
/// a broken invariant, so it returns `Err` rather than panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemError {
    /// `i` is outside `0..NSEM`.
    InvalidIndex,
}

impl fmt::Display for SemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SemError::InvalidIndex => write!(f, "semaphore index out of range"),
        }
    }
}

pub type SemResult<T> = Result<T, SemError>;

/// One counting semaphore: a value and a bounded stack of waiting process
/// table indices. `last` is the number of live entries in `waiters`, i.e.
/// the stack top.
pub(crate) struct Semaphore {
    value: i64,
    waiters: [usize; NPROC],
    last: usize,
}

impl Semaphore {
    pub(crate) const fn new() -> Self {
        Semaphore { value: 0, waiters: [0; NPROC], last: 0 }
    }
}

/// `[Semaphore; NSEM]`, the array embedded in `ProcTable` so every
/// semaphore operation that touches process state rides the same coarse
/// table lock as the rest of the scheduler — a second lock here would let
/// `sched()`'s nesting-depth-one assertion trip the moment a blocked
/// `sem_acquire` re-entered the scheduler.
pub(crate) type SemArray = [Semaphore; NSEM];

pub(crate) const fn new_sems() -> SemArray {
    [const { Semaphore::new() }; NSEM]
}

fn check_index(i: usize) -> SemResult<()> {
    if i >= NSEM {
        Err(SemError::InvalidIndex)
    } else {
        Ok(())
    }
}

/// Set semaphore `i`'s initial value and empty its waiter stack.
pub fn sem_init(i: usize, v: i64) -> SemResult<()> {
    check_index(i)?;
    let mut table = super::PTABLE.lock();
    let sem = &mut table.sems[i];
    sem.value = v;
    sem.last = 0;
    Ok(())
}

/// Acquire semaphore `i`: decrement and return immediately if `value > 0`,
/// otherwise push the caller onto the waiter stack and block. A woken
/// waiter does not re-check `value` — `sem_release` transferred ownership
/// of the unit of resource directly to it by dispatching it, so decrementing
/// again here would double-count.
pub fn sem_acquire(i: usize) -> SemResult<()> {
    check_index(i)?;
    let self_idx = cpu::current().current_proc().expect("sem_acquire: no current process");
    let mut table = super::PTABLE.lock();

    if table.sems[i].value > 0 {
        table.sems[i].value -= 1;
        return Ok(());
    }

    let sem = &mut table.sems[i];
    sem.waiters[sem.last] = self_idx;
    sem.last += 1;

    let _table = block(self_idx, table);
    Ok(())
}

/// Release semaphore `i`: if anyone is waiting, pop the most recently
/// pushed waiter (LIFO) and dispatch it directly to `RUNNABLE`; otherwise
/// increment `value`.
pub fn sem_release(i: usize) -> SemResult<()> {
    check_index(i)?;
    let mut table = super::PTABLE.lock();

    if table.sems[i].last > 0 {
        table.sems[i].last -= 1;
        let last = table.sems[i].last;
        let waiter = table.sems[i].waiters[last];
        table.slots[waiter].state = ProcState::Runnable;
        table.slots[waiter].chan = None;
    } else {
        table.sems[i].value += 1;
    }
    Ok(())
}

/// Block the caller with no wait-channel set: unlike `sleep`, a semaphore
/// waiter is identified by its table index already recorded on the
/// semaphore's own stack, not by a `chan` match, so `chan` is left `None`
/// and nothing but this semaphore's own `sem_release` can ever wake it.
fn block(idx: usize, mut table: SpinlockGuard<'static, ProcTable>) -> SpinlockGuard<'static, ProcTable> {
    table.slots[idx].state = ProcState::Sleeping;
    super::sched(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::INIT_PID;
    use crate::proc::spawn;

    fn reset() {
        crate::cpu::enable_interrupts();
        let mut table = super::super::PTABLE.lock();
        for slot in table.slots.iter_mut() {
            if let Some(k) = slot.kstack_idx {
                crate::memory::kstack::free(k);
            }
            *slot = super::super::Proc::empty();
        }
        table.next_pid = INIT_PID + 1;
        for sem in table.sems.iter_mut() {
            sem.value = 0;
            sem.last = 0;
        }
        drop(table);
        crate::cpu::current().set_current_proc(None);
    }

    fn noop_entry() {}

    fn idx_of(pid: i32) -> usize {
        let table = super::super::PTABLE.lock();
        table
            .slots
            .iter()
            .position(|s| s.state != ProcState::Unused && s.pid == pid)
            .expect("idx_of: no such pid")
    }

    #[test]
    fn invalid_index_is_rejected() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        assert_eq!(sem_init(NSEM, 1), Err(SemError::InvalidIndex));
        assert_eq!(sem_acquire(NSEM), Err(SemError::InvalidIndex));
        assert_eq!(sem_release(NSEM), Err(SemError::InvalidIndex));
    }

    #[test]
    fn acquire_decrements_positive_value_without_blocking() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        let pid = spawn(noop_entry, "holder").unwrap();
        let idx = idx_of(pid);
        crate::cpu::current().set_current_proc(Some(idx));

        sem_init(0, 2).unwrap();
        sem_acquire(0).unwrap();
        {
            let table = super::super::PTABLE.lock();
            assert_eq!(table.sems[0].value, 1);
            assert_eq!(table.slots[idx].state, ProcState::Runnable);
        }
        sem_acquire(0).unwrap();
        assert_eq!(super::super::PTABLE.lock().sems[0].value, 0);

        crate::cpu::current().set_current_proc(None);
    }

    #[test]
    fn release_with_no_waiters_increments_value() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        sem_init(1, 0).unwrap();
        sem_release(1).unwrap();
        assert_eq!(super::super::PTABLE.lock().sems[1].value, 1);
    }

    #[test]
    fn release_wakes_most_recent_waiter_lifo() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        sem_init(2, 0).unwrap();

        let a = idx_of(spawn(noop_entry, "a").unwrap());
        let b = idx_of(spawn(noop_entry, "b").unwrap());

        {
            let mut table = super::super::PTABLE.lock();
            table.sems[2].waiters[0] = a;
            table.sems[2].waiters[1] = b;
            table.sems[2].last = 2;
            table.slots[a].state = ProcState::Sleeping;
            table.slots[b].state = ProcState::Sleeping;
        }

        // LIFO: b was pushed last, so it wakes first.
        sem_release(2).unwrap();
        {
            let table = super::super::PTABLE.lock();
            assert_eq!(table.slots[b].state, ProcState::Runnable);
            assert_eq!(table.slots[a].state, ProcState::Sleeping);
            assert_eq!(table.sems[2].last, 1);
        }

        sem_release(2).unwrap();
        let table = super::super::PTABLE.lock();
        assert_eq!(table.slots[a].state, ProcState::Runnable);
        assert_eq!(table.sems[2].last, 0);
    }
}
