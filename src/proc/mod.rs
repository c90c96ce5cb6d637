//! The process table: lifecycle (allocate/fork/exit/wait/kill), the
//! scheduler's dispatch loop, sleep/wakeup, and the tuning surface the
//! driver processes call into. One coarse spinlock (`PTABLE`) serializes
//! every state transition; see `sync::spinlock` for the push_off-nested
//! interrupt discipline that lock rides on.

pub mod context;
pub mod error;
pub mod queue;
pub mod rand;
pub mod sem;

use crate::cpu;
use crate::memory::{kstack, AddressSpace};
use crate::param::{AGE_LIMIT, BJF_INFINITY, INIT_PID, NAME_LEN, NCPU, NPROC, NSYSCALLS};
use crate::sync::spinlock::{Spinlock, SpinlockGuard};
use crate::time;
use context::{switch_context, Context};
pub use error::{ProcError, ProcResult};
pub use sem::{sem_acquire, sem_init, sem_release, SemError, SemResult};

/// Opaque wait-channel token. A process sleeps on some `Chan` value and is
/// woken by anyone calling `wakeup` with the same value; by convention a
/// process's own table index doubles as the channel its parent's `wait`
/// blocks on.
pub type Chan = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    Unused,
    Embryo,
    Runnable,
    Running,
    Sleeping,
    Zombie,
}

struct Proc {
    pid: i32,
    state: ProcState,
    parent: Option<usize>,
    kstack_idx: Option<usize>,
    context: Context,
    entry: Option<fn()>,
    space: AddressSpace,
    chan: Option<Chan>,
    killed: bool,
    proc_level: u8,
    arrival_time: u64,
    cycles: i64,
    last_cpu_time: u64,
    wait_cycles: u32,
    n_tickets: i64,
    p_ratio: i64,
    t_ratio: i64,
    c_ratio: i64,
    rank: i64,
    systemcalls: [bool; NSYSCALLS],
    name: [u8; NAME_LEN],
}

impl Proc {
    const fn empty() -> Self {
        Proc {
            pid: 0,
            state: ProcState::Unused,
            parent: None,
            kstack_idx: None,
            context: Context::empty(),
            entry: None,
            space: AddressSpace::unallocated(),
            chan: None,
            killed: false,
            proc_level: 2,
            arrival_time: 0,
            cycles: 0,
            last_cpu_time: 0,
            wait_cycles: 0,
            n_tickets: 0,
            p_ratio: 1,
            t_ratio: 1,
            c_ratio: 1,
            rank: BJF_INFINITY,
            systemcalls: [false; NSYSCALLS],
            name: [0u8; NAME_LEN],
        }
    }
}

// `pub(crate)` rather than fully private: `queue::select` (a sibling
// submodule) needs to name this type in its own signature, and a private
// type can't appear in a more-visible item's interface.
pub(crate) struct ProcTable {
    slots: [Proc; NPROC],
    next_pid: i32,
    sems: sem::SemArray,
}

impl ProcTable {
    const fn new() -> Self {
        ProcTable {
            slots: [const { Proc::empty() }; NPROC],
            next_pid: INIT_PID + 1,
            sems: sem::new_sems(),
        }
    }
}

static PTABLE: Spinlock<ProcTable> = Spinlock::new(ProcTable::new());

// Per-CPU saved context for the scheduler loop itself, the other end of the
// ping-pong `switch_context` performs against a dispatched process's context.
static mut SCHED_CTX: [Context; NCPU] = [Context::empty(); NCPU];

fn name_to_bytes(name: &str) -> [u8; NAME_LEN] {
    let mut buf = [0u8; NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

fn name_str(bytes: &[u8; NAME_LEN]) -> &str {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    core::str::from_utf8(&bytes[..len]).unwrap_or("?")
}

fn find_by_pid_mut(table: &mut ProcTable, pid: i32) -> Option<&mut Proc> {
    table.slots.iter_mut().find(|s| s.state != ProcState::Unused && s.pid == pid)
}

/// Establish the distinguished init process at table index 0, pid 1. Called
/// once at boot before the scheduler loop starts.
pub fn init() {
    {
        let mut table = PTABLE.lock();
        let slot = &mut table.slots[0];
        *slot = Proc::empty();
        slot.pid = INIT_PID;
        slot.state = ProcState::Runnable;
        slot.parent = None;
        slot.entry = Some(init_entry);
        slot.name = name_to_bytes("init");
        slot.proc_level = 1;
        slot.arrival_time = time::now();
        slot.cycles = 1;
    }

    let kstack_idx = kstack::alloc().expect("proc::init: kernel stack pool exhausted at boot");
    let stack_top = kstack::top_of(kstack_idx);
    let mut table = PTABLE.lock();
    table.slots[0].kstack_idx = Some(kstack_idx);
    table.slots[0].context = Context::new(trampoline as u64, stack_top);
    table.slots[0].space = AddressSpace::new();
    drop(table);

    crate::log_info!("proc: init process ready (pid {})", INIT_PID);
}

/// Init's own body: reap whatever orphans get reparented to it. Runs forever,
/// yielding whenever there is nothing to reap.
fn init_entry() {
    loop {
        let _ = wait();
        yield_now();
    }
}

/// Scan for a free slot, assign it a pid, and seed scheduling defaults.
/// Leaves the slot `EMBRYO` with no kernel stack or address space yet.
fn alloc_slot(parent: Option<usize>, entry: fn(), name: &[u8; NAME_LEN]) -> ProcResult<(usize, i32)> {
    let mut table = PTABLE.lock();
    let idx = table
        .slots
        .iter()
        .position(|p| p.state == ProcState::Unused)
        .ok_or(ProcError::ResourceExhausted)?;
    let pid = table.next_pid;
    table.next_pid += 1;
    let now = time::now();
    let slot = &mut table.slots[idx];
    *slot = Proc::empty();
    slot.state = ProcState::Embryo;
    slot.pid = pid;
    slot.parent = parent;
    slot.entry = Some(entry);
    slot.name = *name;
    slot.proc_level = 2;
    slot.arrival_time = now;
    slot.cycles = 1;
    Ok((idx, pid))
}

/// Finish allocation: reserve a kernel stack, install the given address
/// space, wire up the trampoline context, and flip the slot to `RUNNABLE`.
/// On kstack exhaustion, reverts the slot to `UNUSED`.
fn finish_alloc(idx: usize, space: AddressSpace) -> ProcResult<usize> {
    let kstack_idx = match kstack::alloc() {
        Some(i) => i,
        None => {
            let mut table = PTABLE.lock();
            table.slots[idx] = Proc::empty();
            return Err(ProcError::ResourceExhausted);
        }
    };
    let stack_top = kstack::top_of(kstack_idx);

    let mut table = PTABLE.lock();
    let slot = &mut table.slots[idx];
    slot.kstack_idx = Some(kstack_idx);
    slot.space = space;
    slot.context = Context::new(trampoline as u64, stack_top);
    slot.state = ProcState::Runnable;
    Ok(idx)
}

/// Spawn a fresh, parentless-by-default driver process (used by boot-time
/// demos). `parent` is init's slot so it gets reaped if it ever exits.
pub fn spawn(entry: fn(), name: &str) -> ProcResult<i32> {
    let bytes = name_to_bytes(name);
    let (idx, _pid) = alloc_slot(Some(0), entry, &bytes)?;
    let idx = finish_alloc(idx, AddressSpace::new())?;
    let table = PTABLE.lock();
    Ok(table.slots[idx].pid)
}

fn fork_common(entry_override: Option<fn()>) -> ProcResult<i32> {
    let (parent_idx, entry, name, syscalls, parent_space) = {
        let table = PTABLE.lock();
        let parent_idx = cpu::current().current_proc().expect("fork: no current process");
        let p = &table.slots[parent_idx];
        (
            parent_idx,
            p.entry.expect("fork: current process has no entry"),
            p.name,
            p.systemcalls,
            p.space,
        )
    };

    let child_space = parent_space.try_clone()?;
    let (idx, _pid) = alloc_slot(Some(parent_idx), entry, &name)?;
    let idx = match finish_alloc(idx, child_space) {
        Ok(idx) => idx,
        Err(e) => return Err(e),
    };

    let mut table = PTABLE.lock();
    table.slots[idx].systemcalls = syscalls;
    if let Some(next_entry) = entry_override {
        table.slots[idx].entry = Some(next_entry);
    }
    Ok(table.slots[idx].pid)
}

/// Fork the calling process: a new slot running the same entry closure,
/// inheriting the parent's address space (copied) and syscall-usage bitmap.
/// Scheduling weights reset to defaults — fork does not inherit tuning.
pub fn fork() -> ProcResult<i32> {
    fork_common(None)
}

/// Demo-only convenience standing in for this build's missing `exec()`:
/// forks as normal, but overwrites the child's entry point before it can be
/// dispatched, so a driver demo can express a "do X, then become Y" cascade
/// without a real exec syscall. Not part of the core `fork` contract.
pub fn fork_into(next_entry: fn()) -> ProcResult<i32> {
    fork_common(Some(next_entry))
}

/// Terminate the caller. Reparents surviving children to init, marks the
/// caller `ZOMBIE`, wakes whoever is waiting on it, and never returns.
pub fn exit(_status: i32) -> ! {
    let idx = cpu::current().current_proc().expect("exit: no current process");

    let mut table = PTABLE.lock();
    if table.slots[idx].pid == INIT_PID {
        panic!("exit: init process may not exit");
    }

    let parent_chan = table.slots[idx].parent.unwrap_or(0);

    let mut any_zombie_child = false;
    for i in 0..table.slots.len() {
        if table.slots[i].state != ProcState::Unused && table.slots[i].parent == Some(idx) {
            table.slots[i].parent = Some(0);
            if table.slots[i].state == ProcState::Zombie {
                any_zombie_child = true;
            }
        }
    }

    table.slots[idx].state = ProcState::Zombie;

    if any_zombie_child {
        wakeup_locked(&mut table, 0);
    }
    wakeup_locked(&mut table, parent_chan);

    let _table = sched(table);
    unreachable!("exit: a ZOMBIE process must never be rescheduled");
}

/// Reap one zombie child, or block until one appears. `Err(NoChildren)` if
/// the caller has none at all; `Err(Killed)` if the caller was killed while
/// waiting.
pub fn wait() -> ProcResult<i32> {
    let self_idx = cpu::current().current_proc().expect("wait: no current process");
    loop {
        let mut table = PTABLE.lock();

        let mut has_children = false;
        let mut reaped = None;
        for i in 0..table.slots.len() {
            if table.slots[i].state != ProcState::Unused && table.slots[i].parent == Some(self_idx) {
                has_children = true;
                if table.slots[i].state == ProcState::Zombie {
                    reaped = Some(i);
                    break;
                }
            }
        }

        if let Some(child_idx) = reaped {
            let pid = table.slots[child_idx].pid;
            if let Some(kidx) = table.slots[child_idx].kstack_idx {
                kstack::free(kidx);
            }
            table.slots[child_idx] = Proc::empty();
            return Ok(pid);
        }

        if !has_children {
            return Err(ProcError::NoChildren);
        }

        if table.slots[self_idx].killed {
            return Err(ProcError::Killed);
        }

        let table = sleep(self_idx, table);
        let killed = table.slots[self_idx].killed;
        drop(table);
        if killed {
            return Err(ProcError::Killed);
        }
    }
}

/// Mark `pid` for termination. A sleeping target is promoted to `RUNNABLE`
/// so its trampoline loop observes `killed` and exits on its next check.
pub fn kill(pid: i32) -> ProcResult<()> {
    let mut table = PTABLE.lock();
    for slot in table.slots.iter_mut() {
        if slot.state != ProcState::Unused && slot.pid == pid {
            slot.killed = true;
            if slot.state == ProcState::Sleeping {
                slot.state = ProcState::Runnable;
                slot.chan = None;
            }
            return Ok(());
        }
    }
    Err(ProcError::NotFound)
}

/// Whether the calling process has been marked for termination — driver
/// process trampoline loops check this between iterations.
pub fn killed() -> bool {
    let table = PTABLE.lock();
    match cpu::current().current_proc() {
        Some(idx) => table.slots[idx].killed,
        None => false,
    }
}

/// Block the caller on `chan`, releasing `table` across the switch and
/// handing back a fresh guard once woken. The spec's two-argument
/// `sleep(chan, lock)` contract collapses to this guard-consuming form since
/// every caller in this build already holds the table lock — the "acquire
/// table lock, drop the other" step that closes the lost-wakeup window is a
/// no-op when that other lock doesn't exist.
fn sleep(chan: Chan, mut table: SpinlockGuard<'static, ProcTable>) -> SpinlockGuard<'static, ProcTable> {
    let idx = cpu::current().current_proc().expect("sleep: no current process");
    table.slots[idx].chan = Some(chan);
    table.slots[idx].state = ProcState::Sleeping;
    let mut table = sched(table);
    table.slots[idx].chan = None;
    table
}

/// Wake every process sleeping on `chan`. Broadcast: all matching waiters
/// become `RUNNABLE`.
pub fn wakeup(chan: Chan) {
    let mut table = PTABLE.lock();
    wakeup_locked(&mut table, chan);
}

fn wakeup_locked(table: &mut ProcTable, chan: Chan) {
    for slot in table.slots.iter_mut() {
        if slot.state == ProcState::Sleeping && slot.chan == Some(chan) {
            slot.state = ProcState::Runnable;
            slot.chan = None;
        }
    }
}

/// Give up the CPU voluntarily (or on a timer-requested reschedule) without
/// blocking on anything. `cycles` is deliberately untouched here — it is
/// counted only at dispatch in the scheduler loop.
pub fn yield_now() {
    let idx = cpu::current().current_proc().expect("yield_now: no current process");
    let mut table = PTABLE.lock();
    table.slots[idx].state = ProcState::Runnable;
    table.slots[idx].last_cpu_time = time::now();
    drop(sched(table));
}

/// Re-enter the scheduler from whatever suspension point (`yield`, `sleep`,
/// `exit`) called it. Asserts the table lock is held at nesting depth one,
/// the caller isn't still `RUNNING`, and interrupts are off. The table guard
/// is simply returned once the switch resumes here — nothing ever actually
/// unlocked it, since the physical lock state outlives whichever stack
/// happens to be executing.
fn sched(table: SpinlockGuard<'static, ProcTable>) -> SpinlockGuard<'static, ProcTable> {
    let cpu = cpu::current();
    assert_eq!(cpu.noff(), 1, "sched: table lock must be held at nesting depth 1");
    assert!(!cpu::interrupts_enabled(), "sched: interrupts must be disabled");
    let idx = cpu.current_proc().expect("sched: no current process");
    assert_ne!(table.slots[idx].state, ProcState::Running, "sched: caller must not be RUNNING");

    let intena = cpu.intena();
    let cpuid = cpu::id();
    let old_ctx: *mut Context = &table.slots[idx].context as *const Context as *mut Context;
    // SAFETY: SCHED_CTX[cpuid] is only ever touched from this CPU's own
    // scheduler loop and its own `sched` calls, serialized by the table lock.
    let new_ctx: *const Context = unsafe { core::ptr::addr_of!(SCHED_CTX[cpuid]) };
    unsafe { switch_context(old_ctx, new_ctx) };
    cpu.set_intena(intena);
    table
}

/// Entry point for every freshly allocated process. Reads its entry closure
/// out of the table, releases the table lock the scheduler's dispatch is
/// still holding across the switch-in, then runs the closure and exits on
/// return.
extern "C" fn trampoline() -> ! {
    let entry = {
        // SAFETY: the scheduler's dispatch loop holds `PTABLE` across the
        // switch that lands here; this stack never called `lock()` itself.
        let table = unsafe { SpinlockGuard::assume_held(&PTABLE) };
        let idx = cpu::current().current_proc().expect("trampoline: no current process");
        table.slots[idx].entry.expect("trampoline: process has no entry closure")
    };
    entry();
    exit(0);
}

fn age_waiters(table: &mut ProcTable) {
    for slot in table.slots.iter_mut() {
        if slot.state == ProcState::Runnable {
            if slot.wait_cycles >= AGE_LIMIT {
                slot.wait_cycles = 0;
                slot.proc_level = 1;
            } else {
                slot.wait_cycles += 1;
            }
        }
    }
}

/// Per-CPU infinite scheduling loop: age waiters, pick a victim via the
/// queue disciplines, dispatch it, repeat. Never returns.
pub fn scheduler_loop() -> ! {
    let cpuid = cpu::id();
    loop {
        cpu::enable_interrupts();
        let mut table = PTABLE.lock();
        cpu::current().set_current_proc(None);

        age_waiters(&mut table);

        if let Some(victim) = queue::select(&mut table) {
            table.slots[victim].state = ProcState::Running;
            table.slots[victim].wait_cycles = 0;
            table.slots[victim].cycles += 1;
            table.slots[victim].space.activate();
            cpu::current().set_current_proc(Some(victim));

            let new_ctx: *const Context = &table.slots[victim].context as *const Context;
            // SAFETY: this CPU's own saved scheduler context; nothing else
            // writes it while the table lock is held.
            let old_ctx: *mut Context = unsafe { core::ptr::addr_of_mut!(SCHED_CTX[cpuid]) };
            unsafe { switch_context(old_ctx, new_ctx) };

            cpu::current().set_current_proc(None);
        }

        drop(table);
    }
}

/// Move `pid` to queue discipline `level` (`1..=3`).
pub fn change_queue(pid: i32, level: u8) -> ProcResult<()> {
    if !(1..=3).contains(&level) {
        return Err(ProcError::InvalidLevel);
    }
    let mut table = PTABLE.lock();
    let slot = find_by_pid_mut(&mut table, pid).ok_or(ProcError::NotFound)?;
    slot.proc_level = level;
    Ok(())
}

/// Set `pid`'s lottery ticket count.
pub fn set_tickets(pid: i32, count: i64) -> ProcResult<()> {
    let mut table = PTABLE.lock();
    let slot = find_by_pid_mut(&mut table, pid).ok_or(ProcError::NotFound)?;
    slot.n_tickets = count;
    Ok(())
}

/// Set `pid`'s BJF weights.
pub fn proc_set_bjf_params(pid: i32, p: i64, t: i64, c: i64) -> ProcResult<()> {
    let mut table = PTABLE.lock();
    let slot = find_by_pid_mut(&mut table, pid).ok_or(ProcError::NotFound)?;
    slot.p_ratio = p;
    slot.t_ratio = t;
    slot.c_ratio = c;
    Ok(())
}

/// Set the BJF weights on every live process.
pub fn set_bjf_params(p: i64, t: i64, c: i64) -> ProcResult<()> {
    let mut table = PTABLE.lock();
    for slot in table.slots.iter_mut() {
        if slot.state != ProcState::Unused {
            slot.p_ratio = p;
            slot.t_ratio = t;
            slot.c_ratio = c;
        }
    }
    Ok(())
}

/// Dump the table to the log: name, pid, state, queue, cycles, tickets,
/// arrival, rank, weights.
pub fn print_process() {
    let table = PTABLE.lock();
    for slot in table.slots.iter() {
        if slot.state != ProcState::Unused {
            crate::log_info!(
                "pid={} name={} state={:?} level={} cycles={} tickets={} arrival={} rank={} weights=({},{},{})",
                slot.pid,
                name_str(&slot.name),
                slot.state,
                slot.proc_level,
                slot.cycles,
                slot.n_tickets,
                slot.arrival_time,
                slot.rank,
                slot.p_ratio,
                slot.t_ratio,
                slot.c_ratio
            );
        }
    }
}

/// The caller's parent's pid.
pub fn get_parent_pid() -> ProcResult<i32> {
    let table = PTABLE.lock();
    let idx = cpu::current().current_proc().expect("get_parent_pid: no current process");
    let parent_idx = table.slots[idx].parent.ok_or(ProcError::NotFound)?;
    Ok(table.slots[parent_idx].pid)
}

/// The caller's own pid.
pub fn current_pid() -> i32 {
    let table = PTABLE.lock();
    let idx = cpu::current().current_proc().expect("current_pid: no current process");
    table.slots[idx].pid
}

/// Log the pids of every live process that has invoked syscall `number`, per
/// its `systemcalls` bitmap; a distinct message when none have.
pub fn get_callers(number: usize) {
    let table = PTABLE.lock();
    let mut any = false;
    for slot in table.slots.iter() {
        if slot.state != ProcState::Unused && number < NSYSCALLS && slot.systemcalls[number] {
            crate::log_info!("get_callers: pid {} called syscall {}", slot.pid, number);
            any = true;
        }
    }
    if !any {
        crate::log_info!("get_callers: no process has called syscall {}", number);
    }
}

/// Record that the calling process has invoked syscall `number`, for the
/// `get_callers` query. Numbers outside the bitmap's width are ignored.
pub fn record_syscall(number: usize) {
    if number >= NSYSCALLS {
        return;
    }
    let mut table = PTABLE.lock();
    if let Some(idx) = cpu::current().current_proc() {
        table.slots[idx].systemcalls[number] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reset() {
        crate::cpu::enable_interrupts();
        let mut table = PTABLE.lock();
        for slot in table.slots.iter_mut() {
            if let Some(k) = slot.kstack_idx {
                kstack::free(k);
            }
            *slot = Proc::empty();
        }
        table.next_pid = INIT_PID + 1;
        drop(table);
        crate::cpu::current().set_current_proc(None);
    }

    fn noop_entry() {}

    fn idx_of(pid: i32) -> usize {
        let table = PTABLE.lock();
        table
            .slots
            .iter()
            .position(|s| s.state != ProcState::Unused && s.pid == pid)
            .expect("idx_of: no such pid")
    }

    #[test]
    fn name_round_trips_through_fixed_buffer() {
        let bytes = name_to_bytes("dining_phil");
        assert_eq!(name_str(&bytes), "dining_phil");
        let truncated = name_to_bytes("this_name_is_way_too_long_for_the_buffer");
        assert_eq!(name_str(&truncated).len(), NAME_LEN);
    }

    #[test]
    fn spawn_allocates_runnable_slot_with_defaults() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();

        let pid = spawn(noop_entry, "worker").expect("spawn failed");
        let idx = idx_of(pid);
        let table = PTABLE.lock();
        assert_eq!(table.slots[idx].state, ProcState::Runnable);
        assert_eq!(table.slots[idx].proc_level, 2);
        assert_eq!(table.slots[idx].n_tickets, 0);
        assert_eq!(table.slots[idx].rank, BJF_INFINITY);
        assert_eq!(table.slots[idx].parent, Some(0));
    }

    #[test]
    fn change_queue_rejects_out_of_range_level() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        let pid = spawn(noop_entry, "w").unwrap();
        assert_eq!(change_queue(pid, 0), Err(ProcError::InvalidLevel));
        assert_eq!(change_queue(pid, 4), Err(ProcError::InvalidLevel));
        assert_eq!(change_queue(pid, 3), Ok(()));
        let idx = idx_of(pid);
        assert_eq!(PTABLE.lock().slots[idx].proc_level, 3);
    }

    #[test]
    fn tuning_calls_report_unknown_pid() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        assert_eq!(change_queue(9999, 1), Err(ProcError::NotFound));
        assert_eq!(set_tickets(9999, 5), Err(ProcError::NotFound));
        assert_eq!(proc_set_bjf_params(9999, 1, 1, 1), Err(ProcError::NotFound));
    }

    #[test]
    fn set_bjf_params_is_global() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        let a = spawn(noop_entry, "a").unwrap();
        let b = spawn(noop_entry, "b").unwrap();
        set_bjf_params(7, 8, 9).unwrap();
        let table = PTABLE.lock();
        for pid in [a, b] {
            let idx = table.slots.iter().position(|s| s.pid == pid).unwrap();
            assert_eq!(table.slots[idx].p_ratio, 7);
            assert_eq!(table.slots[idx].t_ratio, 8);
            assert_eq!(table.slots[idx].c_ratio, 9);
        }
    }

    #[test]
    fn kill_promotes_sleeper_and_marks_killed() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        let pid = spawn(noop_entry, "sleeper").unwrap();
        let idx = idx_of(pid);
        {
            let mut table = PTABLE.lock();
            table.slots[idx].state = ProcState::Sleeping;
            table.slots[idx].chan = Some(42);
        }
        kill(pid).unwrap();
        let table = PTABLE.lock();
        assert!(table.slots[idx].killed);
        assert_eq!(table.slots[idx].state, ProcState::Runnable);
    }

    #[test]
    fn kill_unknown_pid_is_not_found() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        assert_eq!(kill(123456), Err(ProcError::NotFound));
    }

    #[test]
    fn fork_copies_entry_and_syscalls_bitmap() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();

        let parent_pid = spawn(noop_entry, "parent").unwrap();
        let parent_idx = idx_of(parent_pid);
        {
            let mut table = PTABLE.lock();
            table.slots[parent_idx].systemcalls[3] = true;
        }
        cpu::current().set_current_proc(Some(parent_idx));

        let child_pid = fork().expect("fork failed");
        let child_idx = idx_of(child_pid);
        let table = PTABLE.lock();
        assert_eq!(table.slots[child_idx].parent, Some(parent_idx));
        assert!(table.slots[child_idx].systemcalls[3]);
        assert_eq!(table.slots[child_idx].n_tickets, 0);
        assert_eq!(table.slots[child_idx].state, ProcState::Runnable);

        cpu::current().set_current_proc(None);
    }

    #[test]
    fn wait_reaps_existing_zombie_child() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();

        let parent_pid = spawn(noop_entry, "parent").unwrap();
        let parent_idx = idx_of(parent_pid);
        let child_pid = spawn(noop_entry, "child").unwrap();
        let child_idx = idx_of(child_pid);
        {
            let mut table = PTABLE.lock();
            table.slots[child_idx].parent = Some(parent_idx);
            table.slots[child_idx].state = ProcState::Zombie;
        }

        cpu::current().set_current_proc(Some(parent_idx));
        let reaped = wait().expect("wait should reap the zombie child");
        assert_eq!(reaped, child_pid);
        assert_eq!(PTABLE.lock().slots[child_idx].state, ProcState::Unused);
        cpu::current().set_current_proc(None);
    }

    #[test]
    fn wait_reports_no_children() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        let pid = spawn(noop_entry, "lonely").unwrap();
        let idx = idx_of(pid);
        cpu::current().set_current_proc(Some(idx));
        assert_eq!(wait(), Err(ProcError::NoChildren));
        cpu::current().set_current_proc(None);
    }

    #[test]
    fn get_parent_pid_reflects_fork() {
        let _guard = crate::test_support::LOCK.lock().unwrap();
        reset();
        let parent_pid = spawn(noop_entry, "parent").unwrap();
        let parent_idx = idx_of(parent_pid);
        cpu::current().set_current_proc(Some(parent_idx));
        let child_pid = fork().unwrap();
        let child_idx = idx_of(child_pid);
        cpu::current().set_current_proc(Some(child_idx));
        assert_eq!(get_parent_pid(), Ok(parent_pid));
        cpu::current().set_current_proc(None);
    }
}
