//! Build-time tunables for the scheduling core, xv6's `param.h` in Rust form.

/// Maximum number of simultaneously live processes.
pub const NPROC: usize = 64;

/// Number of CPUs this build schedules across. SMP load balancing across
/// per-CPU runqueues is out of scope, so this stays at 1, but the per-CPU
/// tables are sized off this constant rather than hardcoded.
pub const NCPU: usize = 1;

/// Bytes reserved for each process's kernel stack.
pub const KSTACK_SIZE: usize = 4096 * 4;

/// Consecutive scheduler passes a RUNNABLE process may go unselected before
/// it is aged into the round-robin queue.
pub const AGE_LIMIT: u32 = 8000;

/// Sentinel BJF rank meaning "no candidate seen yet". Any value at least this
/// large is unreachable by the real rank formula at these weights.
pub const BJF_INFINITY: i64 = i64::MAX;

/// Number of counting semaphores available to the semaphore layer.
pub const NSEM: usize = 6;

/// Width of the per-process `systemcalls` bitmap.
pub const NSYSCALLS: usize = 16;

/// Length of a process's fixed name buffer.
pub const NAME_LEN: usize = 16;

/// Pid of the distinguished init process.
pub const INIT_PID: i32 = 1;
