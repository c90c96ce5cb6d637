//! Boot-time demo processes exercising the scheduling core end to end: each
//! submodule below realizes one of the scenarios the process table and
//! queue disciplines are meant to satisfy, as kernel-mode closures rather
//! than separate ring-3 ELF binaries — this build has no loader, so a demo
//! "driver process" is just a `fn()` spawned directly into the table.

pub mod aging;
pub mod cascade;
pub mod dining;
pub mod kill_sleeper;
pub mod lottery;
pub mod tuning;

/// Spawn every demo process. Called once from `kernel_main` before the
/// scheduler loop starts: every spawned slot is `RUNNABLE` immediately and
/// competes for dispatch the moment interrupts are enabled.
pub fn spawn_all() {
    cascade::spawn();
    tuning::spawn();
    lottery::spawn();
    aging::spawn();
    dining::spawn();
    kill_sleeper::spawn();
}
