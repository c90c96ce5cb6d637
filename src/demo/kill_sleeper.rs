//! Kill of sleeper: a parent blocks in `wait` on a child that never exits,
//! then an unrelated process calls `kill` on the parent. Expected: the
//! parent's `wait` wakes and returns `Err(ProcError::Killed)` rather than a
//! reaped pid.

use core::sync::atomic::{AtomicI32, Ordering};

use crate::proc;

/// The parent's pid, published so the killer process (itself a plain `fn()`
/// with no way to receive an argument) knows who to target.
static TARGET_PID: AtomicI32 = AtomicI32::new(0);

pub fn spawn() {
    match proc::spawn(parent, "kill-demo-parent") {
        Ok(pid) => {
            TARGET_PID.store(pid, Ordering::SeqCst);
            if let Err(e) = proc::spawn(killer, "kill-demo-killer") {
                crate::log_error!("demo::kill_sleeper: killer spawn failed: {}", e);
            }
        }
        Err(e) => crate::log_error!("demo::kill_sleeper: parent spawn failed: {}", e),
    }
}

fn parent() {
    match proc::fork_into(child_loop) {
        Ok(child_pid) => crate::log_info!(
            "demo::kill_sleeper: parent pid={} forked never-exiting child pid={}",
            proc::current_pid(),
            child_pid
        ),
        Err(e) => {
            crate::log_error!("demo::kill_sleeper: fork failed: {}", e);
            return;
        }
    }

    match proc::wait() {
        Ok(pid) => crate::log_info!("demo::kill_sleeper: unexpectedly reaped pid={}", pid),
        Err(proc::ProcError::Killed) => {
            crate::log_info!("demo::kill_sleeper: wait interrupted by kill, as expected")
        }
        Err(e) => crate::log_error!("demo::kill_sleeper: wait failed: {}", e),
    }
}

fn child_loop() {
    loop {
        proc::yield_now();
        if proc::killed() {
            proc::exit(0);
        }
    }
}

fn killer() {
    for _ in 0..5 {
        proc::yield_now();
    }
    let target = TARGET_PID.load(Ordering::SeqCst);
    match proc::kill(target) {
        Ok(()) => crate::log_info!("demo::kill_sleeper: sent kill to pid={}", target),
        Err(e) => crate::log_error!("demo::kill_sleeper: kill failed: {}", e),
    }
}
