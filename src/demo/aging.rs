//! Aging rescue: a BJF process with rank 0 (`p_ratio = t_ratio = c_ratio =
//! 0`) sits behind a dominant lottery process until its `wait_cycles`
//! crosses `AGE_LIMIT`, at which point it migrates to queue 1 and is
//! dispatched on the very next decision — round-robin always wins queue
//! selection over lottery and BJF.

use crate::proc;

pub fn spawn() {
    match proc::spawn(starved, "aging-starved") {
        Ok(pid) => {
            if let Err(e) = proc::change_queue(pid, 3) {
                crate::log_error!("demo::aging: change_queue failed: {}", e);
            }
            if let Err(e) = proc::proc_set_bjf_params(pid, 0, 0, 0) {
                crate::log_error!("demo::aging: proc_set_bjf_params failed: {}", e);
            }
        }
        Err(e) => crate::log_error!("demo::aging: spawn failed: {}", e),
    }

    match proc::spawn(dominant, "aging-dominant") {
        Ok(pid) => {
            if let Err(e) = proc::change_queue(pid, 2) {
                crate::log_error!("demo::aging: change_queue failed: {}", e);
            }
            if let Err(e) = proc::set_tickets(pid, 1000) {
                crate::log_error!("demo::aging: set_tickets failed: {}", e);
            }
        }
        Err(e) => crate::log_error!("demo::aging: spawn failed: {}", e),
    }
}

fn dominant() {
    loop {
        proc::yield_now();
        if proc::killed() {
            proc::exit(0);
        }
    }
}

fn starved() {
    crate::log_info!(
        "demo::aging: pid={} finally dispatched — aging promoted it out of queue 3",
        proc::current_pid()
    );
    proc::exit(0);
}
