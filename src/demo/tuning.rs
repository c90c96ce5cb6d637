//! Queue reassignment: start a CPU-bound loop at the default queue, then
//! move it into BJF (queue 3) with equal weights. Its rank should come out
//! to `3 + arrival_time + cycles`, advancing by `c_ratio` per dispatch.

use crate::proc;

pub fn spawn() {
    match proc::spawn(burn, "tuning-demo") {
        Ok(pid) => {
            if let Err(e) = proc::change_queue(pid, 3) {
                crate::log_error!("demo::tuning: change_queue failed: {}", e);
            }
            if let Err(e) = proc::proc_set_bjf_params(pid, 1, 1, 1) {
                crate::log_error!("demo::tuning: proc_set_bjf_params failed: {}", e);
            }
        }
        Err(e) => crate::log_error!("demo::tuning: spawn failed: {}", e),
    }
}

fn burn() {
    loop {
        proc::yield_now();
        if proc::killed() {
            proc::exit(0);
        }
    }
}
