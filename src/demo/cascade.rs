//! Parent-pid cascade: parent forks generation A, A forks B, B forks C.
//! Each generation logs its own pid next to `get_parent_pid()`, and each
//! ancestor's `wait` is expected to return its direct child's pid.

use crate::proc;

pub fn spawn() {
    if let Err(e) = proc::spawn(parent, "cascade-parent") {
        crate::log_error!("demo::cascade: spawn failed: {}", e);
    }
}

fn parent() {
    log_self("parent");
    fork_and_wait(gen_a);
}

fn gen_a() {
    log_self("gen-a");
    fork_and_wait(gen_b);
}

fn gen_b() {
    log_self("gen-b");
    fork_and_wait(gen_c);
}

fn gen_c() {
    log_self("gen-c");
}

fn fork_and_wait(next: fn()) {
    match proc::fork_into(next) {
        Ok(child_pid) => match proc::wait() {
            Ok(reaped) => crate::log_info!(
                "demo::cascade: reaped child pid={} (expected {})",
                reaped,
                child_pid
            ),
            Err(e) => crate::log_error!("demo::cascade: wait failed: {}", e),
        },
        Err(e) => crate::log_error!("demo::cascade: fork failed: {}", e),
    }
}

fn log_self(label: &str) {
    let pid = proc::current_pid();
    match proc::get_parent_pid() {
        Ok(parent) => {
            crate::log_info!("demo::cascade: {} pid={} parent_pid={}", label, pid, parent)
        }
        Err(_) => crate::log_info!("demo::cascade: {} pid={} parent_pid=<none>", label, pid),
    }
}
