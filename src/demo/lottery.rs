//! Lottery distribution: two queue-2 processes with tickets 1 and 3. Over
//! many scheduler dispatches of queue 2, the dispatch ratio between them is
//! expected to converge to 1:3.

use crate::proc;

pub fn spawn() {
    spawn_one("lottery-one", 1);
    spawn_one("lottery-three", 3);
}

fn spawn_one(name: &str, tickets: i64) {
    match proc::spawn(burn, name) {
        Ok(pid) => {
            if let Err(e) = proc::change_queue(pid, 2) {
                crate::log_error!("demo::lottery: change_queue failed: {}", e);
            }
            if let Err(e) = proc::set_tickets(pid, tickets) {
                crate::log_error!("demo::lottery: set_tickets failed: {}", e);
            }
        }
        Err(e) => crate::log_error!("demo::lottery: spawn failed: {}", e),
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
