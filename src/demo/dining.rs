//! Dining philosophers over the semaphore layer. `NSEM` (6) was sized
//! exactly for this: one room semaphore admitting at most four diners at
//! once, plus five chopstick semaphores, one per seat — the standard
//! deadlock-avoidance trick, since letting all five philosophers reach for
//! both chopsticks at once is the only way the circular wait forms.

use crate::proc;

const ROOM_SEM: usize = 0;
const MEALS: u32 = 3;

fn chopstick(seat: usize) -> usize {
    1 + seat
}

pub fn spawn() {
    if let Err(e) = proc::sem_init(ROOM_SEM, 4) {
        crate::log_error!("demo::dining: room sem_init failed: {}", e);
    }
    for seat in 0..5 {
        if let Err(e) = proc::sem_init(chopstick(seat), 1) {
            crate::log_error!("demo::dining: chopstick sem_init failed: {}", e);
        }
    }

    let philosophers: [(fn(), &str); 5] = [
        (phil0, "philosopher-0"),
        (phil1, "philosopher-1"),
        (phil2, "philosopher-2"),
        (phil3, "philosopher-3"),
        (phil4, "philosopher-4"),
    ];
    for (entry, name) in philosophers {
        if let Err(e) = proc::spawn(entry, name) {
            crate::log_error!("demo::dining: spawn failed: {}", e);
        }
    }
}

fn eat(seat: usize) {
    let left = chopstick(seat);
    let right = chopstick((seat + 1) % 5);
    for _ in 0..MEALS {
        let _ = proc::sem_acquire(ROOM_SEM);
        let _ = proc::sem_acquire(left);
        let _ = proc::sem_acquire(right);

        crate::log_info!("demo::dining: philosopher {} eating", seat);
        proc::yield_now();

        let _ = proc::sem_release(right);
        let _ = proc::sem_release(left);
        let _ = proc::sem_release(ROOM_SEM);

        proc::yield_now();
        if proc::killed() {
            break;
        }
    }
}

fn phil0() {
    eat(0);
}
fn phil1() {
    eat(1);
}
fn phil2() {
    eat(2);
}
fn phil3() {
    eat(3);
}
fn phil4() {
    eat(4);
}
