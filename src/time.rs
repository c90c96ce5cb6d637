//! Monotonic tick counter fed by the timer interrupt. The scheduler's aging
//! pass and the round-robin selector's staleness comparison both read this;
//! nothing in `proc` advances it directly.

use core::sync::atomic::{AtomicU64, Ordering};

static TICKS: AtomicU64 = AtomicU64::new(0);

/// Advance the tick counter by one. Called only from the timer interrupt
/// handler in `interrupts::idt`.
pub fn tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

/// Current tick count.
pub fn now() -> u64 {
    TICKS.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_is_monotonic() {
        let a = now();
        tick();
        tick();
        let b = now();
        assert_eq!(b, a + 2);
    }
}
