//! The three queue disciplines the scheduler consults, in fixed priority
//! order: round-robin (queue 1), lottery (queue 2), best-job-first (queue
//! 3). `select` is the only entry point the scheduler loop calls.

use super::{ProcState, ProcTable};
use crate::time;

use super::rand;

/// Choose the next process to dispatch, trying queue 1, then 2, then 3.
/// Returns `None` if no queue has a runnable candidate.
pub(crate) fn select(table: &mut ProcTable) -> Option<usize> {
    if let Some(idx) = round_robin_select(table) {
        return Some(idx);
    }
    if let Some(idx) = lottery_select(table) {
        return Some(idx);
    }
    bjf_select(table)
}

/// Among `RUNNABLE` queue-1 slots, the one that has gone longest since it
/// last ran. Ties go to whichever slot is found first.
fn round_robin_select(table: &ProcTable) -> Option<usize> {
    let now = time::now();
    let mut best: Option<(usize, u64)> = None;
    for (i, slot) in table.slots.iter().enumerate() {
        if slot.state == ProcState::Runnable && slot.proc_level == 1 {
            let staleness = now.saturating_sub(slot.last_cpu_time);
            let replace = match best {
                Some((_, b)) => staleness > b,
                None => true,
            };
            if replace {
                best = Some((i, staleness));
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Weighted draw over `RUNNABLE` queue-2 slots by ticket count. `None` if
/// the queue is empty or every candidate holds zero tickets.
fn lottery_select(table: &ProcTable) -> Option<usize> {
    let total: i64 = table
        .slots
        .iter()
        .filter(|s| s.state == ProcState::Runnable && s.proc_level == 2)
        .map(|s| s.n_tickets)
        .sum();
    if total <= 0 {
        return None;
    }

    let draw = rand::random(total);
    let mut cumulative = 0i64;
    for (i, slot) in table.slots.iter().enumerate() {
        if slot.state == ProcState::Runnable && slot.proc_level == 2 {
            cumulative += slot.n_tickets;
            if cumulative > draw {
                return Some(i);
            }
        }
    }
    None
}

/// Among `RUNNABLE` queue-3 slots, the one minimizing
/// `3*p_ratio + arrival_time*t_ratio + cycles*c_ratio`, caching the rank on
/// each slot as it's computed. Ties go to whichever slot is found first.
fn bjf_select(table: &mut ProcTable) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, slot) in table.slots.iter_mut().enumerate() {
        if slot.state == ProcState::Runnable && slot.proc_level == 3 {
            let rank = 3 * slot.p_ratio + slot.arrival_time as i64 * slot.t_ratio + slot.cycles * slot.c_ratio;
            slot.rank = rank;
            let replace = match best {
                Some((_, b)) => rank < b,
                None => true,
            };
            if replace {
                best = Some((i, rank));
            }
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::NPROC;

    fn table_with<F: FnOnce(&mut ProcTable)>(f: F) -> ProcTable {
        let mut table = ProcTable::new();
        f(&mut table);
        table
    }

    #[test]
    fn round_robin_picks_stalest_and_breaks_ties_first_found() {
        let mut table = table_with(|t| {
            t.slots[0].state = ProcState::Runnable;
            t.slots[0].proc_level = 1;
            t.slots[0].last_cpu_time = 0;
            t.slots[1].state = ProcState::Runnable;
            t.slots[1].proc_level = 1;
            t.slots[1].last_cpu_time = 0;
        });
        assert_eq!(round_robin_select(&table), Some(0));

        table.slots[1].last_cpu_time = 0;
        table.slots[0].last_cpu_time = 5;
        // slot 1 is now stalest (never ran vs. ran at tick 5)
        assert_eq!(round_robin_select(&table), Some(1));
    }

    #[test]
    fn round_robin_ignores_other_levels_and_states() {
        let table = table_with(|t| {
            t.slots[0].state = ProcState::Runnable;
            t.slots[0].proc_level = 2;
            t.slots[1].state = ProcState::Sleeping;
            t.slots[1].proc_level = 1;
        });
        assert_eq!(round_robin_select(&table), None);
    }

    #[test]
    fn lottery_returns_none_with_no_tickets() {
        let table = table_with(|t| {
            t.slots[0].state = ProcState::Runnable;
            t.slots[0].proc_level = 2;
            t.slots[0].n_tickets = 0;
        });
        assert_eq!(lottery_select(&table), None);
    }

    #[test]
    fn lottery_only_selects_among_queue_two() {
        let table = table_with(|t| {
            t.slots[0].state = ProcState::Runnable;
            t.slots[0].proc_level = 2;
            t.slots[0].n_tickets = 10;
        });
        assert_eq!(lottery_select(&table), Some(0));
    }

    #[test]
    fn lottery_distribution_tracks_ticket_ratio() {
        let table = table_with(|t| {
            t.slots[0].state = ProcState::Runnable;
            t.slots[0].proc_level = 2;
            t.slots[0].n_tickets = 1;
            t.slots[1].state = ProcState::Runnable;
            t.slots[1].proc_level = 2;
            t.slots[1].n_tickets = 3;
        });

        let mut wins = [0u32; 2];
        for _ in 0..4000 {
            match lottery_select(&table) {
                Some(0) => wins[0] += 1,
                Some(1) => wins[1] += 1,
                other => panic!("unexpected winner: {other:?}"),
            }
        }
        let ratio = wins[1] as f64 / wins[0] as f64;
        assert!((2.0..4.6).contains(&ratio), "expected ~3:1 split, got {wins:?}");
    }

    #[test]
    fn bjf_monotonicity_with_equal_weights() {
        let table = table_with(|t| {
            for i in 0..3 {
                t.slots[i].state = ProcState::Runnable;
                t.slots[i].proc_level = 3;
                t.slots[i].p_ratio = 1;
                t.slots[i].t_ratio = 1;
                t.slots[i].c_ratio = 1;
                t.slots[i].arrival_time = (i * 10) as u64;
                t.slots[i].cycles = 1;
            }
        });
        let mut table = table;
        // slot 0 has the smallest arrival_time, so the smallest rank.
        assert_eq!(bjf_select(&mut table), Some(0));
        assert_eq!(table.slots[0].rank, 3 + 0 + 1);
    }

    #[test]
    fn bjf_empty_queue_returns_none() {
        let mut table = table_with(|_| {});
        assert!(table.slots.len() >= NPROC);
        assert_eq!(bjf_select(&mut table), None);
    }
}
