//! Deterministic PRNG used by the lottery selector. A four-lane xorshift
//! combined generator, grounded on the original `random()` in `proc.c`:
//! four lanes seeded to `12345`, each advanced by its own shift-xor
//! recurrence, combined by XOR and reduced mod `max`. Not thread-safe —
//! callers hold the table lock, matching the original's lack of any
//! locking around its `static` lane state.

struct Lanes {
    z1: u32,
    z2: u32,
    z3: u32,
    z4: u32,
}

static mut LANES: Lanes = Lanes { z1: 12345, z2: 12345, z3: 12345, z4: 12345 };

/// Draw a value in `[0, max)`. `max <= 0` returns `1`, a defensive fallback
/// the lottery selector relies on so a zero ticket sum never divides by
/// zero — callers here pass an already ticket-summed total, so `max` is an
/// `i64` to mirror the spec's contract even though lane state is 32-bit.
pub fn random(max: i64) -> i64 {
    if max <= 0 {
        return 1;
    }

    // SAFETY: single coarse table lock serializes every caller.
    let lanes = unsafe { &mut *core::ptr::addr_of_mut!(LANES) };

    let b1 = (lanes.z1 << 6) ^ lanes.z1;
    let b1 = b1 >> 13;
    lanes.z1 = ((lanes.z1 & 4294967294) << 18) ^ b1;

    let b2 = (lanes.z2 << 2) ^ lanes.z2;
    let b2 = b2 >> 27;
    lanes.z2 = ((lanes.z2 & 4294967288) << 2) ^ b2;

    let b3 = (lanes.z3 << 13) ^ lanes.z3;
    let b3 = b3 >> 21;
    lanes.z3 = ((lanes.z3 & 4294967280) << 7) ^ b3;

    let b4 = (lanes.z4 << 3) ^ lanes.z4;
    let b4 = b4 >> 12;
    lanes.z4 = ((lanes.z4 & 4294967168) << 13) ^ b4;

    let combined = (lanes.z1 ^ lanes.z2 ^ lanes.z3 ^ lanes.z4) as i64;
    let r = combined % max;
    if r < 0 {
        -r
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonpositive_max_returns_one() {
        assert_eq!(random(0), 1);
        assert_eq!(random(-5), 1);
    }

    #[test]
    fn stays_in_bounds() {
        for _ in 0..1000 {
            let r = random(7);
            assert!(r >= 0 && r < 7, "random(7) produced {r}");
        }
    }

    #[test]
    fn is_deterministic_given_fixed_lane_state() {
        // The lanes are shared static state advanced by every call, so two
        // back-to-back sequences of the same length from a fresh process
        // are not expected to match — but a single draw should always land
        // in range regardless of how much prior state has accumulated.
        let mut seen_nonzero = false;
        for _ in 0..50 {
            if random(1000) != 0 {
                seen_nonzero = true;
            }
        }
        assert!(seen_nonzero, "generator appears stuck at zero");
    }
}
