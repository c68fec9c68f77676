//! Uniform random draws for spawn decisions.
//!
//! With the `rng` feature (default) values come from browser entropy via
//! `getrandom`. Without it a linear-congruential mix of the performance clock
//! stands in, which is plenty for arcade spawn jitter.

#[cfg(feature = "rng")]
pub fn rand_unit() -> f64 {
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_err() {
        return lcg_unit();
    }
    let bits = u64::from_le_bytes(buf);
    // Top 53 bits fill the f64 mantissa, giving a value in [0, 1).
    (bits >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(not(feature = "rng"))]
pub fn rand_unit() -> f64 {
    lcg_unit()
}

fn lcg_unit() -> f64 {
    use std::cell::Cell;
    thread_local! {
        static SEED: Cell<u64> = Cell::new(0);
    }
    SEED.with(|seed| {
        let mut x = seed.get();
        if x == 0 {
            x = crate::performance_now().to_bits() | 1;
        }
        x = x
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed.set(x);
        (x >> 11) as f64 / (1u64 << 53) as f64
    })
}

/// Uniform draw in [0, hi).
pub fn uniform(hi: f64) -> f64 {
    rand_unit() * hi
}

/// Uniform index in [0, len). Returns 0 for an empty range.
pub fn index(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((rand_unit() * len as f64) as usize).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rand_unit_stays_in_half_open_range() {
        for _ in 0..1000 {
            let v = rand_unit();
            assert!((0.0..1.0).contains(&v), "rand_unit out of range: {v}");
        }
    }

    #[test]
    fn uniform_scales_to_bound() {
        for _ in 0..1000 {
            let v = uniform(50.5);
            assert!((0.0..50.5).contains(&v), "uniform out of range: {v}");
        }
    }

    #[test]
    fn index_stays_in_bounds() {
        for _ in 0..1000 {
            assert!(index(3) < 3);
        }
        assert_eq!(index(0), 0);
    }
}
