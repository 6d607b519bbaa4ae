//! Bounded rejection sampling of index pairs.

use rand::Rng;
use reid_core::{Error, Result};

/// Draws allowed per constrained pair before the window is declared unsatisfiable
pub const MAX_PAIR_ATTEMPTS: usize = 100_000;

/// Draws `x, y` uniformly from `[0, upper)` until `min_gap <= x - y <= max_gap`.
///
/// Windows without any valid pair fail immediately; satisfiable windows fail
/// after [`MAX_PAIR_ATTEMPTS`] rejected draws.
pub fn constrained_pair<R: Rng + ?Sized>(
    rng: &mut R,
    upper: usize,
    min_gap: usize,
    max_gap: f64,
) -> Result<(usize, usize)> {
    let widest = upper.saturating_sub(1) as f64;
    if upper == 0 || min_gap == 0 || min_gap as f64 > max_gap.min(widest) {
        return Err(Error::Config(format!(
            "no index pair in [0, {upper}) is between {min_gap} and {max_gap} apart"
        )));
    }

    for _ in 0..MAX_PAIR_ATTEMPTS {
        let x = rng.gen_range(0..upper);
        let y = rng.gen_range(0..upper);
        let gap = x as f64 - y as f64;
        if gap >= min_gap as f64 && gap <= max_gap {
            return Ok((x, y));
        }
    }

    Err(Error::Config(format!(
        "gave up after {MAX_PAIR_ATTEMPTS} draws for an index pair in [0, {upper}) \
         between {min_gap} and {max_gap} apart"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_pairs_respect_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let (x, y) = constrained_pair(&mut rng, 50, 5, 15.0).unwrap();
            let gap = x - y;
            assert!((5..=15).contains(&gap), "gap {gap} outside window");
        }
    }

    #[test]
    fn test_empty_window_is_config_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // gap of 10 cannot fit in 10 positions
        assert!(matches!(
            constrained_pair(&mut rng, 10, 10, 30.0),
            Err(Error::Config(_))
        ));
        // max below min
        assert!(constrained_pair(&mut rng, 10, 3, 2.5).is_err());
        assert!(constrained_pair(&mut rng, 0, 1, 1.0).is_err());
    }

    #[test]
    fn test_tightest_window_is_found() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(constrained_pair(&mut rng, 2, 1, 1.0).unwrap(), (1, 0));
    }
}
