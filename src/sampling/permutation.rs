use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Returns a copy of `samples` in a random order driven by `seed`.
///
/// Batching never reorders its input. Samples that carry structure in their
/// order (e.g. sorted by frequency) should be permuted with this helper
/// before batching to obtain i.i.d.-like batches.
pub fn permuted(samples: &[f64], seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = samples.to_vec();
    out.shuffle(&mut rng);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_order() {
        let samples: Vec<f64> = (0..100).map(f64::from).collect();
        assert_eq!(permuted(&samples, 42), permuted(&samples, 42));
        assert_ne!(permuted(&samples, 42), permuted(&samples, 43));
    }

    #[test]
    fn keeps_the_multiset() {
        let samples: Vec<f64> = (0..100).map(f64::from).collect();
        let mut shuffled = permuted(&samples, 7);
        assert_ne!(shuffled, samples);
        shuffled.sort_by(f64::total_cmp);
        assert_eq!(shuffled, samples);
    }
}
