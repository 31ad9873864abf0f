use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Gamma, Gumbel};

/// `n` Gumbel(location, scale) draws from a generator seeded with `seed`.
pub fn gumbel_samples(location: f64, scale: f64, n: usize, seed: u64) -> Vec<f64> {
    let dist = Gumbel::new(location, scale).expect("valid gumbel parameters");
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

/// `n` Gamma(shape, scale) draws from a generator seeded with `seed`.
pub fn gamma_samples(shape: f64, scale: f64, n: usize, seed: u64) -> Vec<f64> {
    let dist = Gamma::new(shape, scale).expect("valid gamma parameters");
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

/// A narrow-band search over `bins` coordinates (0, 1, ..., bins - 1) with
/// `per_bin` Gamma(2, 1) detection statistics each, laid out bin by bin.
#[derive(Debug, Clone)]
pub struct BandedSearch {
    pub coordinates: Vec<f64>,
    pub samples: Vec<f64>,
    pub per_bin: usize,
}

impl BandedSearch {
    pub fn new(bins: usize, per_bin: usize, seed: u64) -> Self {
        let samples = gamma_samples(2.0, 1.0, bins * per_bin, seed);
        let coordinates = (0..bins)
            .flat_map(|b| std::iter::repeat_n(b as f64, per_bin))
            .collect();
        Self {
            coordinates,
            samples,
            per_bin,
        }
    }

    /// Replaces every sample in bins `[first, first + width)` with a loud,
    /// slightly varying value around `level`.
    pub fn with_loud_band(mut self, first: usize, width: usize, level: f64) -> Self {
        let start = first * self.per_bin;
        let end = (first + width) * self.per_bin;
        for (j, v) in self.samples[start..end].iter_mut().enumerate() {
            *v = level + 0.001 * j as f64;
        }
        self
    }

    /// Samples outside bins `[first, first + width)`, in order.
    pub fn without_band(&self, first: usize, width: usize) -> Vec<f64> {
        let lo = first as f64;
        let hi = (first + width) as f64;
        self.samples
            .iter()
            .zip(&self.coordinates)
            .filter(|&(_, &c)| c < lo || c >= hi)
            .map(|(&v, _)| v)
            .collect()
    }
}
