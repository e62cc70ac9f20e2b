//! Discrete Gaussian sampling
//!
//! Rejection sampler over ChaCha20 for the error terms of the encryption
//! scheme.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Default Gaussian standard deviation
pub const DEFAULT_SIGMA: f64 = 3.2;

/// Discrete Gaussian sampler over Z using rejection sampling
#[derive(Clone)]
pub struct GaussianSampler {
    /// Standard deviation σ
    sigma: f64,
    /// Reject samples beyond this many standard deviations
    tailcut: usize,
    rng: ChaCha20Rng,
}

impl GaussianSampler {
    /// Create a sampler seeded from OS entropy
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma,
            tailcut: (sigma * 6.0).ceil() as usize,
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Create a deterministic sampler from a u64 seed
    pub fn with_seed(sigma: f64, seed: u64) -> Self {
        Self {
            sigma,
            tailcut: (sigma * 6.0).ceil() as usize,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Sample a single value from D_σ in signed representation
    pub fn sample(&mut self) -> i64 {
        let sigma_sq_2 = 2.0 * self.sigma * self.sigma;
        let bound = self.tailcut as i64;

        loop {
            let x = self.rng.gen_range(-bound..=bound);
            let prob = (-((x * x) as f64) / sigma_sq_2).exp();
            let u: f64 = self.rng.gen();
            if u < prob {
                return x;
            }
        }
    }

    /// Sample a single value lifted into Z_q
    pub fn sample_centered(&mut self, q: u64) -> u64 {
        let s = self.sample();
        if s >= 0 {
            s as u64
        } else {
            q.wrapping_add(s as u64)
        }
    }

    /// Sample a vector of values lifted into Z_q
    pub fn sample_vec_centered(&mut self, len: usize, q: u64) -> Vec<u64> {
        (0..len).map(|_| self.sample_centered(q)).collect()
    }
}

impl std::fmt::Debug for GaussianSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaussianSampler")
            .field("sigma", &self.sigma)
            .field("tailcut", &self.tailcut)
            .finish()
    }
}
