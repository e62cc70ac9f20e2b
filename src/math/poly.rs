//! Polynomials in R_q = Z_q[X]/(X^n + 1).
//!
//! Coefficients are stored in the standard domain; multiplication runs a
//! transient negacyclic NTT through a borrowed table. Operations return new
//! polynomials, nothing mutates in place except `AddAssign`.

use std::ops::{Add, AddAssign, Neg, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::gaussian::GaussianSampler;
use super::modular::ModQ;
use super::ntt::NttTable;

/// Element of R_q with coefficient-domain storage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poly {
    coeffs: Vec<u64>,
    q: u64,
}

impl Poly {
    /// The zero polynomial of dimension `n`
    pub fn zero(n: usize, q: u64) -> Self {
        Self {
            coeffs: vec![0u64; n],
            q,
        }
    }

    /// Build from coefficients already reduced mod q
    pub fn from_coeffs(coeffs: Vec<u64>, q: u64) -> Self {
        debug_assert!(coeffs.iter().all(|&c| c < q));
        Self { coeffs, q }
    }

    /// Build from signed coefficients, mapping into Z_q
    pub fn from_signed_coeffs(coeffs: &[i64], q: u64) -> Self {
        Self {
            coeffs: coeffs.iter().map(|&c| ModQ::from_signed(c, q)).collect(),
            q,
        }
    }

    pub fn dimension(&self) -> usize {
        self.coeffs.len()
    }

    pub fn modulus(&self) -> u64 {
        self.q
    }

    #[inline]
    pub fn coeff(&self, i: usize) -> u64 {
        self.coeffs[i]
    }

    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    /// Coefficients lifted to the centered representation [-q/2, q/2]
    pub fn centered(&self) -> Vec<i64> {
        self.coeffs
            .iter()
            .map(|&c| ModQ::to_signed(c, self.q))
            .collect()
    }

    /// Uniformly random polynomial
    pub fn random<R: Rng>(n: usize, q: u64, rng: &mut R) -> Self {
        Self {
            coeffs: (0..n).map(|_| rng.gen_range(0..q)).collect(),
            q,
        }
    }

    /// Polynomial with discrete Gaussian coefficients
    pub fn sample_gaussian(n: usize, q: u64, sampler: &mut GaussianSampler) -> Self {
        Self {
            coeffs: sampler.sample_vec_centered(n, q),
            q,
        }
    }

    /// Ternary polynomial with coefficients in {-1, 0, 1}
    pub fn sample_ternary<R: Rng>(n: usize, q: u64, rng: &mut R) -> Self {
        Self {
            coeffs: (0..n)
                .map(|_| match rng.gen_range(0..3) {
                    0 => 0,
                    1 => 1,
                    _ => q - 1,
                })
                .collect(),
            q,
        }
    }

    /// Negacyclic product through the supplied NTT table
    pub fn mul_ntt(&self, other: &Self, table: &NttTable) -> Self {
        debug_assert_eq!(self.q, other.q);
        debug_assert_eq!(table.dimension(), self.dimension());
        debug_assert_eq!(table.modulus(), self.q);

        let mut a = self.coeffs.clone();
        let mut b = other.coeffs.clone();
        table.forward(&mut a);
        table.forward(&mut b);
        let mut prod = table.pointwise_mul(&a, &b);
        table.inverse(&mut prod);

        Self {
            coeffs: prod,
            q: self.q,
        }
    }

    /// Multiply every coefficient by a scalar
    pub fn scalar_mul(&self, s: u64) -> Self {
        Self {
            coeffs: self
                .coeffs
                .iter()
                .map(|&c| ModQ::mul(c, s, self.q))
                .collect(),
            q: self.q,
        }
    }
}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, other: &Poly) -> Poly {
        debug_assert_eq!(self.q, other.q);
        debug_assert_eq!(self.coeffs.len(), other.coeffs.len());
        Poly {
            coeffs: self
                .coeffs
                .iter()
                .zip(other.coeffs.iter())
                .map(|(&a, &b)| ModQ::add(a, b, self.q))
                .collect(),
            q: self.q,
        }
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, other: &Poly) -> Poly {
        debug_assert_eq!(self.q, other.q);
        debug_assert_eq!(self.coeffs.len(), other.coeffs.len());
        Poly {
            coeffs: self
                .coeffs
                .iter()
                .zip(other.coeffs.iter())
                .map(|(&a, &b)| ModQ::sub(a, b, self.q))
                .collect(),
            q: self.q,
        }
    }
}

impl AddAssign<&Poly> for Poly {
    fn add_assign(&mut self, other: &Poly) {
        debug_assert_eq!(self.q, other.q);
        for (a, &b) in self.coeffs.iter_mut().zip(other.coeffs.iter()) {
            *a = ModQ::add(*a, b, self.q);
        }
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        Poly {
            coeffs: self
                .coeffs
                .iter()
                .map(|&c| ModQ::negate(c, self.q))
                .collect(),
            q: self.q,
        }
    }
}
