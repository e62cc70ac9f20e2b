//! Canonical-embedding slot encoder.
//!
//! Real slot vectors of length N/2 are mapped to integer polynomial
//! coefficients by inverting the evaluation map at the primitive 2N-th
//! roots of unity ζ^(5^j). Restricting evaluation points to the 5-orbit
//! keeps conjugate slots implicit, so real inputs yield real (integer)
//! coefficients, and slot rotation corresponds to the automorphism
//! X → X^(5^r).

use num_complex::Complex64;
use std::f64::consts::PI;

/// Encoder for a fixed ring dimension
#[derive(Clone, Debug)]
pub struct SlotEncoder {
    n: usize,
    slots: usize,
    /// 5^j mod 2N for j in 0..N/2
    rot_group: Vec<usize>,
    /// ζ^t for t in 0..2N, ζ = e^(iπ/N)
    zeta: Vec<Complex64>,
}

impl SlotEncoder {
    pub fn new(ring_dim: usize) -> Self {
        debug_assert!(ring_dim.is_power_of_two() && ring_dim >= 4);
        let slots = ring_dim / 2;
        let two_n = 2 * ring_dim;

        let mut rot_group = Vec::with_capacity(slots);
        let mut g = 1usize;
        for _ in 0..slots {
            rot_group.push(g);
            g = (g * 5) % two_n;
        }

        let zeta: Vec<Complex64> = (0..two_n)
            .map(|t| {
                let angle = PI * t as f64 / ring_dim as f64;
                Complex64::new(angle.cos(), angle.sin())
            })
            .collect();

        Self {
            n: ring_dim,
            slots,
            rot_group,
            zeta,
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Encode a slot vector into scaled integer coefficients.
    ///
    /// `values.len()` must equal the slot count; the caller checks this and
    /// returns a typed error before reaching here.
    pub fn encode(&self, values: &[f64], scale: f64) -> Vec<i64> {
        debug_assert_eq!(values.len(), self.slots);
        let two_n = 2 * self.n;
        let norm = 2.0 / self.n as f64;

        (0..self.n)
            .map(|k| {
                let mut acc = 0.0f64;
                for (j, &v) in values.iter().enumerate() {
                    // conj(ζ^g)^k = ζ^(-k·g)
                    let t = (two_n - (k * self.rot_group[j]) % two_n) % two_n;
                    acc += v * self.zeta[t].re;
                }
                (acc * norm * scale).round() as i64
            })
            .collect()
    }

    /// Decode centered coefficients back to a slot vector.
    pub fn decode(&self, coeffs: &[i64], scale: f64) -> Vec<f64> {
        debug_assert_eq!(coeffs.len(), self.n);
        let two_n = 2 * self.n;

        (0..self.slots)
            .map(|j| {
                let g = self.rot_group[j];
                let mut acc = Complex64::new(0.0, 0.0);
                for (k, &c) in coeffs.iter().enumerate() {
                    acc += self.zeta[(k * g) % two_n] * c as f64;
                }
                acc.re / scale
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: f64 = (1u64 << 26) as f64;

    #[test]
    fn test_encode_decode_roundtrip() {
        let encoder = SlotEncoder::new(16);
        let values = vec![0.5, -1.25, 3.0, 0.0, 2.5, -0.75, 1.0, -2.0];

        let coeffs = encoder.encode(&values, SCALE);
        let decoded = encoder.decode(&coeffs, SCALE);

        for (v, d) in values.iter().zip(decoded.iter()) {
            assert!((v - d).abs() < 1e-5, "slot {} decoded as {}", v, d);
        }
    }

    #[test]
    fn test_constant_vector_is_constant_poly() {
        let encoder = SlotEncoder::new(16);
        let values = vec![3.0; 8];

        let coeffs = encoder.encode(&values, SCALE);

        // All slots equal means only the degree-0 coefficient survives
        assert!((coeffs[0] as f64 - 3.0 * SCALE).abs() <= 1.0);
        for &c in &coeffs[1..] {
            assert!(c.abs() <= 1, "non-constant coefficient {}", c);
        }
    }

    #[test]
    fn test_coefficient_magnitude_bound() {
        // Coefficients never exceed the largest slot magnitude times the scale
        let encoder = SlotEncoder::new(32);
        let values: Vec<f64> = (0..16).map(|i| ((i * 7 % 11) as f64) - 5.0).collect();
        let max_abs = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));

        let coeffs = encoder.encode(&values, SCALE);
        for &c in &coeffs {
            assert!((c.abs() as f64) <= max_abs * SCALE + 1.0);
        }
    }

    #[test]
    fn test_rot_group_covers_half_orbit() {
        let encoder = SlotEncoder::new(16);
        // 5 has order N/2 modulo 2N, so the orbit has no repeats
        let mut seen = encoder.rot_group.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), encoder.slots());
    }
}
