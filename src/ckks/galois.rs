//! Galois automorphisms τ_g: X → X^g over R_q = Z_q[X]/(X^N + 1).
//!
//! Slot rotation left by r steps is τ_g with g = 5^r mod 2N: the slots sit
//! at the roots ζ^(5^j), and X → X^(5^r) sends slot j to the evaluation
//! point of slot j + r.

use crate::math::{ModQ, Poly};

/// Apply τ_g to a polynomial.
///
/// X^i maps to X^(g·i mod 2N), with a sign flip whenever the reduced
/// exponent lands in [N, 2N).
pub fn apply_automorphism(poly: &Poly, g: usize) -> Poly {
    let n = poly.dimension();
    let q = poly.modulus();
    let two_n = 2 * n;

    let mut out = vec![0u64; n];
    for i in 0..n {
        let coeff = poly.coeff(i);
        if coeff == 0 {
            continue;
        }
        let idx = (g * i) % two_n;
        if idx < n {
            out[idx] = ModQ::add(out[idx], coeff, q);
        } else {
            out[idx - n] = ModQ::sub(out[idx - n], coeff, q);
        }
    }

    Poly::from_coeffs(out, q)
}

/// Galois element for a left rotation by `steps` slots: 5^steps mod 2N
pub fn rotation_element(steps: usize, ring_dim: usize) -> usize {
    let two_n = 2 * ring_dim;
    let mut g = 1usize;
    for _ in 0..steps {
        g = (g * 5) % two_n;
    }
    g
}
