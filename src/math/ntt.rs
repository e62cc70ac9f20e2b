//! Negacyclic number-theoretic transform over Z_q[X]/(X^n + 1).
//!
//! Forward transform is decimation-in-time Cooley-Tukey with the 2n-th
//! root of unity ψ folded into the twiddle tables, inverse is
//! decimation-in-frequency Gentleman-Sande. Both operate in place on
//! coefficient vectors of length n.

use super::modular::ModQ;

/// Default 60-bit NTT-friendly prime: 2^60 - 2^14 + 1.
///
/// q ≡ 1 (mod 2^14), so negacyclic transforms exist for all ring
/// dimensions up to 8192.
pub const DEFAULT_Q: u64 = 1152921504606830593;

/// Precomputed twiddle tables for a fixed (n, q) pair.
#[derive(Clone, Debug)]
pub struct NttTable {
    n: usize,
    q: u64,
    /// Powers of ψ in bit-reversed order
    psi_rev: Vec<u64>,
    /// Powers of ψ^{-1} in bit-reversed order
    psi_inv_rev: Vec<u64>,
    /// n^{-1} mod q, applied at the end of the inverse transform
    n_inv: u64,
}

impl NttTable {
    /// Build tables for dimension `n` and modulus `q`.
    ///
    /// # Panics
    /// Panics if `n` is not a power of two or q ≢ 1 (mod 2n).
    pub fn new(n: usize, q: u64) -> Self {
        assert!(n.is_power_of_two(), "ring dimension must be a power of two");
        assert_eq!(
            (q - 1) % (2 * n as u64),
            0,
            "q must be 1 mod 2n for the negacyclic NTT"
        );

        let psi = find_primitive_2n_root(n, q);
        let psi_inv = ModQ::inv(psi, q).expect("psi is nonzero");

        let bits = n.trailing_zeros();
        let mut psi_rev = vec![0u64; n];
        let mut psi_inv_rev = vec![0u64; n];
        let mut pow = 1u64;
        let mut pow_inv = 1u64;
        for i in 0..n {
            let rev = ((i as u64).reverse_bits() >> (64 - bits)) as usize;
            psi_rev[rev] = pow;
            psi_inv_rev[rev] = pow_inv;
            pow = ModQ::mul(pow, psi, q);
            pow_inv = ModQ::mul(pow_inv, psi_inv, q);
        }

        let n_inv = ModQ::inv(n as u64, q).expect("n < q");

        Self {
            n,
            q,
            psi_rev,
            psi_inv_rev,
            n_inv,
        }
    }

    /// Tables for the default prime
    pub fn with_default_q(n: usize) -> Self {
        Self::new(n, DEFAULT_Q)
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    pub fn modulus(&self) -> u64 {
        self.q
    }

    /// In-place forward negacyclic NTT (Cooley-Tukey, DIT).
    pub fn forward(&self, a: &mut [u64]) {
        debug_assert_eq!(a.len(), self.n);
        let q = self.q;
        let mut t = self.n;
        let mut m = 1;
        while m < self.n {
            t /= 2;
            for i in 0..m {
                let w = self.psi_rev[m + i];
                let j1 = 2 * i * t;
                for j in j1..j1 + t {
                    let u = a[j];
                    let v = ModQ::mul(a[j + t], w, q);
                    a[j] = ModQ::add(u, v, q);
                    a[j + t] = ModQ::sub(u, v, q);
                }
            }
            m *= 2;
        }
    }

    /// In-place inverse negacyclic NTT (Gentleman-Sande, DIF).
    pub fn inverse(&self, a: &mut [u64]) {
        debug_assert_eq!(a.len(), self.n);
        let q = self.q;
        let mut t = 1;
        let mut m = self.n;
        while m > 1 {
            let h = m / 2;
            let mut j1 = 0;
            for i in 0..h {
                let w = self.psi_inv_rev[h + i];
                for j in j1..j1 + t {
                    let u = a[j];
                    let v = a[j + t];
                    a[j] = ModQ::add(u, v, q);
                    a[j + t] = ModQ::mul(ModQ::sub(u, v, q), w, q);
                }
                j1 += 2 * t;
            }
            t *= 2;
            m = h;
        }
        for x in a.iter_mut() {
            *x = ModQ::mul(*x, self.n_inv, q);
        }
    }

    /// Pointwise product of two NTT-domain vectors
    pub fn pointwise_mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        debug_assert_eq!(a.len(), self.n);
        debug_assert_eq!(b.len(), self.n);
        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| ModQ::mul(x, y, self.q))
            .collect()
    }
}

/// Find a primitive 2n-th root of unity mod q.
///
/// Candidates are g^((q-1)/2n) for successive g; a candidate is primitive
/// when its n-th power is -1 mod q.
fn find_primitive_2n_root(n: usize, q: u64) -> u64 {
    let exp = (q - 1) / (2 * n as u64);
    for g in 2..q {
        let candidate = ModQ::pow(g, exp, q);
        if ModQ::pow(candidate, n as u64, q) == q - 1 {
            return candidate;
        }
    }
    unreachable!("q is prime with q ≡ 1 mod 2n, a primitive root exists")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Schoolbook negacyclic multiplication for cross-checking
    fn negacyclic_schoolbook(a: &[u64], b: &[u64], q: u64) -> Vec<u64> {
        let n = a.len();
        let mut out = vec![0u64; n];
        for i in 0..n {
            for j in 0..n {
                let prod = ModQ::mul(a[i], b[j], q);
                let idx = i + j;
                if idx < n {
                    out[idx] = ModQ::add(out[idx], prod, q);
                } else {
                    out[idx - n] = ModQ::sub(out[idx - n], prod, q);
                }
            }
        }
        out
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let table = NttTable::with_default_q(16);
        let original: Vec<u64> = (0..16).map(|i| (i * i + 1) as u64).collect();

        let mut a = original.clone();
        table.forward(&mut a);
        assert_ne!(a, original);
        table.inverse(&mut a);
        assert_eq!(a, original);
    }

    #[test]
    fn test_roundtrip_larger_dimension() {
        let table = NttTable::with_default_q(256);
        let original: Vec<u64> = (0..256)
            .map(|i| ModQ::mul(i as u64 + 1, 0x1234_5678_9abc, DEFAULT_Q))
            .collect();

        let mut a = original.clone();
        table.forward(&mut a);
        table.inverse(&mut a);
        assert_eq!(a, original);
    }

    #[test]
    fn test_ntt_mul_matches_schoolbook() {
        let n = 32;
        let table = NttTable::with_default_q(n);

        let a: Vec<u64> = (0..n).map(|i| (i as u64 * 7 + 3) % 1000).collect();
        let b: Vec<u64> = (0..n).map(|i| (i as u64 * 13 + 11) % 1000).collect();

        let expected = negacyclic_schoolbook(&a, &b, DEFAULT_Q);

        let mut fa = a.clone();
        let mut fb = b.clone();
        table.forward(&mut fa);
        table.forward(&mut fb);
        let mut prod = table.pointwise_mul(&fa, &fb);
        table.inverse(&mut prod);

        assert_eq!(prod, expected);
    }

    #[test]
    fn test_negacyclic_wraparound() {
        // X^(n-1) * X = X^n = -1 in Z_q[X]/(X^n + 1)
        let n = 16;
        let table = NttTable::with_default_q(n);

        let mut a = vec![0u64; n];
        a[n - 1] = 1;
        let mut b = vec![0u64; n];
        b[1] = 1;

        table.forward(&mut a);
        table.forward(&mut b);
        let mut prod = table.pointwise_mul(&a, &b);
        table.inverse(&mut prod);

        assert_eq!(prod[0], DEFAULT_Q - 1);
        for i in 1..n {
            assert_eq!(prod[i], 0);
        }
    }

    #[test]
    fn test_psi_has_order_2n() {
        let n = 64;
        let psi = find_primitive_2n_root(n, DEFAULT_Q);

        assert_eq!(ModQ::pow(psi, 2 * n as u64, DEFAULT_Q), 1);
        assert_eq!(ModQ::pow(psi, n as u64, DEFAULT_Q), DEFAULT_Q - 1);
    }
}
