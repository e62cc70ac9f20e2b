//! Value types for the scheme: plaintexts, ciphertexts, and key material.
//!
//! All operations over these types return new values; level and scale tags
//! travel with every ciphertext and plaintext so compatibility can be
//! checked before any ring arithmetic happens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::Poly;

/// Encoded slot vector ready for encryption or plaintext multiplication
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plaintext {
    pub poly: Poly,
    /// Level this plaintext is aligned with
    pub level: u8,
    /// Scale Δ the slot values were multiplied by
    pub scale: f64,
}

/// Degree-1 ciphertext (c0, c1) with m̃ = c0 + c1·s
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ciphertext {
    pub c0: Poly,
    pub c1: Poly,
    /// Remaining multiplicative budget
    pub level: u8,
    pub scale: f64,
}

/// Ternary secret key. Never serialized into a registry bundle; only the
/// owner's key file on disk ever holds one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecretKey {
    pub s: Poly,
}

/// Public encryption key (a, b) with b = -a·s + e
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicKey {
    pub a: Poly,
    pub b: Poly,
}

/// Base-z gadget decomposition parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GadgetVector {
    pub base: u64,
    pub len: usize,
}

impl GadgetVector {
    pub fn new(base: u64, len: usize) -> Self {
        Self { base, len }
    }

    /// Decompose a polynomial into `len` digit polynomials, least
    /// significant first: p = Σ_i digits[i] · base^i.
    pub fn decompose(&self, poly: &Poly) -> Vec<Poly> {
        let n = poly.dimension();
        let q = poly.modulus();
        let mut digits = vec![vec![0u64; n]; self.len];

        for k in 0..n {
            let mut rem = poly.coeff(k);
            for digit in digits.iter_mut() {
                digit[k] = rem % self.base;
                rem /= self.base;
            }
        }

        digits
            .into_iter()
            .map(|d| Poly::from_coeffs(d, q))
            .collect()
    }
}

/// Key-switching key: row i encrypts base^i · s' under s
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeySwitchKey {
    /// (a_i, b_i) pairs with b_i = -a_i·s + e_i + base^i·s'
    pub rows: Vec<(Poly, Poly)>,
    pub gadget: GadgetVector,
}

/// Key-switching keys for slot rotations, indexed by rotation step
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RotationKeySet {
    pub keys: BTreeMap<usize, KeySwitchKey>,
}

impl RotationKeySet {
    pub fn get(&self, step: usize) -> Option<&KeySwitchKey> {
        self.keys.get(&step)
    }

    pub fn steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.keys.keys().copied()
    }
}

/// Relinearization key: encrypts s² under s
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelinearizationKey {
    pub ksk: KeySwitchKey,
}

/// Everything a key owner generates in one shot
#[derive(Clone, Debug)]
pub struct KeySet {
    pub secret: SecretKey,
    pub public: PublicKey,
    pub rotation: RotationKeySet,
    pub relin: RelinearizationKey,
}

/// Server-side view of one user's key material.
///
/// Any single key upload enrolls the user; each upload overwrites only its
/// own slot. The secret key never appears here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyBundle {
    pub user_id: String,
    /// Parameter fingerprint the keys were generated under
    pub fingerprint: String,
    pub public_key: Option<PublicKey>,
    pub rotation_keys: Option<RotationKeySet>,
    pub relin_key: Option<RelinearizationKey>,
}

impl KeyBundle {
    pub fn empty(user_id: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            fingerprint: fingerprint.into(),
            public_key: None,
            rotation_keys: None,
            relin_key: None,
        }
    }
}
