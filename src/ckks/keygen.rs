//! Key generation: secret/public pair, rotation key-switching keys for
//! every power-of-two step, and the relinearization key.

use rand_chacha::ChaCha20Rng;

use crate::math::{GaussianSampler, NttTable, Poly};
use crate::params::CkksParams;

use super::galois::{apply_automorphism, rotation_element};
use super::types::{
    GadgetVector, KeySet, KeySwitchKey, PublicKey, RelinearizationKey, RotationKeySet, SecretKey,
};

/// Generate a full key set for one user.
///
/// Rotation keys cover steps 1, 2, 4, ..., slots/2, exactly the steps the
/// rotate-and-sum reduction visits.
pub fn generate_key_set(
    params: &CkksParams,
    table: &NttTable,
    rng: &mut ChaCha20Rng,
    sampler: &mut GaussianSampler,
) -> KeySet {
    let n = params.ring_dim;
    let q = params.q;

    let s = Poly::sample_ternary(n, q, rng);
    let secret = SecretKey { s };

    // pk = (a, -a·s + e)
    let a = Poly::random(n, q, rng);
    let e = Poly::sample_gaussian(n, q, sampler);
    let b = &(-&a.mul_ntt(&secret.s, table)) + &e;
    let public = PublicKey { a, b };

    let gadget = GadgetVector::new(params.gadget_base, params.gadget_len);

    let mut rotation = RotationKeySet::default();
    let mut step = 1usize;
    while step <= params.slots() / 2 {
        let g = rotation_element(step, n);
        let rotated_s = apply_automorphism(&secret.s, g);
        let ksk = generate_switch_key(&secret.s, &rotated_s, gadget, table, rng, sampler);
        rotation.keys.insert(step, ksk);
        step *= 2;
    }

    let s_squared = secret.s.mul_ntt(&secret.s, table);
    let relin = RelinearizationKey {
        ksk: generate_switch_key(&secret.s, &s_squared, gadget, table, rng, sampler),
    };

    KeySet {
        secret,
        public,
        rotation,
        relin,
    }
}

/// Build a key-switching key from `target` to `s`.
///
/// Row i is (a_i, b_i) with b_i = -a_i·s + e_i + base^i·target, so that
/// summing digit_i·b_i + digit_i·a_i·s recovers c1·target plus small noise.
pub fn generate_switch_key(
    s: &Poly,
    target: &Poly,
    gadget: GadgetVector,
    table: &NttTable,
    rng: &mut ChaCha20Rng,
    sampler: &mut GaussianSampler,
) -> KeySwitchKey {
    let n = s.dimension();
    let q = s.modulus();

    let mut rows = Vec::with_capacity(gadget.len);
    let mut power = 1u64;
    for _ in 0..gadget.len {
        let a_i = Poly::random(n, q, rng);
        let e_i = Poly::sample_gaussian(n, q, sampler);
        let b_i = &(&(-&a_i.mul_ntt(s, table)) + &e_i) + &target.scalar_mul(power);
        rows.push((a_i, b_i));
        power = crate::math::ModQ::mul(power, gadget.base, q);
    }

    KeySwitchKey { rows, gadget }
}
