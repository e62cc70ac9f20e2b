//! Encryption and decryption.

use rand_chacha::ChaCha20Rng;

use crate::math::{GaussianSampler, NttTable, Poly};

use super::types::{Ciphertext, Plaintext, PublicKey, SecretKey};

/// Encrypt a plaintext under a public key.
///
/// c0 = b·u + e0 + m, c1 = a·u + e1, with u ternary and e0, e1 Gaussian.
pub fn encrypt(
    pt: &Plaintext,
    pk: &PublicKey,
    table: &NttTable,
    rng: &mut ChaCha20Rng,
    sampler: &mut GaussianSampler,
) -> Ciphertext {
    let n = pt.poly.dimension();
    let q = pt.poly.modulus();

    let u = Poly::sample_ternary(n, q, rng);
    let e0 = Poly::sample_gaussian(n, q, sampler);
    let e1 = Poly::sample_gaussian(n, q, sampler);

    let c0 = &(&pk.b.mul_ntt(&u, table) + &e0) + &pt.poly;
    let c1 = &pk.a.mul_ntt(&u, table) + &e1;

    Ciphertext {
        c0,
        c1,
        level: pt.level,
        scale: pt.scale,
    }
}

/// Decrypt to a noisy plaintext: m̃ = c0 + c1·s.
pub fn decrypt(ct: &Ciphertext, sk: &SecretKey, table: &NttTable) -> Plaintext {
    let poly = &ct.c0 + &ct.c1.mul_ntt(&sk.s, table);
    Plaintext {
        poly,
        level: ct.level,
        scale: ct.scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ckks::keygen::generate_key_set;
    use crate::params::CkksParams;
    use rand::SeedableRng;

    #[test]
    fn test_encrypt_decrypt_noise_is_small() {
        let params = CkksParams::toy_16();
        let table = NttTable::new(params.ring_dim, params.q);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut sampler = GaussianSampler::with_seed(params.sigma, 2);
        let keys = generate_key_set(&params, &table, &mut rng, &mut sampler);

        let message: Vec<i64> = (0..params.ring_dim as i64).map(|i| i * 1_000_000).collect();
        let pt = Plaintext {
            poly: Poly::from_signed_coeffs(&message, params.q),
            level: params.max_level,
            scale: params.scale(),
        };

        let ct = encrypt(&pt, &keys.public, &table, &mut rng, &mut sampler);
        let decrypted = decrypt(&ct, &keys.secret, &table);

        assert_eq!(decrypted.level, pt.level);
        assert_eq!(decrypted.scale, pt.scale);

        // Fresh encryption noise: e0 + e1·s + e·u stays far below the scale
        for (m, d) in message.iter().zip(decrypted.poly.centered()) {
            assert!((m - d).abs() < 10_000, "noise {} too large", (m - d).abs());
        }
    }

    #[test]
    fn test_ciphertexts_are_randomized() {
        let params = CkksParams::toy_16();
        let table = NttTable::new(params.ring_dim, params.q);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut sampler = GaussianSampler::with_seed(params.sigma, 4);
        let keys = generate_key_set(&params, &table, &mut rng, &mut sampler);

        let pt = Plaintext {
            poly: Poly::zero(params.ring_dim, params.q),
            level: 1,
            scale: params.scale(),
        };

        let ct1 = encrypt(&pt, &keys.public, &table, &mut rng, &mut sampler);
        let ct2 = encrypt(&pt, &keys.public, &table, &mut rng, &mut sampler);
        assert_ne!(ct1.c0.coeffs(), ct2.c0.coeffs());
    }
}
