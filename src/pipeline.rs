//! The homomorphic evaluation pipeline.
//!
//! Multiply the inbound ciphertext by the encoded weight vector, then fold
//! all slots into slot 0 with a rotate-and-sum reduction over strictly
//! increasing power-of-two steps. The whole pipeline is a pure function of
//! its arguments; the server runs it on a blocking worker.

use crate::ckks::{Ciphertext, CkksContext, KeyBundle};
use crate::error::{MailError, Result};

/// Evaluate the linear classifier on one ciphertext.
///
/// `weights` must match the slot count; it is re-encoded at the inbound
/// ciphertext's level on every call. Fails without partial effects: any
/// missing rotation key aborts before anything is delivered.
pub fn evaluate(
    ctx: &CkksContext,
    weights: &[f64],
    ct: &Ciphertext,
    bundle: &KeyBundle,
) -> Result<Ciphertext> {
    let rotation_keys = bundle
        .rotation_keys
        .as_ref()
        .ok_or(MailError::MissingRotationKey(1))?;
    let relin_key = bundle
        .relin_key
        .as_ref()
        .ok_or_else(|| MailError::MissingRelinKey(bundle.user_id.clone()))?;

    let pt_weights = ctx.encode(weights, ct.level)?;
    let mut acc = ctx.multiply_plain(ct, &pt_weights, relin_key)?;

    // After log2(slots) doublings every slot holds the full inner product
    for k in 0..ctx.params().log_slots() {
        let step = 1usize << k;
        let rotated = ctx.rotate(&acc, step, rotation_keys)?;
        acc = ctx.add(&acc, &rotated)?;
    }

    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ckks::KeySet;
    use crate::codec;
    use crate::math::GaussianSampler;
    use crate::params::CkksParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    struct Fixture {
        ctx: CkksContext,
        keys: KeySet,
        rng: ChaCha20Rng,
        sampler: GaussianSampler,
    }

    fn fixture(seed: u64) -> Fixture {
        let ctx = CkksContext::new(CkksParams::toy_16()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut sampler = GaussianSampler::with_seed(ctx.params().sigma, seed + 1);
        let keys = ctx.generate_keys(&mut rng, &mut sampler);
        Fixture {
            ctx,
            keys,
            rng,
            sampler,
        }
    }

    fn bundle(fx: &Fixture) -> KeyBundle {
        KeyBundle {
            user_id: "alice".into(),
            fingerprint: fx.ctx.fingerprint(),
            public_key: Some(fx.keys.public.clone()),
            rotation_keys: Some(fx.keys.rotation.clone()),
            relin_key: Some(fx.keys.relin.clone()),
        }
    }

    fn encrypt_tokens(fx: &mut Fixture, indices: &[usize]) -> Ciphertext {
        let slots = codec::encode_tokens(indices, fx.ctx.params().slots()).unwrap();
        let pt = fx.ctx.encode(&slots, fx.ctx.params().max_level).unwrap();
        fx.ctx
            .encrypt(&pt, &fx.keys.public, &mut fx.rng, &mut fx.sampler)
    }

    fn first_slot(fx: &Fixture, ct: &Ciphertext) -> f64 {
        let pt = fx.ctx.decrypt(ct, &fx.keys.secret);
        fx.ctx.first_slot(&pt)
    }

    #[test]
    fn test_inner_product_ham_scenario() {
        let mut fx = fixture(30);
        let weights = vec![0.1, 0.2, 0.3, 0.4, 0.0, 0.0, 0.0, 0.0];
        let ct = encrypt_tokens(&mut fx, &[1, 3]);

        let result = evaluate(&fx.ctx, &weights, &ct, &bundle(&fx)).unwrap();
        let score = first_slot(&fx, &result);

        assert!((score - 0.6).abs() < 0.01, "score {}", score);
        assert_eq!(
            codec::decode_decision(score, codec::DEFAULT_THRESHOLD),
            codec::Label::Ham
        );
    }

    #[test]
    fn test_inner_product_spam_scenario() {
        let mut fx = fixture(31);
        let weights = vec![-5.0; 8];
        let ct = encrypt_tokens(&mut fx, &[0, 1]);

        let result = evaluate(&fx.ctx, &weights, &ct, &bundle(&fx)).unwrap();
        let score = first_slot(&fx, &result);

        assert!((score - (-10.0)).abs() < 0.01, "score {}", score);
        assert_eq!(
            codec::decode_decision(score, codec::DEFAULT_THRESHOLD),
            codec::Label::Spam
        );
    }

    #[test]
    fn test_reduction_fills_every_slot() {
        let mut fx = fixture(32);
        let weights = vec![1.0; 8];
        let ct = encrypt_tokens(&mut fx, &[0, 2, 5]);

        let result = evaluate(&fx.ctx, &weights, &ct, &bundle(&fx)).unwrap();
        let pt = fx.ctx.decrypt(&result, &fx.keys.secret);
        for (j, slot) in fx.ctx.decode(&pt).iter().enumerate() {
            assert!((slot - 3.0).abs() < 0.01, "slot {}: {}", j, slot);
        }
    }

    #[test]
    fn test_all_distinct_weights_reduce_to_sum() {
        let mut fx = fixture(33);
        let weights: Vec<f64> = (0..8).map(|i| i as f64 * 0.25).collect();
        let all_tokens: Vec<usize> = (0..8).collect();
        let ct = encrypt_tokens(&mut fx, &all_tokens);

        let result = evaluate(&fx.ctx, &weights, &ct, &bundle(&fx)).unwrap();
        let score = first_slot(&fx, &result);
        let expected: f64 = weights.iter().sum();
        assert!((score - expected).abs() < 0.01, "score {}", score);
    }

    #[test]
    fn test_missing_rotation_keys_abort() {
        let mut fx = fixture(34);
        let ct = encrypt_tokens(&mut fx, &[0]);
        let mut b = bundle(&fx);
        b.rotation_keys = None;

        assert!(matches!(
            evaluate(&fx.ctx, &vec![1.0; 8], &ct, &b),
            Err(MailError::MissingRotationKey(1))
        ));
    }

    #[test]
    fn test_missing_single_rotation_step_aborts() {
        let mut fx = fixture(35);
        let ct = encrypt_tokens(&mut fx, &[0]);
        let mut b = bundle(&fx);
        if let Some(rok) = b.rotation_keys.as_mut() {
            rok.keys.remove(&2);
        }

        assert!(matches!(
            evaluate(&fx.ctx, &vec![1.0; 8], &ct, &b),
            Err(MailError::MissingRotationKey(2))
        ));
    }

    #[test]
    fn test_missing_relin_key_aborts() {
        let mut fx = fixture(36);
        let ct = encrypt_tokens(&mut fx, &[0]);
        let mut b = bundle(&fx);
        b.relin_key = None;

        assert!(matches!(
            evaluate(&fx.ctx, &vec![1.0; 8], &ct, &b),
            Err(MailError::MissingRelinKey(_))
        ));
    }

    #[test]
    fn test_wire_ciphertext_with_wrong_dimension_is_rejected() {
        let fx = fixture(38);

        // Mimic a hand-crafted request body: a dimension-4 ciphertext
        // arriving over JSON for an N=16 context
        let stray = Ciphertext {
            c0: crate::math::Poly::zero(4, fx.ctx.params().q),
            c1: crate::math::Poly::zero(4, fx.ctx.params().q),
            level: fx.ctx.params().max_level,
            scale: fx.ctx.params().scale(),
        };
        let wire = serde_json::to_string(&stray).unwrap();
        let deserialized: Ciphertext = serde_json::from_str(&wire).unwrap();

        let err = evaluate(&fx.ctx, &[1.0; 8], &deserialized, &bundle(&fx)).unwrap_err();
        assert!(matches!(err, MailError::EncodingError(_)), "got {err}");
    }

    #[test]
    fn test_wire_ciphertext_with_wrong_modulus_is_rejected() {
        let fx = fixture(39);

        let stray = Ciphertext {
            c0: crate::math::Poly::zero(16, 8193),
            c1: crate::math::Poly::zero(16, 8193),
            level: fx.ctx.params().max_level,
            scale: fx.ctx.params().scale(),
        };
        let wire = serde_json::to_string(&stray).unwrap();
        let deserialized: Ciphertext = serde_json::from_str(&wire).unwrap();

        let err = evaluate(&fx.ctx, &[1.0; 8], &deserialized, &bundle(&fx)).unwrap_err();
        assert!(matches!(err, MailError::ConfigMismatch { .. }), "got {err}");
    }

    #[test]
    fn test_weight_length_mismatch() {
        let mut fx = fixture(37);
        let ct = encrypt_tokens(&mut fx, &[0]);

        assert!(matches!(
            evaluate(&fx.ctx, &[1.0; 4], &ct, &bundle(&fx)),
            Err(MailError::EncodingError(_))
        ));
    }
}
