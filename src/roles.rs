//! Sender- and receiver-side orchestration.
//!
//! The server side lives in `pipeline` and `http`; these are the two
//! endpoints of the protocol that hold plaintext data.

use rand_chacha::ChaCha20Rng;

use crate::ckks::{Ciphertext, CkksContext, PublicKey, SecretKey};
use crate::codec::{self, Label};
use crate::error::Result;
use crate::math::GaussianSampler;

/// Sender: token indices → indicator vector → encrypted embedding.
pub fn prepare_message(
    ctx: &CkksContext,
    token_indices: &[usize],
    recipient_pk: &PublicKey,
    rng: &mut ChaCha20Rng,
    sampler: &mut GaussianSampler,
) -> Result<Ciphertext> {
    let slots = codec::encode_tokens(token_indices, ctx.params().slots())?;
    let pt = ctx.encode(&slots, ctx.params().max_level)?;
    Ok(ctx.encrypt(&pt, recipient_pk, rng, sampler))
}

/// Receiver: decrypt a delivered result and derive the label.
///
/// Returns the raw score alongside the label so callers can log it.
pub fn read_result(
    ctx: &CkksContext,
    result: &Ciphertext,
    sk: &SecretKey,
    threshold: f64,
) -> Result<(f64, Label)> {
    let pt = ctx.decrypt(result, sk);
    let score = ctx.first_slot(&pt);
    Ok((score, codec::decode_decision(score, threshold)))
}
