//! The encryption context: the one entry point the rest of the crate uses.
//!
//! Bundles the validated parameter set with its NTT table and slot encoder
//! and re-exposes the scheme operations. Nothing outside this module's
//! siblings touches ring arithmetic directly.

use rand_chacha::ChaCha20Rng;

use crate::error::{MailError, Result};
use crate::math::{GaussianSampler, NttTable, Poly};
use crate::params::CkksParams;

use super::embed::SlotEncoder;
use super::enc;
use super::eval;
use super::keygen;
use super::types::{
    Ciphertext, KeySet, Plaintext, PublicKey, RelinearizationKey, RotationKeySet, SecretKey,
};

pub struct CkksContext {
    params: CkksParams,
    table: NttTable,
    encoder: SlotEncoder,
}

impl CkksContext {
    pub fn new(params: CkksParams) -> Result<Self> {
        params.validate()?;
        let table = NttTable::new(params.ring_dim, params.q);
        let encoder = SlotEncoder::new(params.ring_dim);
        Ok(Self {
            params,
            table,
            encoder,
        })
    }

    pub fn params(&self) -> &CkksParams {
        &self.params
    }

    pub fn fingerprint(&self) -> String {
        self.params.fingerprint()
    }

    pub fn generate_keys(
        &self,
        rng: &mut ChaCha20Rng,
        sampler: &mut GaussianSampler,
    ) -> KeySet {
        keygen::generate_key_set(&self.params, &self.table, rng, sampler)
    }

    /// Encode a slot vector at the given level.
    pub fn encode(&self, values: &[f64], level: u8) -> Result<Plaintext> {
        if values.len() != self.params.slots() {
            return Err(MailError::EncodingError(format!(
                "expected {} slots, got {}",
                self.params.slots(),
                values.len()
            )));
        }
        let coeffs = self.encoder.encode(values, self.params.scale());
        Ok(Plaintext {
            poly: Poly::from_signed_coeffs(&coeffs, self.params.q),
            level,
            scale: self.params.scale(),
        })
    }

    /// Decode a plaintext back to its slot vector.
    pub fn decode(&self, pt: &Plaintext) -> Vec<f64> {
        self.encoder.decode(&pt.poly.centered(), pt.scale)
    }

    /// Slot 0 of a decoded plaintext; the reduced inner product lands here.
    pub fn first_slot(&self, pt: &Plaintext) -> f64 {
        self.decode(pt)[0]
    }

    pub fn encrypt(
        &self,
        pt: &Plaintext,
        pk: &PublicKey,
        rng: &mut ChaCha20Rng,
        sampler: &mut GaussianSampler,
    ) -> Ciphertext {
        enc::encrypt(pt, pk, &self.table, rng, sampler)
    }

    pub fn decrypt(&self, ct: &Ciphertext, sk: &SecretKey) -> Plaintext {
        enc::decrypt(ct, sk, &self.table)
    }

    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        eval::add(a, b, &self.table)
    }

    pub fn multiply_plain(
        &self,
        ct: &Ciphertext,
        pt: &Plaintext,
        relin: &RelinearizationKey,
    ) -> Result<Ciphertext> {
        eval::multiply_plain(ct, pt, relin, &self.table)
    }

    pub fn rotate(
        &self,
        ct: &Ciphertext,
        steps: usize,
        rotation_keys: &RotationKeySet,
    ) -> Result<Ciphertext> {
        eval::rotate(ct, steps, rotation_keys, &self.table)
    }
}
