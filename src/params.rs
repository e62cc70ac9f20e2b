//! Scheme parameters.
//!
//! A single NTT-friendly 60-bit prime stands in for a modulus chain;
//! multiplicative depth is tracked by an explicit level budget instead of
//! dropping primes. The protocol needs exactly one plaintext multiply, so
//! `max_level = 1` suffices.

use serde::{Deserialize, Serialize};

use crate::error::MailError;
use crate::math::{DEFAULT_Q, DEFAULT_SIGMA};

/// Parameters shared by every party in a deployment.
///
/// Immutable once built; both sides compare `fingerprint()` strings before
/// combining any key or ciphertext material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CkksParams {
    /// Ring dimension N (power of two); slot count is N/2
    pub ring_dim: usize,
    /// Ciphertext modulus q
    pub q: u64,
    /// log2 of the encoding scale Δ
    pub scale_bits: u32,
    /// Gaussian error standard deviation
    pub sigma: f64,
    /// Gadget decomposition base for key-switching
    pub gadget_base: u64,
    /// Number of gadget digits
    pub gadget_len: usize,
    /// Multiplicative depth budget
    pub max_level: u8,
}

impl CkksParams {
    /// Production preset: 4096 slots for the token vocabulary.
    pub fn mail_4096() -> Self {
        Self {
            ring_dim: 8192,
            q: DEFAULT_Q,
            scale_bits: 26,
            sigma: DEFAULT_SIGMA,
            gadget_base: 1 << 20,
            gadget_len: 3,
            max_level: 1,
        }
    }

    /// Small preset for tests: 8 slots.
    ///
    /// The narrow gadget base keeps key-switch noise small even for
    /// rotations at the base scale Δ.
    pub fn toy_16() -> Self {
        Self {
            ring_dim: 16,
            q: DEFAULT_Q,
            scale_bits: 26,
            sigma: DEFAULT_SIGMA,
            gadget_base: 1 << 6,
            gadget_len: 10,
            max_level: 1,
        }
    }

    /// Number of plaintext slots (N/2)
    pub fn slots(&self) -> usize {
        self.ring_dim / 2
    }

    /// log2 of the slot count
    pub fn log_slots(&self) -> u32 {
        self.slots().trailing_zeros()
    }

    /// Encoding scale Δ = 2^scale_bits
    pub fn scale(&self) -> f64 {
        (1u64 << self.scale_bits) as f64
    }

    /// Check internal consistency.
    ///
    /// The scale budget must leave headroom below q: every level consumes
    /// `scale_bits` and the decoded message plus noise must stay well under
    /// q/2.
    pub fn validate(&self) -> Result<(), MailError> {
        if !self.ring_dim.is_power_of_two() || self.ring_dim < 4 {
            return Err(MailError::InvalidParams(format!(
                "ring dimension {} must be a power of two >= 4",
                self.ring_dim
            )));
        }
        if self.q < 2 {
            return Err(MailError::InvalidParams(format!(
                "modulus q = {} must be at least 2",
                self.q
            )));
        }
        if (self.q - 1) % (2 * self.ring_dim as u64) != 0 {
            return Err(MailError::InvalidParams(format!(
                "q = {} is not 1 mod 2N for N = {}",
                self.q, self.ring_dim
            )));
        }
        let log_q = 63 - self.q.leading_zeros();
        let budget = self.scale_bits * (self.max_level as u32 + 1);
        if budget + 6 > log_q {
            return Err(MailError::InvalidParams(format!(
                "scale budget {} bits leaves no headroom under log2(q) = {}",
                budget, log_q
            )));
        }
        if self.gadget_len == 0 || self.gadget_base < 2 {
            return Err(MailError::InvalidParams(
                "gadget decomposition needs base >= 2 and at least one digit".into(),
            ));
        }
        let mut coverage: u128 = 1;
        for _ in 0..self.gadget_len {
            coverage = coverage.saturating_mul(self.gadget_base as u128);
        }
        if coverage < self.q as u128 {
            return Err(MailError::InvalidParams(format!(
                "gadget base {}^{} does not cover q",
                self.gadget_base, self.gadget_len
            )));
        }
        Ok(())
    }

    /// Deterministic fingerprint compared by the server on every key upload.
    pub fn fingerprint(&self) -> String {
        format!(
            "ckks-n{}-q{}-d{}-l{}",
            self.ring_dim, self.q, self.scale_bits, self.max_level
        )
    }
}
