//! A compact leveled CKKS-style scheme over a single 60-bit prime.
//!
//! Supports exactly what the classification protocol needs: approximate
//! real-slot encoding, public-key encryption, homomorphic addition,
//! plaintext multiplication (one level of depth), and power-of-two slot
//! rotations via gadget key-switching.

pub mod context;
pub mod embed;
pub mod enc;
pub mod eval;
pub mod galois;
pub mod keygen;
pub mod types;

pub use context::CkksContext;
pub use types::{
    Ciphertext, GadgetVector, KeyBundle, KeySet, KeySwitchKey, Plaintext, PublicKey,
    RelinearizationKey, RotationKeySet, SecretKey,
};
