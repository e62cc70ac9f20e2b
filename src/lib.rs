//! Privacy-preserving spam classification over homomorphically encrypted
//! mail.
//!
//! A sender encodes an email as a token-indicator slot vector, encrypts it
//! under the recipient's public key, and submits it to the classification
//! server. The server evaluates a linear classifier directly on the
//! ciphertext — plaintext multiply by the weight vector, then a
//! rotate-and-sum reduction that folds the inner product into slot 0 — and
//! delivers the still-encrypted score to the recipient's mailbox. Only the
//! recipient can decrypt the score and apply the ham/spam decision rule.
//!
//! The encryption scheme is a compact leveled CKKS-style construction
//! implemented in `math` and `ckks`; the protocol layers sit on top:
//! `codec`, `registry`, `mailbox`, `pipeline`, `storage`, `roles`, and the
//! `http` transport behind the `server` feature.

pub mod ckks;
pub mod codec;
pub mod error;
pub mod mailbox;
pub mod math;
pub mod params;
pub mod pipeline;
pub mod registry;
pub mod roles;
pub mod storage;

#[cfg(feature = "server")]
pub mod http;

pub use ckks::CkksContext;
pub use codec::{decode_decision, encode_tokens, Label, DEFAULT_THRESHOLD};
pub use error::{MailError, Result};
pub use mailbox::{MailboxStore, MessageRecord};
pub use params::CkksParams;
pub use registry::KeyRegistry;
