//! Error types for the mail classification protocol.

use thiserror::Error;

/// Errors surfaced by the library.
///
/// Every variant maps to a distinct HTTP rejection in the server layer;
/// nothing here panics on caller input.
#[derive(Debug, Error)]
pub enum MailError {
    /// Parameter fingerprints of two parties disagree
    #[error("parameter mismatch: expected {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },

    /// Operation referenced a user with no key material on record
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// Token or mailbox index outside the valid range
    #[error("index {index} out of range (limit {limit})")]
    IndexOutOfRange { index: usize, limit: usize },

    /// Slot vector of the wrong length for the configured slot count
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// Multiplicative depth budget exhausted
    #[error("level exhausted: ciphertext at level 0 cannot be multiplied")]
    LevelExhausted,

    /// Rotation requested for a step with no key-switching key
    #[error("missing rotation key for step {0}")]
    MissingRotationKey(usize),

    /// User enrolled but has not uploaded a public key
    #[error("no public key on record for user {0}")]
    MissingPublicKey(String),

    /// User enrolled but has not uploaded a relinearization key
    #[error("no relinearization key on record for user {0}")]
    MissingRelinKey(String),

    /// Two operands carry different level tags
    #[error("level mismatch: {0} vs {1}")]
    LevelMismatch(u8, u8),

    /// Two operands carry different scale tags
    #[error("scale mismatch: {0} vs {1}")]
    ScaleMismatch(f64, f64),

    /// Parameter set failed validation
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] bincode::Error),

    #[error("storage error: {0}")]
    StorageError(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, MailError>;
