//! Token-set and decision codecs at the two ends of the protocol.
//!
//! The sender turns a set of token indices into an indicator slot vector;
//! the receiver turns the decrypted inner product into a ham/spam label.

use serde::{Deserialize, Serialize};

use crate::error::{MailError, Result};

/// Classification threshold applied by default on the receiving side
pub const DEFAULT_THRESHOLD: f64 = 0.95;

/// Classification outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Ham,
    Spam,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Ham => write!(f, "ham"),
            Label::Spam => write!(f, "spam"),
        }
    }
}

/// Build the indicator vector for a token set: slot i is 1.0 iff i is
/// present. Duplicate indices are harmless; an index at or beyond the slot
/// count is rejected.
pub fn encode_tokens(indices: &[usize], slot_count: usize) -> Result<Vec<f64>> {
    let mut slots = vec![0.0f64; slot_count];
    for &i in indices {
        if i >= slot_count {
            return Err(MailError::IndexOutOfRange {
                index: i,
                limit: slot_count,
            });
        }
        slots[i] = 1.0;
    }
    Ok(slots)
}

/// The decision boundary in score space for a probability threshold t:
/// ln(1/t - 1). A sigmoid of the score exceeds t exactly when the score
/// falls below this value.
pub fn decision_boundary(threshold: f64) -> f64 {
    (1.0 / threshold - 1.0).ln()
}

/// Map the decrypted inner product to a label: spam when the score is
/// below the boundary for `threshold`.
pub fn decode_decision(value: f64, threshold: f64) -> Label {
    if value < decision_boundary(threshold) {
        Label::Spam
    } else {
        Label::Ham
    }
}
