//! Per-user mailboxes holding classification results.
//!
//! Append-only, insertion-ordered; the message id of a record is its index
//! in the owner's mailbox. Delivery to a user who never enrolled fails and
//! mutates nothing.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::ckks::Ciphertext;
use crate::error::{MailError, Result};

/// One delivered classification result
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageRecord {
    pub recipient: String,
    /// Index in the recipient's mailbox, assigned at delivery
    pub message_id: usize,
    pub subject: String,
    /// Encrypted classifier score, decryptable only by the recipient
    pub result: Ciphertext,
}

#[derive(Default)]
pub struct MailboxStore {
    boxes: RwLock<HashMap<String, Vec<MessageRecord>>>,
}

impl MailboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mailbox for a user; idempotent.
    pub fn enroll(&self, user: &str) {
        self.boxes
            .write()
            .expect("mailbox lock poisoned")
            .entry(user.to_string())
            .or_default();
    }

    /// Append a result to an enrolled user's mailbox and return the
    /// assigned message id.
    pub fn deliver(&self, user: &str, subject: &str, result: Ciphertext) -> Result<usize> {
        let mut boxes = self.boxes.write().expect("mailbox lock poisoned");
        let inbox = boxes
            .get_mut(user)
            .ok_or_else(|| MailError::UnknownUser(user.to_string()))?;
        let message_id = inbox.len();
        inbox.push(MessageRecord {
            recipient: user.to_string(),
            message_id,
            subject: subject.to_string(),
            result,
        });
        Ok(message_id)
    }

    pub fn count(&self, user: &str) -> Result<usize> {
        self.boxes
            .read()
            .expect("mailbox lock poisoned")
            .get(user)
            .map(Vec::len)
            .ok_or_else(|| MailError::UnknownUser(user.to_string()))
    }

    pub fn fetch(&self, user: &str, index: usize) -> Result<MessageRecord> {
        let boxes = self.boxes.read().expect("mailbox lock poisoned");
        let inbox = boxes
            .get(user)
            .ok_or_else(|| MailError::UnknownUser(user.to_string()))?;
        inbox
            .get(index)
            .cloned()
            .ok_or(MailError::IndexOutOfRange {
                index,
                limit: inbox.len(),
            })
    }

    /// Drop all mailboxes.
    pub fn reset(&self) {
        self.boxes.write().expect("mailbox lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Poly, DEFAULT_Q};

    fn dummy_ct(tag: i64) -> Ciphertext {
        Ciphertext {
            c0: Poly::from_signed_coeffs(&[tag; 16], DEFAULT_Q),
            c1: Poly::zero(16, DEFAULT_Q),
            level: 0,
            scale: 1.0,
        }
    }

    #[test]
    fn test_deliver_assigns_sequential_ids() {
        let store = MailboxStore::new();
        store.enroll("alice");

        assert_eq!(store.deliver("alice", "first", dummy_ct(1)).unwrap(), 0);
        assert_eq!(store.deliver("alice", "second", dummy_ct(2)).unwrap(), 1);
        assert_eq!(store.deliver("alice", "third", dummy_ct(3)).unwrap(), 2);
        assert_eq!(store.count("alice").unwrap(), 3);
    }

    #[test]
    fn test_fetch_preserves_delivery_order() {
        let store = MailboxStore::new();
        store.enroll("bob");
        store.deliver("bob", "a", dummy_ct(10)).unwrap();
        store.deliver("bob", "b", dummy_ct(20)).unwrap();

        let first = store.fetch("bob", 0).unwrap();
        let second = store.fetch("bob", 1).unwrap();
        assert_eq!(first.subject, "a");
        assert_eq!(first.message_id, 0);
        assert_eq!(second.subject, "b");
        assert_eq!(second.message_id, 1);
        assert_eq!(first.result.c0.centered()[0], 10);
    }

    #[test]
    fn test_deliver_unknown_user_mutates_nothing() {
        let store = MailboxStore::new();
        store.enroll("alice");

        let err = store.deliver("mallory", "x", dummy_ct(0)).unwrap_err();
        assert!(matches!(err, MailError::UnknownUser(_)));
        assert!(matches!(
            store.count("mallory"),
            Err(MailError::UnknownUser(_))
        ));
        assert_eq!(store.count("alice").unwrap(), 0);
    }

    #[test]
    fn test_fetch_out_of_range() {
        let store = MailboxStore::new();
        store.enroll("carol");
        store.deliver("carol", "only", dummy_ct(0)).unwrap();

        assert!(matches!(
            store.fetch("carol", 1),
            Err(MailError::IndexOutOfRange { index: 1, limit: 1 })
        ));
    }

    #[test]
    fn test_enroll_is_idempotent() {
        let store = MailboxStore::new();
        store.enroll("dave");
        store.deliver("dave", "kept", dummy_ct(0)).unwrap();
        store.enroll("dave");
        assert_eq!(store.count("dave").unwrap(), 1);
    }

    #[test]
    fn test_reset() {
        let store = MailboxStore::new();
        store.enroll("alice");
        store.deliver("alice", "gone", dummy_ct(0)).unwrap();
        store.reset();
        assert!(matches!(
            store.count("alice"),
            Err(MailError::UnknownUser(_))
        ));
    }
}
