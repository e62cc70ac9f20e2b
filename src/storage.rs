//! Disk persistence for keys, ciphertexts, and the weight vector.
//!
//! Keys and ciphertexts go through bincode under a data directory, named
//! `{id}.pk` / `{id}.rok` / `{id}.rek` / `{id}.sk` and
//! `{id}_{msg}.ct` / `{id}_{msg}.ctr`. The weight vector is a text file
//! with one real per line.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ckks::{Ciphertext, PublicKey, RelinearizationKey, RotationKeySet, SecretKey};
use crate::error::{MailError, Result};

fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = bincode::serialize(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    Ok(bincode::deserialize(&bytes)?)
}

fn key_path(dir: &Path, id: &str, ext: &str) -> PathBuf {
    dir.join(format!("{id}.{ext}"))
}

fn message_path(dir: &Path, id: &str, msg: &str, ext: &str) -> PathBuf {
    dir.join(format!("{id}_{msg}.{ext}"))
}

pub fn save_public_key(dir: &Path, id: &str, key: &PublicKey) -> Result<()> {
    save(&key_path(dir, id, "pk"), key)
}

pub fn load_public_key(dir: &Path, id: &str) -> Result<PublicKey> {
    load(&key_path(dir, id, "pk"))
}

pub fn save_rotation_keys(dir: &Path, id: &str, keys: &RotationKeySet) -> Result<()> {
    save(&key_path(dir, id, "rok"), keys)
}

pub fn load_rotation_keys(dir: &Path, id: &str) -> Result<RotationKeySet> {
    load(&key_path(dir, id, "rok"))
}

pub fn save_relin_key(dir: &Path, id: &str, key: &RelinearizationKey) -> Result<()> {
    save(&key_path(dir, id, "rek"), key)
}

pub fn load_relin_key(dir: &Path, id: &str) -> Result<RelinearizationKey> {
    load(&key_path(dir, id, "rek"))
}

/// The secret key stays on the owner's machine; only the owner's data
/// directory ever sees this file.
pub fn save_secret_key(dir: &Path, id: &str, key: &SecretKey) -> Result<()> {
    save(&key_path(dir, id, "sk"), key)
}

pub fn load_secret_key(dir: &Path, id: &str) -> Result<SecretKey> {
    load(&key_path(dir, id, "sk"))
}

/// Inbound ciphertext as received from a sender
pub fn save_ciphertext(dir: &Path, id: &str, msg: &str, ct: &Ciphertext) -> Result<()> {
    save(&message_path(dir, id, msg, "ct"), ct)
}

pub fn load_ciphertext(dir: &Path, id: &str, msg: &str) -> Result<Ciphertext> {
    load(&message_path(dir, id, msg, "ct"))
}

/// Evaluated classification result
pub fn save_result(dir: &Path, id: &str, msg: &str, ct: &Ciphertext) -> Result<()> {
    save(&message_path(dir, id, msg, "ctr"), ct)
}

pub fn load_result(dir: &Path, id: &str, msg: &str) -> Result<Ciphertext> {
    load(&message_path(dir, id, msg, "ctr"))
}

/// Load the classifier weight vector: one real per line, blank lines
/// skipped, exactly `slot_count` entries expected.
pub fn load_weights(path: &Path, slot_count: usize) -> Result<Vec<f64>> {
    let text = fs::read_to_string(path)?;
    let mut weights = Vec::with_capacity(slot_count);
    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let w: f64 = trimmed.parse().map_err(|_| {
            MailError::EncodingError(format!("bad weight on line {}: {:?}", lineno + 1, trimmed))
        })?;
        weights.push(w);
    }
    if weights.len() != slot_count {
        return Err(MailError::EncodingError(format!(
            "weight vector has {} entries, expected {}",
            weights.len(),
            slot_count
        )));
    }
    Ok(weights)
}
