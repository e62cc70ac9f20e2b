//! Homomorphic evaluation: addition, plaintext multiplication, and slot
//! rotation with gadget key-switching.
//!
//! Every operation validates level and scale tags before touching ring
//! arithmetic and returns a fresh ciphertext.

use crate::error::{MailError, Result};
use crate::math::NttTable;

use super::galois::{apply_automorphism, rotation_element};
use super::types::{Ciphertext, KeySwitchKey, Plaintext, RelinearizationKey, RotationKeySet};

/// Reject ciphertexts whose ring shape disagrees with the evaluation
/// context. Wire-deserialized ciphertexts carry arbitrary coefficient
/// vectors and moduli; this runs before any ring arithmetic touches them.
fn check_ring_shape(ct: &Ciphertext, table: &NttTable) -> Result<()> {
    let n = table.dimension();
    if ct.c0.dimension() != n || ct.c1.dimension() != n {
        return Err(MailError::EncodingError(format!(
            "ciphertext dimension {}/{} does not match ring dimension {}",
            ct.c0.dimension(),
            ct.c1.dimension(),
            n
        )));
    }
    if ct.c0.modulus() != table.modulus() || ct.c1.modulus() != table.modulus() {
        return Err(MailError::ConfigMismatch {
            expected: format!("q = {}", table.modulus()),
            actual: format!("q = {}/{}", ct.c0.modulus(), ct.c1.modulus()),
        });
    }
    Ok(())
}

/// Add two ciphertexts slot-wise.
pub fn add(a: &Ciphertext, b: &Ciphertext, table: &NttTable) -> Result<Ciphertext> {
    check_ring_shape(a, table)?;
    check_ring_shape(b, table)?;
    if a.level != b.level {
        return Err(MailError::LevelMismatch(a.level, b.level));
    }
    if a.scale != b.scale {
        return Err(MailError::ScaleMismatch(a.scale, b.scale));
    }
    Ok(Ciphertext {
        c0: &a.c0 + &b.c0,
        c1: &a.c1 + &b.c1,
        level: a.level,
        scale: a.scale,
    })
}

/// Multiply a ciphertext by a plaintext, consuming one level.
///
/// The product stays degree 1, so the relinearization key is not applied,
/// but the evaluator still requires it: an evaluation context without the
/// full bundle is a protocol violation worth failing on early.
pub fn multiply_plain(
    ct: &Ciphertext,
    pt: &Plaintext,
    _relin: &RelinearizationKey,
    table: &NttTable,
) -> Result<Ciphertext> {
    check_ring_shape(ct, table)?;
    if ct.level == 0 {
        return Err(MailError::LevelExhausted);
    }
    if pt.level != ct.level {
        return Err(MailError::LevelMismatch(ct.level, pt.level));
    }
    Ok(Ciphertext {
        c0: ct.c0.mul_ntt(&pt.poly, table),
        c1: ct.c1.mul_ntt(&pt.poly, table),
        level: ct.level - 1,
        scale: ct.scale * pt.scale,
    })
}

/// Rotate slots left by `steps`, using the matching rotation key.
pub fn rotate(
    ct: &Ciphertext,
    steps: usize,
    rotation_keys: &RotationKeySet,
    table: &NttTable,
) -> Result<Ciphertext> {
    check_ring_shape(ct, table)?;
    let ksk = rotation_keys
        .get(steps)
        .ok_or(MailError::MissingRotationKey(steps))?;

    let g = rotation_element(steps, ct.c0.dimension());
    let c0_rot = apply_automorphism(&ct.c0, g);
    let c1_rot = apply_automorphism(&ct.c1, g);

    // (c0', c1') decrypts under τ_g(s); switch c1' back to s
    let (c0, c1) = key_switch(&c0_rot, &c1_rot, ksk, table);

    Ok(Ciphertext {
        c0,
        c1,
        level: ct.level,
        scale: ct.scale,
    })
}

/// Switch (c0', c1') from the key embedded in `ksk` back to s.
///
/// Decompose c1' into gadget digits d_i, then
/// c0'' = c0' + Σ d_i·b_i and c1'' = Σ d_i·a_i.
fn key_switch(
    c0: &crate::math::Poly,
    c1: &crate::math::Poly,
    ksk: &KeySwitchKey,
    table: &NttTable,
) -> (crate::math::Poly, crate::math::Poly) {
    let n = c0.dimension();
    let q = c0.modulus();

    let digits = ksk.gadget.decompose(c1);

    let mut new_c0 = c0.clone();
    let mut new_c1 = crate::math::Poly::zero(n, q);
    for (d_i, (a_i, b_i)) in digits.iter().zip(ksk.rows.iter()) {
        new_c0 += &d_i.mul_ntt(b_i, table);
        new_c1 += &d_i.mul_ntt(a_i, table);
    }

    (new_c0, new_c1)
}
