//! Server-side key registry.
//!
//! A lock-protected map from user id to key bundle. Uploading any single
//! key enrolls the user; each upload overwrites only its own slot and is
//! rejected up front when the uploader's parameter fingerprint disagrees
//! with the server's.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::ckks::{KeyBundle, PublicKey, RelinearizationKey, RotationKeySet};
use crate::error::{MailError, Result};

pub struct KeyRegistry {
    /// The server's own parameter fingerprint, fixed at startup
    fingerprint: String,
    bundles: RwLock<HashMap<String, KeyBundle>>,
}

impl KeyRegistry {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            bundles: RwLock::new(HashMap::new()),
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn check_fingerprint(&self, actual: &str) -> Result<()> {
        if actual != self.fingerprint {
            return Err(MailError::ConfigMismatch {
                expected: self.fingerprint.clone(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }

    /// Upsert hook shared by the three key uploads; enrolls on first touch.
    fn upsert<F>(&self, user: &str, fingerprint: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut KeyBundle),
    {
        self.check_fingerprint(fingerprint)?;
        let mut bundles = self.bundles.write().expect("registry lock poisoned");
        let bundle = bundles
            .entry(user.to_string())
            .or_insert_with(|| KeyBundle::empty(user, fingerprint));
        apply(bundle);
        Ok(())
    }

    pub fn register_public(&self, user: &str, fingerprint: &str, key: PublicKey) -> Result<()> {
        self.upsert(user, fingerprint, |b| b.public_key = Some(key))
    }

    pub fn register_rotation(
        &self,
        user: &str,
        fingerprint: &str,
        keys: RotationKeySet,
    ) -> Result<()> {
        self.upsert(user, fingerprint, |b| b.rotation_keys = Some(keys))
    }

    pub fn register_relin(
        &self,
        user: &str,
        fingerprint: &str,
        key: RelinearizationKey,
    ) -> Result<()> {
        self.upsert(user, fingerprint, |b| b.relin_key = Some(key))
    }

    /// Full bundle for a user, or `UnknownUser`.
    pub fn lookup(&self, user: &str) -> Result<KeyBundle> {
        self.bundles
            .read()
            .expect("registry lock poisoned")
            .get(user)
            .cloned()
            .ok_or_else(|| MailError::UnknownUser(user.to_string()))
    }

    pub fn contains(&self, user: &str) -> bool {
        self.bundles
            .read()
            .expect("registry lock poisoned")
            .contains_key(user)
    }

    /// Drop all bundles.
    pub fn reset(&self) {
        self.bundles
            .write()
            .expect("registry lock poisoned")
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ckks::CkksContext;
    use crate::math::GaussianSampler;
    use crate::params::CkksParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn keys() -> (String, crate::ckks::KeySet) {
        let ctx = CkksContext::new(CkksParams::toy_16()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut sampler = GaussianSampler::with_seed(3.2, 6);
        (ctx.fingerprint(), ctx.generate_keys(&mut rng, &mut sampler))
    }

    #[test]
    fn test_enrollment_on_first_upload() {
        let (fp, ks) = keys();
        let registry = KeyRegistry::new(fp.clone());

        assert!(!registry.contains("alice"));
        registry.register_public("alice", &fp, ks.public).unwrap();
        assert!(registry.contains("alice"));

        let bundle = registry.lookup("alice").unwrap();
        assert!(bundle.public_key.is_some());
        assert!(bundle.rotation_keys.is_none());
        assert!(bundle.relin_key.is_none());
    }

    #[test]
    fn test_uploads_fill_independent_slots() {
        let (fp, ks) = keys();
        let registry = KeyRegistry::new(fp.clone());

        registry.register_rotation("bob", &fp, ks.rotation).unwrap();
        registry.register_relin("bob", &fp, ks.relin).unwrap();

        let bundle = registry.lookup("bob").unwrap();
        assert!(bundle.public_key.is_none());
        assert!(bundle.rotation_keys.is_some());
        assert!(bundle.relin_key.is_some());
    }

    #[test]
    fn test_fingerprint_mismatch_rejected() {
        let (fp, ks) = keys();
        let registry = KeyRegistry::new(fp);

        let err = registry
            .register_public("carol", "ckks-n32-q17-d20-l1", ks.public)
            .unwrap_err();
        assert!(matches!(err, MailError::ConfigMismatch { .. }));
        assert!(!registry.contains("carol"), "rejected upload must not enroll");
    }

    #[test]
    fn test_lookup_unknown_user() {
        let registry = KeyRegistry::new("fp");
        assert!(matches!(
            registry.lookup("nobody"),
            Err(MailError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_reset() {
        let (fp, ks) = keys();
        let registry = KeyRegistry::new(fp.clone());
        registry.register_public("alice", &fp, ks.public).unwrap();
        registry.reset();
        assert!(!registry.contains("alice"));
    }
}
