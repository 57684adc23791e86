//! Salted password digests.

use std::fmt;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// SHA-256 digest of a password with a per-user random salt.
#[derive(Clone)]
pub struct PasswordDigest {
    salt: String,
    digest: Vec<u8>,
}

impl PasswordDigest {
    /// Hashes `password` under a freshly generated salt.
    pub fn hash(password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = compute(&salt, password);
        Self { salt, digest }
    }

    /// Constant-time comparison against a candidate password.
    pub fn verify(&self, candidate: &str) -> bool {
        let computed = compute(&self.salt, candidate);
        computed.ct_eq(&self.digest).into()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

fn compute(salt: &str, password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}
