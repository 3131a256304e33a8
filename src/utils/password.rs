//! Password digests for `site.users`.
//!
//! Format: `blake3$<salt-hex>$<hash-hex>`, where the hash is the keyed
//! BLAKE3 of the password under a key derived from the salt.

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

const SCHEME: &str = "blake3";
const KEY_CONTEXT: &str = "pagewright 2024 site.users password digest";
const SALT_LEN: usize = 16;

/// A parsed password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    salt: Vec<u8>,
    hash: blake3::Hash,
}

impl PasswordDigest {
    /// Hash `password` under a fresh random salt.
    pub fn generate(password: &str) -> Self {
        Self::with_salt(password, fresh_salt().to_vec())
    }

    fn with_salt(password: &str, salt: Vec<u8>) -> Self {
        let key = blake3::derive_key(KEY_CONTEXT, &salt);
        let hash = blake3::keyed_hash(&key, password.as_bytes());
        Self { salt, hash }
    }

    /// Parse the textual form. Returns `None` for anything malformed.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('$');
        let (Some(scheme), Some(salt), Some(hash), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        if scheme != SCHEME {
            return None;
        }
        let salt = hex::decode(salt).ok().filter(|s| !s.is_empty())?;
        let hash = blake3::Hash::from_hex(hash).ok()?;
        Some(Self { salt, hash })
    }

    /// Check a candidate password. The hash comparison is constant-time.
    pub fn verify(&self, password: &str) -> bool {
        Self::with_salt(password, self.salt.clone()).hash == self.hash
    }
}

impl fmt::Display for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}${}${}", hex::encode(&self.salt), self.hash.to_hex())
    }
}

/// Salt from the process-random hasher keys mixed with the clock.
fn fresh_salt() -> [u8; SALT_LEN] {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let mut hasher = blake3::Hasher::new();
    hasher.update(&nanos.to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    for _ in 0..2 {
        let mut h = RandomState::new().build_hasher();
        h.write_u128(nanos);
        hasher.update(&h.finish().to_le_bytes());
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&hasher.finalize().as_bytes()[..SALT_LEN]);
    salt
}
