//! Salted-digest password storage.
//!
//! The hashing scheme is intentionally confined to this module so it can be
//! swapped without touching callers. Stored format: `hex(salt)$hex(digest)`.

use rand::RngCore;
use sha2::{Digest, Sha256};

pub fn hash_password(plain: &str) -> String {
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);
    let digest = digest_with_salt(&salt, plain);
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

pub fn verify_password(plain: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };

    digest_with_salt(&salt, plain) == expected
}

fn digest_with_salt(salt: &[u8], plain: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(plain.as_bytes());
    hasher.finalize().to_vec()
}
