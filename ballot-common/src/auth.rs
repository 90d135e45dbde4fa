//! Password hashing and credential checks
//!
//! Passwords are stored as salted SHA-256 digests. Each user gets a random
//! per-user salt generated at registration; the stored hash is
//! `SHA-256(salt || password)` hex-encoded. Changing the password generates a
//! fresh salt.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Generate a random per-user salt (32 hex characters)
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt
///
/// Produces the hex-encoded SHA-256 of the salt concatenated with the
/// password. The same salt and password always produce the same hash.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a candidate password against a stored salt and hash
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}
