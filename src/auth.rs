// src/auth.rs
//! Password hashing and session handling for the account collaborator.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use rand::RngCore;

/// Hash a password into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hashing password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string. An unparseable stored
/// hash counts as a failed verification, never a panic.
pub fn verify_password(stored: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Random 32-byte session token, hex encoded.
fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let mut out = String::with_capacity(64);
    for b in bytes {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// Short anonymized handle for usernames in logs; raw names never hit the
/// log stream.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// In-memory session table: token -> user id.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, u64>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `user_id` and return its token.
    pub fn open(&self, user_id: u64) -> String {
        let token = new_token();
        self.inner
            .lock()
            .expect("session mutex poisoned")
            .insert(token.clone(), user_id);
        token
    }

    pub fn user_for(&self, token: &str) -> Option<u64> {
        self.inner
            .lock()
            .expect("session mutex poisoned")
            .get(token)
            .copied()
    }

    pub fn close(&self, token: &str) {
        self.inner
            .lock()
            .expect("session mutex poisoned")
            .remove(token);
    }
}
