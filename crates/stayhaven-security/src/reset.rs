//! Password reset tokens.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// A freshly generated reset token. `raw` goes into the emailed link,
/// `digest` into the database.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub raw: String,
    pub digest: String,
    pub expires: DateTime<Utc>,
}

impl ResetToken {
    pub fn generate(ttl: Duration) -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let raw = hex::encode(bytes);
        let digest = Self::digest(&raw);
        Self { raw, digest, expires: Utc::now() + ttl }
    }

    /// SHA-256 of the raw token, hex encoded.
    pub fn digest(raw: &str) -> String {
        hex::encode(Sha256::digest(raw.as_bytes()))
    }
}
