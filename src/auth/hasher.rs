/// Refresh Secret Hashing
///
/// Secrets are digested with SHA-256 and the hex digest is hashed with
/// bcrypt at the library default cost. The digest step keeps inputs of any
/// length inside bcrypt's 72-byte window, so distinct secrets never collide
/// on a shared prefix.
///
/// bcrypt at the default cost takes a noticeable fraction of a second, so
/// async callers go through the `*_blocking` variants, which run on the
/// blocking thread pool instead of an executor worker.

use actix_web::web;
use bcrypt::{hash, verify, DEFAULT_COST};
use sha2::{Digest, Sha256};

use crate::error::HashError;

fn digest(secret: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    format!("{:x}", hasher.finalize())
}

/// Hash a refresh secret for storage
///
/// # Errors
/// Returns `HashError::HashingFailed` if bcrypt fails
pub fn hash_secret(secret: impl AsRef<[u8]>) -> Result<String, HashError> {
    hash(digest(secret.as_ref()), DEFAULT_COST).map_err(|e| HashError::HashingFailed(e.to_string()))
}

/// Check a candidate secret against a stored hash
///
/// A mismatch is `Ok(false)`. Only a malformed stored hash is an error.
pub fn verify_secret(hashed: &str, candidate: impl AsRef<[u8]>) -> Result<bool, HashError> {
    // bcrypt::verify only fails while parsing the stored hash
    verify(digest(candidate.as_ref()), hashed).map_err(|e| HashError::InvalidHashFormat(e.to_string()))
}

/// `hash_secret` on the blocking thread pool
pub async fn hash_secret_blocking(secret: String) -> Result<String, HashError> {
    web::block(move || hash_secret(secret))
        .await
        .map_err(|e| HashError::HashingFailed(e.to_string()))?
}

/// `verify_secret` on the blocking thread pool
pub async fn verify_secret_blocking(hashed: String, candidate: String) -> Result<bool, HashError> {
    web::block(move || verify_secret(&hashed, candidate))
        .await
        .map_err(|e| HashError::HashingFailed(e.to_string()))?
}
