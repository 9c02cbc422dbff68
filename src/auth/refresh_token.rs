/// Refresh Token Secret Generation
///
/// Refresh secrets are opaque random values drawn from the operating system
/// CSPRNG and encoded as standard base64. The plaintext is handed to the
/// client once; only its hash is persisted.

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::SecretError;

/// Raw length of a refresh secret
pub const REFRESH_SECRET_BYTES: usize = 32;

/// Generate `byte_length` random bytes, base64 encoded
///
/// # Errors
/// Returns `SecretError::EntropyUnavailable` if the OS random source fails.
/// There is no fallback to a weaker generator.
pub fn generate_secret(byte_length: usize) -> Result<String, SecretError> {
    let mut buf = vec![0u8; byte_length];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| SecretError::EntropyUnavailable(e.to_string()))?;

    Ok(STANDARD.encode(&buf))
}

/// Generate a new refresh secret
pub fn generate_refresh_token() -> Result<String, SecretError> {
    generate_secret(REFRESH_SECRET_BYTES)
}
