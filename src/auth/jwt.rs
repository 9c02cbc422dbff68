/// Access Token Codec
///
/// Issues and verifies HS512-signed access tokens. Verification pins the
/// algorithm, so tokens signed with anything else (including `none`) are
/// rejected. Expiry is checked against the injected clock.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::auth::claims::Claims;
use crate::clock::Clock;
use crate::configuration::JwtSettings;
use crate::error::{ConfigError, TokenError};

const ALGORITHM: Algorithm = Algorithm::HS512;

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Build a codec from a symmetric secret
    ///
    /// # Errors
    /// Returns `ConfigError::MissingRequired` if the secret is empty
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }

        let mut validation = Validation::new(ALGORITHM);
        // Expiry is evaluated against `clock`, not the system time.
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        })
    }

    pub fn from_settings(settings: &JwtSettings, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        Self::new(&settings.secret, clock)
    }

    /// Issue a token for `subject` bound to `origin`, valid for 15 minutes
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if encoding fails
    pub fn issue(&self, subject: &str, origin: &str) -> Result<String, TokenError> {
        let claims = Claims::new(subject, origin, self.clock.now());

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return its subject
    ///
    /// # Errors
    /// - `TokenError::InvalidToken` on bad signature, wrong algorithm,
    ///   malformed or missing claims, or an empty subject
    /// - `TokenError::Expired` once the clock is past `exp`
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.decode_claims(token)?;

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }

        Ok(claims.user_id)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidToken("unexpected signing algorithm".to_string())
                }
                ErrorKind::InvalidSignature => {
                    TokenError::InvalidToken("signature mismatch".to_string())
                }
                _ => TokenError::InvalidToken(e.to_string()),
            })?;

        if claims.user_id.is_empty() {
            return Err(TokenError::InvalidToken("empty subject".to_string()));
        }

        Ok(claims)
    }
}
