/// Authentication module
///
/// Access token codec, refresh secret generation and hashing, and the
/// service that ties them to the session store.

mod alerts;
mod claims;
mod hasher;
mod identity;
mod jwt;
mod refresh_token;
mod service;

pub use alerts::{LogAlerts, SecurityAlerts};
pub use claims::{Claims, ACCESS_TOKEN_TTL_SECONDS};
pub use hasher::{hash_secret, hash_secret_blocking, verify_secret, verify_secret_blocking};
pub use identity::{AcceptAnySubject, IdentityVerifier};
pub use jwt::TokenCodec;
pub use refresh_token::{generate_refresh_token, generate_secret, REFRESH_SECRET_BYTES};
pub use service::{AuthService, TokenPair};
