/// Access Token Claims
///
/// Fixed claim set carried by every access token. Unknown fields are
/// rejected at decode time, and every field is required.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime of an access token
pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Subject identifier
    pub user_id: String,
    /// Origin the token was issued to
    pub ip: String,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Create claims expiring `ACCESS_TOKEN_TTL_SECONDS` after `issued_at`
    pub fn new(subject: &str, origin: &str, issued_at: DateTime<Utc>) -> Self {
        Self {
            user_id: subject.to_string(),
            ip: origin.to_string(),
            exp: (issued_at + Duration::seconds(ACCESS_TOKEN_TTL_SECONDS)).timestamp(),
        }
    }

    /// A token is still valid at exactly `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }
}
