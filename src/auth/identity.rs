/// Identity Verification
///
/// Login issues tokens for whatever subject the caller names once this check
/// passes. The default accepts every non-empty subject; deployments that need
/// a real credential check plug in their own verifier.

use async_trait::async_trait;

use crate::error::AuthError;

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Confirm the caller may act as `subject`
    ///
    /// Return `AuthError::Unauthorized` to reject the login, or
    /// `AuthError::Internal` if the check itself could not be performed.
    async fn verify(&self, subject: &str) -> Result<(), AuthError>;
}

/// Accepts any subject
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAnySubject;

#[async_trait]
impl IdentityVerifier for AcceptAnySubject {
    async fn verify(&self, _subject: &str) -> Result<(), AuthError> {
        Ok(())
    }
}
