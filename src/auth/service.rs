/// Authentication Service
///
/// Orchestrates login and refresh rotation. The service holds no per-subject
/// state; everything is re-derived from the session store on each call, and
/// the store's `used` flag is the only thing that changes on rotation.
///
/// Refresh flow:
/// 1. Verify the presented access token and take its subject
/// 2. Load the newest unused refresh record for that subject
/// 3. Check the presented secret against the stored hash
/// 4. Report an origin change, if any (never a rejection)
/// 5. Consume the record, then mint and persist a fresh pair

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::alerts::{LogAlerts, SecurityAlerts};
use crate::auth::hasher::{hash_secret_blocking, verify_secret_blocking};
use crate::auth::identity::{AcceptAnySubject, IdentityVerifier};
use crate::auth::jwt::TokenCodec;
use crate::auth::refresh_token::generate_refresh_token;
use crate::clock::Clock;
use crate::error::{AuthError, ErrorContext, StoreError, TokenError};
use crate::store::{NewRefreshRecord, SessionStore};

/// Access/refresh pair handed to the client
///
/// The refresh token is the plaintext secret; this is the only place it
/// ever appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    codec: TokenCodec,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    identity: Arc<dyn IdentityVerifier>,
    alerts: Arc<dyn SecurityAlerts>,
}

impl AuthService {
    pub fn new(codec: TokenCodec, store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            codec,
            store,
            clock,
            identity: Arc::new(AcceptAnySubject),
            alerts: Arc::new(LogAlerts),
        }
    }

    pub fn with_identity_verifier(mut self, identity: Arc<dyn IdentityVerifier>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_security_alerts(mut self, alerts: Arc<dyn SecurityAlerts>) -> Self {
        self.alerts = alerts;
        self
    }

    /// Start a session for `subject`
    ///
    /// # Errors
    /// - `InvalidRequest` if `subject` is empty (the store is not touched)
    /// - `Unauthorized` if the identity verifier rejects the subject
    /// - `Internal` if signing, entropy, hashing or persistence fails
    pub async fn login(&self, subject: &str, origin: &str) -> Result<TokenPair, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::InvalidRequest("missing userId".to_string()));
        }

        let context = ErrorContext::new("login").with_subject(subject);

        self.identity.verify(subject).await?;

        let pair = self.mint(&context, subject, origin).await?;

        tracing::info!(
            request_id = %context.request_id,
            subject = subject,
            origin = origin,
            "Session issued"
        );

        Ok(pair)
    }

    /// Exchange a valid access token and unused refresh secret for a new pair
    ///
    /// # Errors
    /// - `InvalidRequest` if either token is empty
    /// - `Unauthorized` for an invalid or expired access token, an unknown,
    ///   mismatched or already used refresh secret
    /// - `Conflict` if a concurrent refresh consumed the record first
    /// - `Internal` on store, hashing, signing or entropy failures
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_secret: &str,
        origin: &str,
    ) -> Result<TokenPair, AuthError> {
        if access_token.is_empty() || refresh_secret.is_empty() {
            return Err(AuthError::InvalidRequest("missing tokens".to_string()));
        }

        let context = ErrorContext::new("token_refresh");

        let subject = match self.codec.verify(access_token) {
            Ok(subject) => subject,
            Err(TokenError::Expired) => {
                tracing::info!(request_id = %context.request_id, "Access token expired");
                return Err(AuthError::Unauthorized("invalid access token".to_string()));
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %context.request_id,
                    error = %e,
                    "Access token rejected"
                );
                return Err(AuthError::Unauthorized("invalid access token".to_string()));
            }
        };
        let context = context.with_subject(&subject);

        let record = match self.store.find_latest_unused(&subject).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => {
                tracing::warn!(
                    request_id = %context.request_id,
                    subject = %subject,
                    "No active refresh record"
                );
                return Err(AuthError::Unauthorized("refresh token not found".to_string()));
            }
            Err(e) => {
                context.log_cause("find_latest_unused", &e);
                return Err(AuthError::Internal(e.to_string()));
            }
        };

        let matches =
            verify_secret_blocking(record.hashed_secret.clone(), refresh_secret.to_string())
                .await
                .map_err(|e| {
                    context.log_cause("verify_secret", &e);
                    AuthError::from(e)
                })?;
        if !matches {
            tracing::warn!(
                request_id = %context.request_id,
                subject = %subject,
                "Refresh secret does not match active record"
            );
            return Err(AuthError::Unauthorized("invalid refresh token".to_string()));
        }

        if record.used {
            tracing::warn!(
                request_id = %context.request_id,
                subject = %subject,
                record_id = %record.id,
                "Refresh token already used"
            );
            return Err(AuthError::Unauthorized("refresh token already used".to_string()));
        }

        if origin != record.origin {
            self.alerts.origin_changed(&subject, &record.origin, origin);
        }

        match self.store.mark_used(&record).await {
            Ok(()) => {}
            Err(StoreError::Conflict) | Err(StoreError::NotFound) => {
                tracing::warn!(
                    request_id = %context.request_id,
                    subject = %subject,
                    record_id = %record.id,
                    "Lost race consuming refresh record"
                );
                return Err(AuthError::Conflict);
            }
            Err(e) => {
                context.log_cause("mark_used", &e);
                return Err(AuthError::Internal(e.to_string()));
            }
        }

        let pair = self.mint(&context, &subject, origin).await?;

        tracing::info!(
            request_id = %context.request_id,
            subject = %subject,
            consumed_record = %record.id,
            "Session rotated"
        );

        Ok(pair)
    }

    /// Issue an access token, create a refresh secret and persist its hash
    async fn mint(
        &self,
        context: &ErrorContext,
        subject: &str,
        origin: &str,
    ) -> Result<TokenPair, AuthError> {
        let access_token = self.codec.issue(subject, origin).map_err(|e| {
            context.log_cause("issue_access_token", &e);
            AuthError::Internal(e.to_string())
        })?;

        let refresh_token = generate_refresh_token().map_err(|e| {
            context.log_cause("generate_refresh_token", &e);
            AuthError::from(e)
        })?;

        let hashed_secret = hash_secret_blocking(refresh_token.clone())
            .await
            .map_err(|e| {
                context.log_cause("hash_secret", &e);
                AuthError::from(e)
            })?;

        self.store
            .insert(NewRefreshRecord {
                subject: subject.to_string(),
                hashed_secret,
                origin: origin.to_string(),
                created_at: self.clock.now(),
            })
            .await
            .map_err(|e| {
                context.log_cause("insert_refresh_record", &e);
                AuthError::Internal(e.to_string())
            })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
