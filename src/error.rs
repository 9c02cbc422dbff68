/// Error Handling Module
///
/// Component errors for the token codec, secret generator, credential hasher
/// and session store, folded into a single `AuthError` that the service
/// returns and the HTTP layer renders.
///
/// Internal causes are logged with a per-response error id and never echoed
/// into the response body.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. COMPONENT ERROR TYPES
/// ============================================================================

/// Access token errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, malformed or missing claims
    InvalidToken(String),
    /// Signature valid, but past `exp`
    Expired,
    /// Encoding failed (key or serialization problem)
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::InvalidToken(reason) => write!(f, "Invalid token: {}", reason),
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::Signing(msg) => write!(f, "Token signing failed: {}", msg),
        }
    }
}

impl StdError for TokenError {}

/// Random source errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretError {
    EntropyUnavailable(String),
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretError::EntropyUnavailable(msg) => write!(f, "Entropy unavailable: {}", msg),
        }
    }
}

impl StdError for SecretError {}

/// Credential hashing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    InvalidHashFormat(String),
    HashingFailed(String),
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashError::InvalidHashFormat(msg) => write!(f, "Invalid hash format: {}", msg),
            HashError::HashingFailed(msg) => write!(f, "Hashing failed: {}", msg),
        }
    }
}

impl StdError for HashError {}

/// Session store errors
#[derive(Debug)]
pub enum StoreError {
    /// No unused refresh record for the subject
    NotFound,
    /// The record was already marked used by a concurrent call
    Conflict,
    /// Backend failure (connection, query, lock)
    Persistence(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Refresh record not found"),
            StoreError::Conflict => write!(f, "Refresh record already consumed"),
            StoreError::Persistence(msg) => write!(f, "Persistence error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Persistence(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// ============================================================================
/// 2. SERVICE ERROR TYPE
/// ============================================================================

/// Outcome taxonomy of the authentication service
#[derive(Debug)]
pub enum AuthError {
    /// Caller input missing or malformed (400)
    InvalidRequest(String),
    /// Token or secret invalid, expired, unknown or already consumed (401)
    Unauthorized(String),
    /// Lost the race on single-use enforcement (401 to the caller)
    Conflict,
    /// Store, entropy, hashing or signing failure (500); the message is log-only
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidRequest(_) => "INVALID_REQUEST",
            AuthError::Unauthorized(_) => "UNAUTHORIZED",
            AuthError::Conflict => "UNAUTHORIZED",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message that is safe to return to the caller
    pub fn public_message(&self) -> String {
        match self {
            AuthError::InvalidRequest(msg) => msg.clone(),
            AuthError::Unauthorized(msg) => msg.clone(),
            AuthError::Conflict => "refresh token already used".to_string(),
            AuthError::Internal(_) => "internal error".to_string(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AuthError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AuthError::Conflict => write!(f, "Conflict: refresh token consumed concurrently"),
            AuthError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AuthError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

// Only the conversions where every variant has a single service-level meaning
// live here. Token and store errors depend on the operation and are mapped
// explicitly in the service.

impl From<SecretError> for AuthError {
    fn from(err: SecretError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<HashError> for AuthError {
    fn from(err: HashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// ============================================================================
/// 3. HTTP RESPONSE MAPPING
/// ============================================================================

/// Error response body
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID, also attached to the log entry
    pub error_id: String,
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AuthError {
    fn log_error(&self, error_id: &str) {
        match self {
            AuthError::InvalidRequest(_) => {
                tracing::warn!(error_id = error_id, error = %self, "Rejected request");
            }
            AuthError::Unauthorized(_) | AuthError::Conflict => {
                tracing::warn!(error_id = error_id, error = %self, "Authentication error");
            }
            AuthError::Internal(_) => {
                tracing::error!(error_id = error_id, error = %self, "Internal error");
            }
        }
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let status = self.status_code();
        let body = ErrorResponse::new(
            error_id,
            self.public_message(),
            self.code().to_string(),
            status.as_u16(),
        );

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized(_) | AuthError::Conflict => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-call context attached to service log entries
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub subject: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            subject: None,
            operation: operation.into(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Log the full cause of an error before it is masked for the caller
    pub fn log_cause(&self, step: &str, cause: &dyn fmt::Display) {
        tracing::error!(
            request_id = %self.request_id,
            operation = %self.operation,
            subject = ?self.subject,
            step = step,
            error = %cause,
            "Authentication step failed"
        );
    }
}
