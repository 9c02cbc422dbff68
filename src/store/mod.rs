//! Refresh record persistence
//!
//! The authentication service only needs three operations from storage:
//! insert a record, find the newest unused record for a subject, and flip
//! a record's `used` flag exactly once.

mod memory;
mod postgres;

pub use memory::MemorySessionStore;
pub use postgres::PgSessionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;

/// Persisted refresh token record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRecord {
    pub id: Uuid,
    pub subject: String,
    /// bcrypt hash of the refresh secret; the plaintext is never stored
    pub hashed_secret: String,
    pub origin: String,
    /// Monotonic: false -> true, never back
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the store assigns `id` and starts with `used = false`
#[derive(Debug, Clone)]
pub struct NewRefreshRecord {
    pub subject: String,
    pub hashed_secret: String,
    pub origin: String,
    pub created_at: DateTime<Utc>,
}

/// Storage contract for refresh records
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new unused record
    async fn insert(&self, record: NewRefreshRecord) -> Result<RefreshRecord, StoreError>;

    /// Most recently created unused record for `subject`
    ///
    /// When several unused records exist (e.g. after a crash between insert
    /// and use) the newest one wins, and equal `created_at` values go to the
    /// later insert. Returns `StoreError::NotFound` if none.
    async fn find_latest_unused(&self, subject: &str) -> Result<RefreshRecord, StoreError>;

    /// Set `used = true` if and only if the record is still unused
    ///
    /// Returns `StoreError::Conflict` when another caller already consumed it.
    async fn mark_used(&self, record: &RefreshRecord) -> Result<(), StoreError>;
}
