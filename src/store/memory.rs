//! In-memory session store
//!
//! Records live in insertion order behind a single mutex, which is also the
//! serialization point for `mark_used`.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{NewRefreshRecord, RefreshRecord, SessionStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: Mutex<Vec<RefreshRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<RefreshRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Persistence("session store lock poisoned".to_string()))
    }

    /// All records for a subject, oldest first
    pub fn records_for(&self, subject: &str) -> Vec<RefreshRecord> {
        self.lock()
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.subject == subject)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, record: NewRefreshRecord) -> Result<RefreshRecord, StoreError> {
        let row = RefreshRecord {
            id: Uuid::new_v4(),
            subject: record.subject,
            hashed_secret: record.hashed_secret,
            origin: record.origin,
            used: false,
            created_at: record.created_at,
        };

        self.lock()?.push(row.clone());
        Ok(row)
    }

    async fn find_latest_unused(&self, subject: &str) -> Result<RefreshRecord, StoreError> {
        let records = self.lock()?;

        // Newest by created_at; among equal timestamps the later insert wins.
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.subject == subject && !r.used)
            .max_by_key(|(position, r)| (r.created_at, *position))
            .map(|(_, r)| r.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn mark_used(&self, record: &RefreshRecord) -> Result<(), StoreError> {
        let mut records = self.lock()?;

        let stored = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(StoreError::NotFound)?;

        if stored.used {
            return Err(StoreError::Conflict);
        }
        stored.used = true;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn new_record(subject: &str, hashed_secret: &str) -> NewRefreshRecord {
        NewRefreshRecord {
            subject: subject.to_string(),
            hashed_secret: hashed_secret.to_string(),
            origin: "10.0.0.1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemorySessionStore::new();
        let inserted = store.insert(new_record("alice", "h1")).await.unwrap();

        assert!(!inserted.used);
        let found = store.find_latest_unused("alice").await.unwrap();
        assert_eq!(found, inserted);
    }

    #[tokio::test]
    async fn test_find_missing_subject() {
        let store = MemorySessionStore::new();
        store.insert(new_record("alice", "h1")).await.unwrap();

        let result = store.find_latest_unused("bob").await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_latest_of_duplicate_unused_records() {
        let store = MemorySessionStore::new();
        let now = Utc::now();

        let mut older = new_record("alice", "older");
        older.created_at = now - Duration::seconds(30);
        let mut newer = new_record("alice", "newer");
        newer.created_at = now;

        // Insert newest first so position alone would pick the wrong one
        store.insert(newer).await.unwrap();
        store.insert(older).await.unwrap();

        let found = store.find_latest_unused("alice").await.unwrap();
        assert_eq!(found.hashed_secret, "newer");
    }

    #[tokio::test]
    async fn test_same_timestamp_prefers_later_insert() {
        let store = MemorySessionStore::new();
        let now = Utc::now();

        let mut first = new_record("alice", "first");
        first.created_at = now;
        let mut second = new_record("alice", "second");
        second.created_at = now;

        store.insert(first).await.unwrap();
        store.insert(second).await.unwrap();

        let found = store.find_latest_unused("alice").await.unwrap();
        assert_eq!(found.hashed_secret, "second");
    }

    #[tokio::test]
    async fn test_used_records_are_skipped() {
        let store = MemorySessionStore::new();
        let first = store.insert(new_record("alice", "first")).await.unwrap();
        store.mark_used(&first).await.unwrap();

        assert!(matches!(
            store.find_latest_unused("alice").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_mark_used_twice_conflicts() {
        let store = MemorySessionStore::new();
        let record = store.insert(new_record("alice", "h1")).await.unwrap();

        store.mark_used(&record).await.unwrap();
        let second = store.mark_used(&record).await;

        assert!(matches!(second, Err(StoreError::Conflict)));
        assert!(store.records_for("alice")[0].used);
    }
}
