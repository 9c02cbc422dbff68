//! PostgreSQL session store
//!
//! Backed by the `refresh_tokens` table (see `migrations/`). Single-use is
//! enforced by the conditional update in `mark_used`: only the caller whose
//! `UPDATE ... WHERE used = false` touches the row wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{NewRefreshRecord, RefreshRecord, SessionStore};
use crate::error::StoreError;

type RecordRow = (Uuid, String, String, String, bool, DateTime<Utc>);

fn into_record(row: RecordRow) -> RefreshRecord {
    let (id, subject, hashed_secret, origin, used, created_at) = row;
    RefreshRecord {
        id,
        subject,
        hashed_secret,
        origin,
        used,
        created_at,
    }
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, record: NewRefreshRecord) -> Result<RefreshRecord, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO refresh_tokens (id, user_id, hashed_token, ip_address, used, created_at)
            VALUES ($1, $2, $3, $4, false, $5)
            RETURNING id, user_id, hashed_token, ip_address, used, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.subject)
        .bind(&record.hashed_secret)
        .bind(&record.origin)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(into_record(row))
    }

    async fn find_latest_unused(&self, subject: &str) -> Result<RefreshRecord, StoreError> {
        // created_at ties go to the later insert, matching the in-memory store
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, user_id, hashed_token, ip_address, used, created_at
            FROM refresh_tokens
            WHERE user_id = $1 AND used = false
            ORDER BY created_at DESC, seq DESC
            LIMIT 1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_record).ok_or(StoreError::NotFound)
    }

    async fn mark_used(&self, record: &RefreshRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET used = true
            WHERE id = $1 AND used = false
            "#,
        )
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() != 1 {
            tracing::warn!(
                record_id = %record.id,
                subject = %record.subject,
                "Refresh record was already consumed"
            );
            return Err(StoreError::Conflict);
        }

        Ok(())
    }
}
