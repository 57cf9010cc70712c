//! SQLite persistence for planner sessions
//!
//! Documents and collection records are stored as JSON text. Merging happens
//! in Rust inside a transaction, so partial saves behave the same as in the
//! in-memory store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use runway_engine::store::{bump_counter, merge_json, not_found, with_id, without_id};
use runway_engine::{CollectionKind, DocumentKind, Store, StoreError, StoreResult, UsageCounter};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::constants;

/// SQLite-backed [`Store`]
pub struct SqliteStore {
    pool: SqlitePool,
}

/// Row type for collection queries
#[derive(FromRow)]
struct RecordRow {
    id: String,
    body: String,
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl SqliteStore {
    /// Open or create the database
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(u64::from(
                constants::SQLITE_BUSY_TIMEOUT_MS,
            )));
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {}", path.display()))?;

        let store = Self { pool };
        store.init_schema().await?;
        tracing::debug!(path = %path.display(), "database ready");

        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "
            -- One JSON document per user and kind (financial_data, usage_metrics)
            CREATE TABLE IF NOT EXISTS documents (
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (user_id, kind)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            -- Revenue streams and team members
            CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                collection TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_records_user_collection
             ON records (user_id, collection)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read a document, apply `change` and write it back in one transaction
    async fn modify_document(
        &self,
        user_id: &str,
        kind: DocumentKind,
        change: impl FnOnce(&mut Value),
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE user_id = ? AND kind = ?")
                .bind(user_id)
                .bind(kind.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;

        let mut doc = match row {
            Some((body,)) => serde_json::from_str(&body)?,
            None => Value::Object(Map::new()),
        };
        change(&mut doc);

        sqlx::query(
            "INSERT OR REPLACE INTO documents (user_id, kind, body, updated_at)
             VALUES (?, ?, ?, datetime('now'))",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(serde_json::to_string(&doc)?)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)
    }

    /// Document and record counts for one user
    pub async fn stats(&self, user_id: &str) -> Result<StoreStats> {
        let documents: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let streams: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM records WHERE user_id = ? AND collection = ?",
        )
        .bind(user_id)
        .bind(CollectionKind::RevenueStreams.as_str())
        .fetch_one(&self.pool)
        .await?;
        let members: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM records WHERE user_id = ? AND collection = ?",
        )
        .bind(user_id)
        .bind(CollectionKind::TeamMembers.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(StoreStats {
            documents: documents.0 as u64,
            revenue_streams: streams.0 as u64,
            team_members: members.0 as u64,
        })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get(&self, user_id: &str, kind: DocumentKind) -> StoreResult<Option<Value>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE user_id = ? AND kind = ?")
                .bind(user_id)
                .bind(kind.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;

        match row {
            Some((body,)) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, user_id: &str, kind: DocumentKind, partial: Value) -> StoreResult<()> {
        self.modify_document(user_id, kind, |doc| merge_json(doc, partial))
            .await
    }

    async fn list(&self, user_id: &str, collection: CollectionKind) -> StoreResult<Vec<Value>> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT id, body FROM records
             WHERE user_id = ? AND collection = ?
             ORDER BY rowid",
        )
        .bind(user_id)
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter()
            .map(|r| -> StoreResult<Value> { Ok(with_id(serde_json::from_str(&r.body)?, &r.id)) })
            .collect()
    }

    async fn insert(
        &self,
        user_id: &str,
        collection: CollectionKind,
        record: Value,
    ) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO records (id, user_id, collection, body) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(collection.as_str())
            .bind(serde_json::to_string(&without_id(record))?)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(id)
    }

    async fn update(
        &self,
        user_id: &str,
        collection: CollectionKind,
        id: &str,
        partial: Value,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let row: Option<(String,)> = sqlx::query_as(
            "SELECT body FROM records WHERE id = ? AND user_id = ? AND collection = ?",
        )
        .bind(id)
        .bind(user_id)
        .bind(collection.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(backend)?;

        let Some((body,)) = row else {
            return Err(not_found(collection, id));
        };
        let mut record: Value = serde_json::from_str(&body)?;
        merge_json(&mut record, without_id(partial));

        sqlx::query("UPDATE records SET body = ? WHERE id = ?")
            .bind(serde_json::to_string(&record)?)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        tx.commit().await.map_err(backend)
    }

    async fn delete(&self, user_id: &str, collection: CollectionKind, id: &str) -> StoreResult<()> {
        let result =
            sqlx::query("DELETE FROM records WHERE id = ? AND user_id = ? AND collection = ?")
                .bind(id)
                .bind(user_id)
                .bind(collection.as_str())
                .execute(&self.pool)
                .await
                .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(not_found(collection, id));
        }
        Ok(())
    }

    async fn increment_counter(&self, user_id: &str, counter: UsageCounter) -> StoreResult<()> {
        self.modify_document(user_id, DocumentKind::UsageMetrics, |doc| {
            bump_counter(doc, counter)
        })
        .await
    }
}

/// Stored data counts
#[derive(Debug)]
pub struct StoreStats {
    pub documents: u64,
    pub revenue_streams: u64,
    pub team_members: u64,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} documents, {} revenue streams, {} team members",
            self.documents, self.revenue_streams, self.team_members
        )
    }
}
