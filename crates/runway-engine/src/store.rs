//! Persistence collaborator interface
//!
//! Records are JSON documents keyed by user id. Single documents (financial
//! data, usage metrics) are merged field by field on save; collections
//! (revenue streams, team members) hold records with store-assigned ids.
//!
//! Two implementations live here: [`MemoryStore`] for standalone runs and
//! tests, and [`NullStore`] for the "not configured" mode, which never errors
//! and never keeps anything.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::constants;
use crate::error::{StoreError, StoreResult};
use crate::usage::UsageCounter;

/// Single-document entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    FinancialData,
    UsageMetrics,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::FinancialData => "financial_data",
            DocumentKind::UsageMetrics => "usage_metrics",
        }
    }
}

/// Collection entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    RevenueStreams,
    TeamMembers,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::RevenueStreams => "revenue_streams",
            CollectionKind::TeamMembers => "team_members",
        }
    }
}

/// Document store keyed by user id and entity kind
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch a single document
    async fn get(&self, user_id: &str, kind: DocumentKind) -> StoreResult<Option<Value>>;

    /// Merge a partial document into the stored one, creating it if absent
    async fn save(&self, user_id: &str, kind: DocumentKind, partial: Value) -> StoreResult<()>;

    /// All records of a collection, each with its `id` field set
    async fn list(&self, user_id: &str, collection: CollectionKind) -> StoreResult<Vec<Value>>;

    /// Add a record and return the id assigned to it
    async fn insert(
        &self,
        user_id: &str,
        collection: CollectionKind,
        record: Value,
    ) -> StoreResult<String>;

    /// Merge a partial record into an existing one
    async fn update(
        &self,
        user_id: &str,
        collection: CollectionKind,
        id: &str,
        partial: Value,
    ) -> StoreResult<()>;

    async fn delete(&self, user_id: &str, collection: CollectionKind, id: &str) -> StoreResult<()>;

    /// Bump a usage counter and stamp `lastActive`, creating the document if needed
    async fn increment_counter(&self, user_id: &str, counter: UsageCounter) -> StoreResult<()>;

    /// False for the "not configured" store
    fn is_configured(&self) -> bool {
        true
    }
}

/// Identifier for records created without a persistence layer
pub fn local_id() -> String {
    format!("{}{}", constants::LOCAL_ID_PREFIX, Uuid::new_v4())
}

/// Shallow merge: top-level fields of `partial` overwrite those of `target`
pub fn merge_json(target: &mut Value, partial: Value) {
    match (target, partial) {
        (Value::Object(existing), Value::Object(fields)) => {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        (target, partial) => *target = partial,
    }
}

/// Increment a counter field inside a usage document
pub fn bump_counter(doc: &mut Value, counter: UsageCounter) {
    if !doc.is_object() {
        *doc = Value::Object(Map::new());
    }
    if let Value::Object(fields) = doc {
        for c in UsageCounter::ALL {
            fields.entry(c.field_name()).or_insert(Value::from(0u64));
        }
        let current = fields
            .get(counter.field_name())
            .and_then(Value::as_u64)
            .unwrap_or(0);
        fields.insert(counter.field_name().to_string(), Value::from(current + 1));
        fields.insert(
            "lastActive".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
    }
}

/// Set the `id` field on a record
pub fn with_id(mut record: Value, id: &str) -> Value {
    if let Value::Object(fields) = &mut record {
        fields.insert("id".to_string(), Value::String(id.to_string()));
    }
    record
}

/// Remove the `id` field from a record before storing it
pub fn without_id(mut record: Value) -> Value {
    if let Value::Object(fields) = &mut record {
        fields.remove("id");
    }
    record
}

type CollectionKey = (String, CollectionKind);

/// In-process store backed by hash maps
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<(String, DocumentKind), Value>>,
    collections: Mutex<HashMap<CollectionKey, Vec<(String, Value)>>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn documents(
        &self,
    ) -> StoreResult<std::sync::MutexGuard<'_, HashMap<(String, DocumentKind), Value>>> {
        self.check()?;
        self.documents
            .lock()
            .map_err(|_| StoreError::Backend("document lock poisoned".to_string()))
    }

    fn collections(
        &self,
    ) -> StoreResult<std::sync::MutexGuard<'_, HashMap<CollectionKey, Vec<(String, Value)>>>> {
        self.check()?;
        self.collections
            .lock()
            .map_err(|_| StoreError::Backend("collection lock poisoned".to_string()))
    }
}

/// Error for a record id missing from a collection
pub fn not_found(collection: CollectionKind, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.as_str().to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, user_id: &str, kind: DocumentKind) -> StoreResult<Option<Value>> {
        let docs = self.documents()?;
        Ok(docs.get(&(user_id.to_string(), kind)).cloned())
    }

    async fn save(&self, user_id: &str, kind: DocumentKind, partial: Value) -> StoreResult<()> {
        let mut docs = self.documents()?;
        let doc = docs
            .entry((user_id.to_string(), kind))
            .or_insert_with(|| Value::Object(Map::new()));
        merge_json(doc, partial);
        Ok(())
    }

    async fn list(&self, user_id: &str, collection: CollectionKind) -> StoreResult<Vec<Value>> {
        let cols = self.collections()?;
        Ok(cols
            .get(&(user_id.to_string(), collection))
            .map(|records| {
                records
                    .iter()
                    .map(|(id, record)| with_id(record.clone(), id))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        user_id: &str,
        collection: CollectionKind,
        record: Value,
    ) -> StoreResult<String> {
        let mut cols = self.collections()?;
        let id = Uuid::new_v4().to_string();
        cols.entry((user_id.to_string(), collection))
            .or_default()
            .push((id.clone(), without_id(record)));
        Ok(id)
    }

    async fn update(
        &self,
        user_id: &str,
        collection: CollectionKind,
        id: &str,
        partial: Value,
    ) -> StoreResult<()> {
        let mut cols = self.collections()?;
        let record = cols
            .get_mut(&(user_id.to_string(), collection))
            .and_then(|records| records.iter_mut().find(|(rid, _)| rid == id))
            .ok_or_else(|| not_found(collection, id))?;
        merge_json(&mut record.1, without_id(partial));
        Ok(())
    }

    async fn delete(&self, user_id: &str, collection: CollectionKind, id: &str) -> StoreResult<()> {
        let mut cols = self.collections()?;
        let records = cols
            .get_mut(&(user_id.to_string(), collection))
            .ok_or_else(|| not_found(collection, id))?;
        let before = records.len();
        records.retain(|(rid, _)| rid != id);
        if records.len() == before {
            return Err(not_found(collection, id));
        }
        Ok(())
    }

    async fn increment_counter(&self, user_id: &str, counter: UsageCounter) -> StoreResult<()> {
        let mut docs = self.documents()?;
        let doc = docs
            .entry((user_id.to_string(), DocumentKind::UsageMetrics))
            .or_insert_with(|| Value::Object(Map::new()));
        bump_counter(doc, counter);
        Ok(())
    }
}

/// Store used when persistence is not configured: reads are empty, writes vanish
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

#[async_trait]
impl Store for NullStore {
    async fn get(&self, _user_id: &str, _kind: DocumentKind) -> StoreResult<Option<Value>> {
        Ok(None)
    }

    async fn save(&self, _user_id: &str, _kind: DocumentKind, _partial: Value) -> StoreResult<()> {
        Ok(())
    }

    async fn list(&self, _user_id: &str, _collection: CollectionKind) -> StoreResult<Vec<Value>> {
        Ok(Vec::new())
    }

    async fn insert(
        &self,
        _user_id: &str,
        _collection: CollectionKind,
        _record: Value,
    ) -> StoreResult<String> {
        Ok(local_id())
    }

    async fn update(
        &self,
        _user_id: &str,
        _collection: CollectionKind,
        _id: &str,
        _partial: Value,
    ) -> StoreResult<()> {
        Ok(())
    }

    async fn delete(
        &self,
        _user_id: &str,
        _collection: CollectionKind,
        _id: &str,
    ) -> StoreResult<()> {
        Ok(())
    }

    async fn increment_counter(&self, _user_id: &str, _counter: UsageCounter) -> StoreResult<()> {
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_merges_fields() {
        let store = MemoryStore::new();
        store
            .save("u1", DocumentKind::FinancialData, json!({ "currentCash": 1.0, "teamSize": 2 }))
            .await
            .unwrap();
        store
            .save("u1", DocumentKind::FinancialData, json!({ "teamSize": 5 }))
            .await
            .unwrap();

        let doc = store.get("u1", DocumentKind::FinancialData).await.unwrap();
        assert_eq!(doc, Some(json!({ "currentCash": 1.0, "teamSize": 5 })));
        assert_eq!(store.get("u2", DocumentKind::FinancialData).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_collection_lifecycle() {
        let store = MemoryStore::new();
        let id = store
            .insert("u1", CollectionKind::RevenueStreams, json!({ "name": "a", "id": "ignored" }))
            .await
            .unwrap();

        store
            .update("u1", CollectionKind::RevenueStreams, &id, json!({ "monthlyRevenue": 5.0 }))
            .await
            .unwrap();
        let records = store.list("u1", CollectionKind::RevenueStreams).await.unwrap();
        assert_eq!(records, vec![json!({ "id": id, "name": "a", "monthlyRevenue": 5.0 })]);
        assert!(store.list("u1", CollectionKind::TeamMembers).await.unwrap().is_empty());

        store.delete("u1", CollectionKind::RevenueStreams, &id).await.unwrap();
        assert!(store.list("u1", CollectionKind::RevenueStreams).await.unwrap().is_empty());

        let err = store
            .delete("u1", CollectionKind::RevenueStreams, &id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_increment_counter_creates_document() {
        let store = MemoryStore::new();
        store.increment_counter("u1", UsageCounter::ScenariosRun).await.unwrap();
        store.increment_counter("u1", UsageCounter::ScenariosRun).await.unwrap();

        let doc = store.get("u1", DocumentKind::UsageMetrics).await.unwrap().unwrap();
        assert_eq!(doc["scenariosRun"], 2);
        assert_eq!(doc["sessionsCount"], 0);
        assert!(doc["lastActive"].is_string());
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = MemoryStore::new();
        store.set_failing(true);
        let err = store.get("u1", DocumentKind::FinancialData).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_null_store_never_errors() {
        let store = NullStore;
        assert!(!store.is_configured());
        assert_eq!(store.get("u1", DocumentKind::UsageMetrics).await.unwrap(), None);
        store.save("u1", DocumentKind::FinancialData, json!({})).await.unwrap();
        assert!(store.list("u1", CollectionKind::TeamMembers).await.unwrap().is_empty());
        let id = store.insert("u1", CollectionKind::TeamMembers, json!({})).await.unwrap();
        assert!(id.starts_with("local-"));
        store.delete("u1", CollectionKind::TeamMembers, "missing").await.unwrap();
    }

    #[test]
    fn test_merge_json_replaces_non_objects() {
        let mut target = json!(3);
        merge_json(&mut target, json!({ "a": 1 }));
        assert_eq!(target, json!({ "a": 1 }));
    }
}
