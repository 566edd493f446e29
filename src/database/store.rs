use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::{record_id, Record};

/// Fields owned by the store; client-supplied values are ignored.
pub const SYSTEM_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{resource} record '{id}' not found")]
    NotFound { resource: String, id: String },

    #[error("stored record is malformed: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(resource: &str, id: &str) -> Self {
        StoreError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.limit as usize
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
        }
    }
}

/// Persistence boundary for admin resources. Last write wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// A page of records in insertion order, plus the total matching count.
    async fn list(&self, resource: &str, query: &ListQuery) -> Result<(Vec<Record>, u64), StoreError>;
    async fn get(&self, resource: &str, id: &str) -> Result<Record, StoreError>;
    async fn insert(&self, resource: &str, data: Record) -> Result<Record, StoreError>;
    /// Merge `patch` into the stored record.
    async fn update(&self, resource: &str, id: &str, patch: Record) -> Result<Record, StoreError>;
    async fn delete(&self, resource: &str, id: &str) -> Result<Record, StoreError>;
}

pub(crate) fn strip_system_fields(mut data: Record) -> Record {
    for field in SYSTEM_FIELDS {
        data.remove(field);
    }
    data
}

pub(crate) fn new_record(data: Record) -> Record {
    let now = Value::String(Utc::now().to_rfc3339());
    let mut record = Record::new();
    record.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
    record.extend(strip_system_fields(data));
    record.insert("created_at".into(), now.clone());
    record.insert("updated_at".into(), now);
    record
}

pub(crate) fn matches_search(record: &Record, term: &str) -> bool {
    let term = term.to_lowercase();
    record.values().any(|value| match value {
        Value::String(s) => s.to_lowercase().contains(&term),
        Value::Number(n) => n.to_string().contains(&term),
        Value::Bool(b) => b.to_string().contains(&term),
        _ => false,
    })
}

/// Process-local store used in development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, resource: &str, query: &ListQuery) -> Result<(Vec<Record>, u64), StoreError> {
        let tables = self.tables.read().await;
        let rows = tables.get(resource).map(Vec::as_slice).unwrap_or_default();

        let matching: Vec<&Record> = match query.search.as_deref().filter(|s| !s.is_empty()) {
            Some(term) => rows.iter().filter(|r| matches_search(r, term)).collect(),
            None => rows.iter().collect(),
        };

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset())
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn get(&self, resource: &str, id: &str) -> Result<Record, StoreError> {
        self.tables
            .read()
            .await
            .get(resource)
            .and_then(|rows| rows.iter().find(|r| record_id(r).as_deref() == Some(id)))
            .cloned()
            .ok_or_else(|| StoreError::not_found(resource, id))
    }

    async fn insert(&self, resource: &str, data: Record) -> Result<Record, StoreError> {
        let record = new_record(data);
        self.tables
            .write()
            .await
            .entry(resource.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(&self, resource: &str, id: &str, patch: Record) -> Result<Record, StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(resource)
            .and_then(|rows| rows.iter_mut().find(|r| record_id(r).as_deref() == Some(id)))
            .ok_or_else(|| StoreError::not_found(resource, id))?;

        row.extend(strip_system_fields(patch));
        row.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
        Ok(row.clone())
    }

    async fn delete(&self, resource: &str, id: &str) -> Result<Record, StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(resource)
            .ok_or_else(|| StoreError::not_found(resource, id))?;
        let index = rows
            .iter()
            .position(|r| record_id(r).as_deref() == Some(id))
            .ok_or_else(|| StoreError::not_found(resource, id))?;
        Ok(rows.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_system_fields() {
        let store = MemoryStore::new();
        let record = store
            .insert("courses", data(json!({"id": "forged", "title": "Rust"})))
            .await
            .unwrap();
        let id = record_id(&record).unwrap();
        assert_ne!(id, "forged");
        assert!(Uuid::parse_str(&id).is_ok());
        assert!(record.contains_key("created_at"));
        assert_eq!(store.get("courses", &id).await.unwrap()["title"], "Rust");
    }

    #[tokio::test]
    async fn list_pages_in_insertion_order() {
        let store = MemoryStore::new();
        for title in ["a", "b", "c", "d", "e"] {
            store.insert("courses", data(json!({ "title": title }))).await.unwrap();
        }

        let query = ListQuery {
            page: 2,
            limit: 2,
            search: None,
        };
        let (rows, total) = store.list("courses", &query).await.unwrap();
        assert_eq!(total, 5);
        let titles: Vec<_> = rows.iter().map(|r| r["title"].as_str().unwrap()).collect();
        assert_eq!(titles, ["c", "d"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_counts_matches() {
        let store = MemoryStore::new();
        store.insert("users", data(json!({"name": "Ada Lovelace"}))).await.unwrap();
        store.insert("users", data(json!({"name": "Alan Turing"}))).await.unwrap();

        let query = ListQuery {
            search: Some("lovelace".into()),
            ..ListQuery::default()
        };
        let (rows, total) = store.list("users", &query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0]["name"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn search_matches_booleans_and_literal_wildcards() {
        let store = MemoryStore::new();
        store.insert("courses", data(json!({"title": "Rust", "published": true}))).await.unwrap();
        store.insert("courses", data(json!({"title": "Go 100%", "published": false}))).await.unwrap();
        store.insert("courses", data(json!({"title": "Zig", "tags": ["true"]}))).await.unwrap();

        let search = |term: &str| ListQuery {
            search: Some(term.into()),
            ..ListQuery::default()
        };
        let (rows, total) = store.list("courses", &search("TRUE")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0]["title"], "Rust");

        let (_, total) = store.list("courses", &search("%")).await.unwrap();
        assert_eq!(total, 1);
        let (_, total) = store.list("courses", &search("_")).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn update_merges_and_keeps_identity() {
        let store = MemoryStore::new();
        let record = store.insert("courses", data(json!({"title": "Go", "level": "beginner"}))).await.unwrap();
        let id = record_id(&record).unwrap();

        let updated = store
            .update("courses", &id, data(json!({"level": "advanced", "id": "other"})))
            .await
            .unwrap();
        assert_eq!(updated["title"], "Go");
        assert_eq!(updated["level"], "advanced");
        assert_eq!(record_id(&updated).unwrap(), id);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.get("courses", "x").await, Err(StoreError::NotFound { .. })));
        assert!(matches!(store.delete("courses", "x").await, Err(StoreError::NotFound { .. })));
        assert!(matches!(
            store.update("courses", "x", Record::new()).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let store = MemoryStore::new();
        let record = store.insert("lessons", data(json!({"title": "Intro"}))).await.unwrap();
        let id = record_id(&record).unwrap();
        assert_eq!(store.delete("lessons", &id).await.unwrap(), record);
        let (rows, total) = store.list("lessons", &ListQuery::default()).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
    }
}
