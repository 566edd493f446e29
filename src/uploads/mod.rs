// uploads/mod.rs - store-and-record for uploaded files

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },

    #[error("uploaded file is empty")]
    Empty,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub sha256: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
}

/// Writes files under one directory and remembers what was stored.
#[derive(Debug)]
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
    records: RwLock<Vec<UploadRecord>>,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            max_bytes: config.max_bytes,
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&self, original_name: &str, bytes: &[u8], uploaded_by: &str) -> Result<UploadRecord, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }

        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let filename = stored_name(original_name, id, created_at);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&filename), bytes).await?;

        let record = UploadRecord {
            id,
            filename,
            original_name: original_name.to_string(),
            size: bytes.len() as u64,
            sha256: format!("{:x}", Sha256::digest(bytes)),
            uploaded_by: uploaded_by.to_string(),
            created_at,
        };

        tracing::info!(
            "stored upload {} ({} bytes) from {}",
            record.filename,
            record.size,
            uploaded_by
        );
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    /// Uploads recorded by this process, oldest first.
    pub async fn list(&self) -> Vec<UploadRecord> {
        self.records.read().await.clone()
    }
}

/// `{millis}-{uuid}{.ext}`; only a short alphanumeric extension survives.
fn stored_name(original_name: &str, id: Uuid, at: DateTime<Utc>) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}-{}{}", at.timestamp_millis(), id.simple(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(max_bytes: usize) -> UploadStore {
        let dir = std::env::temp_dir().join(format!("academy-uploads-{}", Uuid::new_v4().simple()));
        UploadStore::new(&UploadConfig { dir, max_bytes })
    }

    #[tokio::test]
    async fn saves_file_and_records_it() {
        let store = store(1024);
        let record = store.save("Syllabus.PDF", b"hello", "ada@academy.test").await.unwrap();

        assert!(record.filename.ends_with(".pdf"));
        assert_eq!(record.original_name, "Syllabus.PDF");
        assert_eq!(record.size, 5);
        assert_eq!(
            record.sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        let on_disk = tokio::fs::read(store.dir().join(&record.filename)).await.unwrap();
        assert_eq!(on_disk, b"hello");
        assert_eq!(store.list().await, vec![record]);

        let _ = tokio::fs::remove_dir_all(store.dir()).await;
    }

    #[tokio::test]
    async fn rejects_oversized_and_empty_files() {
        let store = store(4);
        assert!(matches!(
            store.save("a.txt", b"12345", "x").await,
            Err(UploadError::TooLarge { size: 5, max: 4 })
        ));
        assert!(matches!(store.save("a.txt", b"", "x").await, Err(UploadError::Empty)));
        assert!(store.list().await.is_empty());
    }

    #[test]
    fn suspicious_extensions_are_dropped() {
        let id = Uuid::nil();
        let at = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(stored_name("../../etc/passwd", id, at), format!("0-{}", id.simple()));
        assert_eq!(stored_name("x.tar.gz", id, at), format!("0-{}.gz", id.simple()));
        assert_eq!(stored_name("x.p$p", id, at), format!("0-{}", id.simple()));
    }
}
