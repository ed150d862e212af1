use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::{Client, Collection};
use thiserror::Error;
use tracing::info;

use crate::models::ResumeRecord;

pub const RESUME_COLLECTION: &str = "resumes";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only sink for processed uploads.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &ResumeRecord) -> Result<(), StoreError>;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}

pub struct MongoStore {
    collection: Collection<ResumeRecord>,
}

impl MongoStore {
    /// Parses the URI and prepares the collection handle. The driver connects
    /// lazily, so an unreachable server surfaces on the first insert.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let collection = client.database(database).collection(RESUME_COLLECTION);
        info!(database = database, collection = RESUME_COLLECTION, "MongoDB store configured");
        Ok(Self { collection })
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn insert(&self, record: &ResumeRecord) -> Result<(), StoreError> {
        self.collection.insert_one(record, None).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<ResumeRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ResumeRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert(&self, record: &ResumeRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_appends() {
        let store = InMemoryStore::new();
        let first = ResumeRecord::new("a.pdf".to_string(), "alpha".to_string(), vec![]);
        let second = ResumeRecord::new("b.docx".to_string(), "react".to_string(), vec!["react".to_string()]);

        store.insert(&first).await.unwrap();
        store.insert(&second).await.unwrap();

        let records = store.records();
        assert_eq!(records, vec![first, second]);
        assert_eq!(store.backend(), "memory");
    }

    #[test]
    fn test_record_serializes_with_bson_timestamp() {
        let record = ResumeRecord::new("cv.pdf".to_string(), "text".to_string(), vec!["git".to_string()]);
        let doc = bson::to_document(&record).unwrap();
        assert_eq!(doc.get_str("filename").unwrap(), "cv.pdf");
        assert!(doc.get_datetime("uploadedAt").is_ok());
        assert_eq!(doc.get_array("skills").unwrap().len(), 1);
    }
}
