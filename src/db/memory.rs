//! In-memory document store
//!
//! Used in dev mode when MongoDB is unreachable, and by tests. Each
//! update is applied to a copy under the write lock and swapped in only
//! if every path succeeds, so a single call is atomic per document just
//! like the MongoDB implementation.

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::gateway::{DocumentFilter, DocumentStore};
use crate::db::path::{project, push_path, set_path};
use crate::types::{Result, WorkshopError};

/// `DocumentStore` held entirely in process memory
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    writes: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful create/update calls so far
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of documents in a collection
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

fn has_id(doc: &Document, id: &ObjectId) -> bool {
    matches!(doc.get("_id"), Some(Bson::ObjectId(oid)) if oid == id)
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document(&self, collection: &str, id: &ObjectId) -> Result<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| has_id(d, id)))
            .cloned()
            .ok_or_else(|| WorkshopError::NotFound(format!("{} {}", collection, id)))
    }

    async fn get_documents(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        projection: &[&str],
    ) -> Result<Vec<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(d))
                    .map(|d| project(d, projection))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_document(&self, collection: &str, mut document: Document) -> Result<ObjectId> {
        let id = match document.get("_id") {
            Some(Bson::ObjectId(oid)) => *oid,
            Some(other) => {
                return Err(WorkshopError::Store(format!(
                    "unsupported _id type {:?}",
                    other.element_type()
                )))
            }
            None => {
                let oid = ObjectId::new();
                document.insert("_id", oid);
                oid
            }
        };

        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| has_id(d, &id)) {
            return Err(WorkshopError::Store(format!(
                "duplicate key {} in {}",
                id, collection
            )));
        }
        docs.push(document);
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(collection, %id, "Document created");
        Ok(id)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &ObjectId,
        set: Document,
        push: Option<Document>,
    ) -> Result<Document> {
        let mut guard = self.collections.write().await;
        let stored = guard
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| has_id(d, id)))
            .ok_or_else(|| WorkshopError::NotFound(format!("{} {}", collection, id)))?;

        let mut updated = stored.clone();
        for (path, value) in set {
            set_path(&mut updated, &path, value)?;
        }
        for (path, value) in push.unwrap_or_default() {
            push_path(&mut updated, &path, value)?;
        }

        *stored = updated.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(collection, %id, "Document updated");
        Ok(updated)
    }
}
