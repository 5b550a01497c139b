//! Read-only chain lookup used when materializing workshops

use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;

use crate::db::schemas::{Chain, CHAIN_COLLECTION};
use crate::db::DocumentStore;
use crate::types::Result;

/// Source of chain templates
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Fetch a chain by id; `NotFound` if absent
    async fn get_chain(&self, id: &ObjectId) -> Result<Chain>;
}

/// Chain reader over the document store's `chains` collection
pub struct StoreChainReader {
    store: Arc<dyn DocumentStore>,
}

impl StoreChainReader {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ChainReader for StoreChainReader {
    async fn get_chain(&self, id: &ObjectId) -> Result<Chain> {
        let doc = self.store.get_document(CHAIN_COLLECTION, id).await?;
        Ok(bson::from_document(doc)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;
    use crate::types::WorkshopError;
    use bson::doc;

    #[tokio::test]
    async fn test_reads_chain_in_order() {
        let store = Arc::new(MemoryDocumentStore::new());
        let (e1, e2) = (ObjectId::new(), ObjectId::new());
        let id = store
            .create_document(CHAIN_COLLECTION, doc! { "name": "basics", "exercises": [e1, e2] })
            .await
            .unwrap();

        let reader = StoreChainReader::new(store);
        let chain = reader.get_chain(&id).await.unwrap();
        assert_eq!(chain.name, "basics");
        assert_eq!(chain.exercises, vec![e1, e2]);
    }

    #[tokio::test]
    async fn test_missing_chain() {
        let reader = StoreChainReader::new(Arc::new(MemoryDocumentStore::new()));
        let err = reader.get_chain(&ObjectId::new()).await.unwrap_err();
        assert!(matches!(err, WorkshopError::NotFound(_)));
    }
}
