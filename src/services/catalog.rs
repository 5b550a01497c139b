//! Chain and exercise catalog reads

use bson::{oid::ObjectId, Document};
use std::sync::Arc;

use crate::db::schemas::{CHAIN_COLLECTION, EXERCISE_COLLECTION, NAME_FIELD};
use crate::db::{DocumentFilter, DocumentStore};
use crate::types::Result;

pub struct Catalog {
    store: Arc<dyn DocumentStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All chains as id + name
    pub async fn list_chains(&self) -> Result<Vec<Document>> {
        self.store
            .get_documents(CHAIN_COLLECTION, &DocumentFilter::all(), &[NAME_FIELD])
            .await
    }

    pub async fn get_chain(&self, id: &ObjectId) -> Result<Document> {
        self.store.get_document(CHAIN_COLLECTION, id).await
    }

    /// Exercises flagged active, full documents
    pub async fn list_exercises(&self) -> Result<Vec<Document>> {
        self.store
            .get_documents(
                EXERCISE_COLLECTION,
                &DocumentFilter::all().eq("active", true),
                &[],
            )
            .await
    }

    pub async fn get_exercise(&self, id: &ObjectId) -> Result<Document> {
        self.store.get_document(EXERCISE_COLLECTION, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::Exercise;
    use crate::db::MemoryDocumentStore;
    use bson::doc;

    #[tokio::test]
    async fn test_only_active_exercises_listed() {
        let store = Arc::new(MemoryDocumentStore::new());
        for (name, active) in [("warmup", true), ("retired", false), ("kata", true)] {
            let exercise = Exercise {
                name: name.into(),
                active,
                ..Default::default()
            };
            store
                .create_document(EXERCISE_COLLECTION, bson::to_document(&exercise).unwrap())
                .await
                .unwrap();
        }

        let catalog = Catalog::new(store);
        let names: Vec<String> = catalog
            .list_exercises()
            .await
            .unwrap()
            .iter()
            .map(|d| d.get_str("name").unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["warmup", "kata"]);
    }

    #[tokio::test]
    async fn test_chain_listing_is_projected() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .create_document(
                CHAIN_COLLECTION,
                doc! { "name": "basics", "exercises": [ObjectId::new()] },
            )
            .await
            .unwrap();

        let chains = Catalog::new(store).list_chains().await.unwrap();
        assert_eq!(chains.len(), 1);
        assert!(chains[0].get("exercises").is_none());
        assert_eq!(chains[0].get_str("name").unwrap(), "basics");
    }
}
